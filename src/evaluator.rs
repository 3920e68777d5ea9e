//! Expression evaluator
//!
//! Walks an `ast::Expression` against the current scope stack and produces
//! a `Value`: either a folded constant, or (when any sub-expression is a
//! reference to a non-constant variable) a symbolic `Value::FunctionCall`
//! carrying the resolved overload's return type. Operators are rewritten to
//! their canonical function name (`BinaryOperator::canonical_name`) and
//! dispatched through the same function table as an ordinary call, so a
//! host can override `operator+` for a custom type the same way it would
//! add any other builtin.

use crate::ast::{Expression, IndexEntry};
use crate::primitives::{CMatrix, Complex, RMatrix};
use crate::symbols::ScopeStack;
use crate::types::Type;
use crate::values::{promote, Value};

/// Evaluates `expr` against `scopes`, returning a `Value` or a diagnostic
/// string describing why evaluation failed.
pub fn evaluate(expr: &Expression, scopes: &ScopeStack) -> Result<Value, String> {
    match expr {
        Expression::IntLiteral(v, _) => Ok(Value::ConstInt(*v)),
        Expression::FloatLiteral(v, loc) => {
            if !v.is_finite() {
                return Err(format!("{loc}: float literal is not finite"));
            }
            Ok(Value::ConstReal(*v))
        }
        Expression::StringLiteral(s, _) => Ok(Value::ConstString(s.clone())),
        Expression::JsonLiteral(s, loc) => {
            validate_json(s).map_err(|e| format!("{loc}: invalid json literal: {e}"))?;
            Ok(Value::ConstJson(s.clone()))
        }
        Expression::MatrixLiteral(rows, loc) => evaluate_matrix(rows, scopes, loc),
        Expression::Identifier(name, loc) => evaluate_identifier(name, scopes, loc),
        Expression::Index { target, indices, location } => {
            evaluate_index(target, indices, scopes, location)
        }
        Expression::FunctionCall { name, args, location } => {
            evaluate_call(name, args, scopes, location)
        }
        Expression::Unary { op, operand, location } => {
            let arg = evaluate(operand, scopes)?;
            dispatch_call(op.canonical_name(), vec![arg], scopes, location)
        }
        Expression::Binary { op, lhs, rhs, location } => {
            let l = evaluate(lhs, scopes)?;
            let r = evaluate(rhs, scopes)?;
            dispatch_call(op.canonical_name(), vec![l, r], scopes, location)
        }
        Expression::Ternary { condition, if_true, if_false, location } => {
            let cond = evaluate(condition, scopes)?;
            if let Value::ConstBool(b) = cond {
                return evaluate(if b { if_true } else { if_false }, scopes);
            }
            let t = evaluate(if_true, scopes)?;
            let f = evaluate(if_false, scopes)?;
            dispatch_call("operator?:", vec![cond, t, f], scopes, location)
        }
    }
}

fn dispatch_call(
    canonical_name: &str,
    args: Vec<Value>,
    scopes: &ScopeStack,
    location: &crate::ast::SourceLocation,
) -> Result<Value, String> {
    let all_constant = args.iter().all(Value::is_constant);
    let (func, promoted_args) = scopes
        .resolve_function(canonical_name, &args)
        .map_err(|e| format!("{location}: {e}"))?;
    if all_constant {
        func(&promoted_args).map_err(|e| format!("{location}: {e}"))
    } else {
        let return_type = infer_return_type(canonical_name, &promoted_args);
        Ok(Value::FunctionCall {
            name: canonical_name.to_string(),
            args: promoted_args,
            return_type,
        })
    }
}

/// Best-effort return type for a non-constant call: invoking the function
/// itself isn't safe (non-constant arguments have no concrete value), so a
/// host function table should really carry declared return types per
/// overload; absent that richer metadata this crate infers it from the
/// promoted argument types using the same widening rule as arithmetic
/// promotion, which covers every builtin operator in `crate::builtins`.
fn infer_return_type(_name: &str, args: &[Value]) -> Type {
    args.iter()
        .map(Value::type_of)
        .max_by_key(|t| match t.kind() {
            crate::types::TypeKind::Bool => 0,
            crate::types::TypeKind::Int => 1,
            crate::types::TypeKind::Real => 2,
            crate::types::TypeKind::Complex => 3,
            _ => 4,
        })
        .unwrap_or_else(Type::bool_)
}

fn evaluate_call(
    name: &str,
    arg_exprs: &[Expression],
    scopes: &ScopeStack,
    location: &crate::ast::SourceLocation,
) -> Result<Value, String> {
    let args: Result<Vec<Value>, String> = arg_exprs.iter().map(|a| evaluate(a, scopes)).collect();
    dispatch_call(name, args?, scopes, location)
}

fn evaluate_identifier(
    name: &str,
    scopes: &ScopeStack,
    loc: &crate::ast::SourceLocation,
) -> Result<Value, String> {
    if let Some(v) = scopes.resolve_mapping(name) {
        return Ok(v.clone());
    }
    if let Some(ty) = scopes.resolve_variable(name) {
        return Ok(Value::VariableRef { name: name.to_string(), ty: ty.clone() });
    }
    if name == "q" {
        return Ok(Value::QubitRef { indices: vec![] });
    }
    if name == "b" {
        return Ok(Value::BitRef { indices: vec![] });
    }
    Err(format!("{loc}: unknown identifier '{name}'"))
}

fn evaluate_index(
    target: &Expression,
    indices: &[IndexEntry],
    scopes: &ScopeStack,
    loc: &crate::ast::SourceLocation,
) -> Result<Value, String> {
    let base = evaluate(target, scopes)?;
    let mut selected = Vec::new();
    for entry in indices {
        match entry {
            IndexEntry::Single(e) => selected.push(eval_index_int(e, scopes)?),
            IndexEntry::Range(from, to) => {
                let a = eval_index_int(from, scopes)?;
                let b = eval_index_int(to, scopes)?;
                if a > b {
                    return Err(format!("{loc}: range index {a}:{b} is reversed"));
                }
                selected.extend(a..=b);
            }
        }
    }
    match base {
        Value::QubitRef { .. } => Ok(Value::QubitRef { indices: selected }),
        Value::BitRef { .. } => Ok(Value::BitRef { indices: selected }),
        other => Err(format!("{loc}: cannot index into a value of type {}", other.type_of())),
    }
}

fn eval_index_int(e: &Expression, scopes: &ScopeStack) -> Result<i64, String> {
    match evaluate(e, scopes)? {
        Value::ConstInt(i) => Ok(i),
        other => Err(format!(
            "{}: index must be a constant integer, got {}",
            e.location(),
            other.type_of()
        )),
    }
}

fn evaluate_matrix(
    rows: &[Vec<Expression>],
    scopes: &ScopeStack,
    loc: &crate::ast::SourceLocation,
) -> Result<Value, String> {
    let num_cols = rows.first().map(|r| r.len()).unwrap_or(0);
    if rows.iter().any(|r| r.len() != num_cols) {
        return Err(format!("{loc}: matrix literal rows have unequal length"));
    }
    let mut evaluated: Vec<Vec<Value>> = Vec::with_capacity(rows.len());
    for row in rows {
        let mut out = Vec::with_capacity(row.len());
        for cell in row {
            out.push(evaluate(cell, scopes)?);
        }
        evaluated.push(out);
    }
    let all_real = evaluated
        .iter()
        .all(|row| row.iter().all(|v| matches!(v, Value::ConstInt(_) | Value::ConstReal(_))));
    if all_real {
        let real_rows: Vec<Vec<f64>> = evaluated
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| match v {
                        Value::ConstInt(i) => *i as f64,
                        Value::ConstReal(r) => *r,
                        _ => unreachable!(),
                    })
                    .collect()
            })
            .collect();
        return RMatrix::from_rows(real_rows).map(Value::ConstRealMatrix).map_err(|e| format!("{loc}: {e}"));
    }
    let complex_rows: Result<Vec<Vec<Complex>>, String> = evaluated
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| match promote(v, &Type::complex()) {
                    Some(Value::ConstComplex(c)) => Ok(c),
                    _ => Err(format!("{loc}: matrix element {} is not numeric", v.type_of())),
                })
                .collect()
        })
        .collect();
    CMatrix::from_rows(complex_rows?).map(Value::ConstComplexMatrix).map_err(|e| format!("{loc}: {e}"))
}

fn validate_json(text: &str) -> Result<(), String> {
    // Lazily validated: balance braces/brackets/quotes rather than building a
    // full JSON parser.
    let mut depth: i64 = 0;
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return Err("unbalanced closing brace/bracket".to_string());
        }
    }
    if in_string {
        return Err("unterminated string".to_string());
    }
    if depth != 0 {
        return Err("unbalanced braces/brackets".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceLocation;
    use crate::symbols::ScopeStack;

    fn loc() -> SourceLocation {
        SourceLocation::synthetic()
    }

    #[test]
    fn integer_literal_evaluates_to_const_int() {
        let scopes = ScopeStack::new();
        let v = evaluate(&Expression::IntLiteral(7, loc()), &scopes).unwrap();
        assert_eq!(v, Value::ConstInt(7));
    }

    #[test]
    fn identifier_resolves_mapping_before_unknown_error() {
        let mut scopes = ScopeStack::new();
        scopes.global_mut().mappings.add("pi_ish", Value::ConstReal(3.14));
        let v = evaluate(&Expression::Identifier("pi_ish".to_string(), loc()), &scopes).unwrap();
        assert_eq!(v, Value::ConstReal(3.14));
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let scopes = ScopeStack::new();
        assert!(evaluate(&Expression::Identifier("nope".to_string(), loc()), &scopes).is_err());
    }

    #[test]
    fn matrix_literal_with_only_ints_becomes_real_matrix() {
        let scopes = ScopeStack::new();
        let rows = vec![
            vec![Expression::IntLiteral(1, loc()), Expression::IntLiteral(2, loc())],
            vec![Expression::IntLiteral(3, loc()), Expression::IntLiteral(4, loc())],
        ];
        let v = evaluate(&Expression::MatrixLiteral(rows, loc()), &scopes).unwrap();
        assert!(matches!(v, Value::ConstRealMatrix(_)));
    }

    #[test]
    fn json_literal_rejects_unbalanced_braces() {
        let scopes = ScopeStack::new();
        let bad = Expression::JsonLiteral("{\"a\": 1".to_string(), loc());
        assert!(evaluate(&bad, &scopes).is_err());
    }
}
