//! Semantic values
//!
//! A [`Value`] is what the expression evaluator (`crate::evaluator`) produces
//! and what the overload resolver (`crate::overload`) matches against
//! parameter types. Constant scalar variants fold at analysis time; the
//! reference variants (`QubitRef`, `BitRef`, `VariableRef`) and `FunctionCall`
//! stay symbolic because their value depends on runtime state the analyzer
//! never executes.

use crate::primitives::{Axis, CMatrix, Complex, Int, RMatrix, Real, Unitary};
use crate::types::{Type, TypeKind};
use serde::{Deserialize, Serialize};

/// A resolved operand somewhere in the semantic tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    ConstBool(bool),
    ConstAxis(Axis),
    ConstInt(Int),
    ConstReal(Real),
    ConstComplex(Complex),
    ConstString(String),
    ConstJson(String),
    ConstRealMatrix(RMatrix),
    ConstComplexMatrix(CMatrix),
    ConstUnitary(Unitary),
    /// A reference to one or more qubits by index, e.g. `q[0, 2:4]`.
    QubitRef { indices: Vec<Int> },
    /// A reference to one or more classical bits by index.
    BitRef { indices: Vec<Int> },
    /// A reference to a named, already-declared variable.
    VariableRef { name: String, ty: Type },
    /// A deferred call left symbolic because at least one argument was
    /// non-constant; `return_type` is fixed by overload resolution even
    /// though the value itself cannot be folded.
    FunctionCall { name: String, args: Vec<Value>, return_type: Type },
    /// A `goto`/subcircuit target name, resolved structurally elsewhere
    /// (see `crate::tree::OptLink`) rather than carrying a `Value` payload.
    Label(String),
}

impl Value {
    /// The type this value would present to the overload resolver.
    pub fn type_of(&self) -> Type {
        match self {
            Value::ConstBool(_) => Type::bool_(),
            Value::ConstAxis(_) => Type::axis(),
            Value::ConstInt(_) => Type::int(),
            Value::ConstReal(_) => Type::real(),
            Value::ConstComplex(_) => Type::complex(),
            Value::ConstString(_) => Type::string(),
            Value::ConstJson(_) => Type::json(),
            Value::ConstRealMatrix(m) => Type::real_matrix(m.rows(), m.cols()),
            Value::ConstComplexMatrix(m) => Type::complex_matrix(m.rows(), m.cols()),
            Value::ConstUnitary(u) => Type::unitary(u.dim()),
            Value::QubitRef { .. } => Type::qubit(true),
            Value::BitRef { .. } => Type::bit(true),
            Value::VariableRef { ty, .. } => ty.clone(),
            Value::FunctionCall { return_type, .. } => return_type.clone(),
            Value::Label(_) => Type::string(),
        }
    }

    /// Whether this value folded to a concrete constant at analysis time.
    /// References and unresolved calls are not constant.
    pub fn is_constant(&self) -> bool {
        !matches!(
            self,
            Value::QubitRef { .. }
                | Value::BitRef { .. }
                | Value::VariableRef { .. }
                | Value::FunctionCall { .. }
        )
    }
}

/// Attempts to coerce `value` to `target_type`, returning `None` if no legal
/// promotion exists. This is the only sanctioned way to adapt a value to a
/// parameter or declared type; callers are responsible for turning a `None`
/// into a diagnostic (see `crate::diagnostics`).
pub fn promote(value: &Value, target_type: &Type) -> Option<Value> {
    use TypeKind::*;

    // Identity: a constant scalar whose own type already matches.
    if value.type_of().kind() == target_type.kind() {
        return Some(value.clone());
    }

    match (value, target_type.kind()) {
        // Int -> Real -> Complex, exact (no precision loss modeled; real and
        // complex are both f64-backed).
        (Value::ConstInt(i), Real) => Some(Value::ConstReal(*i as f64)),
        (Value::ConstInt(i), Complex) => Some(Value::ConstComplex(Complex::from_real(*i as f64))),
        (Value::ConstReal(r), Complex) => Some(Value::ConstComplex(Complex::from_real(*r))),

        // Bool -> Int, 0 or 1.
        (Value::ConstBool(b), Int) => Some(Value::ConstInt(if *b { 1 } else { 0 })),
        (Value::ConstBool(b), Real) => Some(Value::ConstReal(if *b { 1.0 } else { 0.0 })),
        (Value::ConstBool(b), Complex) => {
            Some(Value::ConstComplex(Complex::from_real(if *b { 1.0 } else { 0.0 })))
        }

        // Int -> Bool only for the literals 0 and 1.
        (Value::ConstInt(0), Bool) => Some(Value::ConstBool(false)),
        (Value::ConstInt(1), Bool) => Some(Value::ConstBool(true)),

        // Matrix promotions: literal dimensions must match, 0 in the target
        // means "any size".
        (Value::ConstRealMatrix(m), RealMatrix { rows, cols }) => {
            dims_match(m.rows(), m.cols(), *rows, *cols).then(|| value.clone())
        }
        (Value::ConstComplexMatrix(m), ComplexMatrix { rows, cols }) => {
            dims_match(m.rows(), m.cols(), *rows, *cols).then(|| value.clone())
        }
        (Value::ConstRealMatrix(m), ComplexMatrix { rows, cols }) => {
            if !dims_match(m.rows(), m.cols(), *rows, *cols) {
                return None;
            }
            let promoted: Vec<Vec<Complex>> = (0..m.rows())
                .map(|r| (0..m.cols()).map(|c| Complex::from_real(m.at(r, c))).collect())
                .collect();
            CMatrix::from_rows(promoted).ok().map(Value::ConstComplexMatrix)
        }
        (Value::ConstUnitary(u), Unitary { dim }) => (*dim == 0 || *dim == u.dim())
            .then(|| value.clone()),
        (Value::ConstComplexMatrix(m), TypeKind::Unitary { dim }) if m.rows() == m.cols() => {
            if *dim != 0 && *dim != m.rows() {
                return None;
            }
            let rows: Vec<Vec<Complex>> =
                (0..m.rows()).map(|r| (0..m.cols()).map(|c| m.at(r, c)).collect()).collect();
            Unitary::from_rows(rows).ok().map(Value::ConstUnitary)
        }

        // QubitRef/BitRef only promote to their own kind; a single reference
        // (one index) is required unless the target is itself a multi-qubit
        // assignable slot, which this crate does not currently model
        // separately, so arity is left to the caller (instruction operand
        // checking, invariant 9) rather than enforced here.
        (Value::QubitRef { .. }, Qubit) => Some(value.clone()),
        (Value::BitRef { .. }, Bit) => Some(value.clone()),

        // A VariableRef is accepted when its declared type matches the
        // target's primitive category, regardless of the target's
        // assignable flag (passing a variable where a value is expected does
        // not itself require the parameter to be assignable).
        (Value::VariableRef { ty, .. }, _) if ty.same_primitive_category(target_type) => {
            Some(value.clone())
        }

        _ => None,
    }
}

fn dims_match(actual_rows: usize, actual_cols: usize, want_rows: usize, want_cols: usize) -> bool {
    (want_rows == 0 || want_rows == actual_rows) && (want_cols == 0 || want_cols == actual_cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_promotes_through_real_to_complex() {
        let v = Value::ConstInt(3);
        assert_eq!(promote(&v, &Type::real()), Some(Value::ConstReal(3.0)));
        assert_eq!(
            promote(&v, &Type::complex()),
            Some(Value::ConstComplex(Complex::from_real(3.0)))
        );
    }

    #[test]
    fn bool_promotes_to_int_zero_or_one() {
        assert_eq!(promote(&Value::ConstBool(true), &Type::int()), Some(Value::ConstInt(1)));
        assert_eq!(promote(&Value::ConstBool(false), &Type::int()), Some(Value::ConstInt(0)));
    }

    #[test]
    fn int_to_bool_requires_literal_zero_or_one() {
        assert_eq!(promote(&Value::ConstInt(1), &Type::bool_()), Some(Value::ConstBool(true)));
        assert_eq!(promote(&Value::ConstInt(0), &Type::bool_()), Some(Value::ConstBool(false)));
        assert_eq!(promote(&Value::ConstInt(2), &Type::bool_()), None);
    }

    #[test]
    fn qubit_ref_only_promotes_to_qubit() {
        let q = Value::QubitRef { indices: vec![0] };
        assert_eq!(promote(&q, &Type::qubit(true)), Some(q.clone()));
        assert_eq!(promote(&q, &Type::bit(true)), None);
    }

    #[test]
    fn matrix_dims_must_match_unless_wildcard() {
        let m = RMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let v = Value::ConstRealMatrix(m);
        assert!(promote(&v, &Type::real_matrix(2, 2)).is_some());
        assert!(promote(&v, &Type::real_matrix(0, 0)).is_some());
        assert!(promote(&v, &Type::real_matrix(3, 2)).is_none());
    }

    #[test]
    fn variable_ref_promotes_by_primitive_category() {
        let v = Value::VariableRef { name: "x".to_string(), ty: Type::int() };
        assert!(promote(&v, &Type::int()).is_some());
        assert!(promote(&v, &Type::real()).is_none());
    }
}
