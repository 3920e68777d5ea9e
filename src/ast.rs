//! Abstract syntax tree for cQASM
//!
//! This is the syntactic shape produced by `crate::parser`: close to the
//! source text, annotated with [`SourceLocation`] everywhere a diagnostic
//! might need to point back at it, but otherwise unaware of types, scopes,
//! or dialects. `crate::analyzer` consumes it by reference and produces the
//! semantic tree (`crate::semantic`).

use std::fmt;
use serde::{Deserialize, Serialize};

/// A span of source text, used for diagnostics. `start_column`/`end_column`
/// default to `0` when the parser does not track columns, so `Display`
/// never has to special-case a missing one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceLocation {
    pub fn new(filename: impl Into<String>, line: u32, column: u32) -> Self {
        SourceLocation {
            filename: filename.into(),
            start_line: line,
            start_column: column,
            end_line: line,
            end_column: column,
        }
    }

    pub fn span(
        filename: impl Into<String>,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
    ) -> Self {
        SourceLocation { filename: filename.into(), start_line, start_column, end_line, end_column }
    }

    /// A placeholder location for nodes synthesized by the analyzer rather
    /// than parsed from source (e.g. the implicit `q`/`b` registers).
    pub fn synthetic() -> Self {
        SourceLocation::new("<generated>", 0, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_column == 0 {
            write!(f, "{}:{}", self.filename, self.start_line)
        } else {
            write!(f, "{}:{}:{}", self.filename, self.start_line, self.start_column)
        }
    }
}

/// One `@name(args...)` annotation attached to a statement or instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationData {
    pub name: String,
    pub operands: Vec<Expression>,
    pub location: SourceLocation,
}

/// A single entry in an indexation list: either one index or an inclusive
/// `from:to` range, as in `q[0, 2:4]`.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexEntry {
    Single(Expression),
    Range(Expression, Expression),
}

/// Binary operators, grouped by category for the evaluator's dispatch table
/// (`crate::evaluator`) and the builtin registration table
/// (`crate::builtins`); each still gets its own `Expression::Binary` site so
/// a future visitor can switch over it directly rather than going through a
/// string name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    LogAnd,
    LogOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOperator {
    /// The canonical `operator...` name used to register and look up this
    /// operator in the overload tables, matching the rewriting rule in
    /// the expression evaluator.
    pub fn canonical_name(self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Add => "operator+",
            Sub => "operator-",
            Mul => "operator*",
            Div => "operator/",
            IntDiv => "operator//",
            Mod => "operator%",
            Pow => "operator**",
            BitAnd => "operator&",
            BitOr => "operator|",
            BitXor => "operator^",
            Shl => "operator<<",
            Shr => "operator>>",
            LogAnd => "operator&&",
            LogOr => "operator||",
            Eq => "operator==",
            Ne => "operator!=",
            Lt => "operator<",
            Le => "operator<=",
            Gt => "operator>",
            Ge => "operator>=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Negate,
    BitNot,
    LogNot,
}

impl UnaryOperator {
    pub fn canonical_name(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "operator-",
            UnaryOperator::BitNot => "operator~",
            UnaryOperator::LogNot => "operator!",
        }
    }
}

/// A syntactic expression, as produced directly by the parser. Matrix and
/// function-call arguments are themselves expressions so that e.g. a
/// mapping name can appear inside a matrix literal; constant folding
/// happens later, in `crate::evaluator`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    IntLiteral(i64, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),
    JsonLiteral(String, SourceLocation),
    MatrixLiteral(Vec<Vec<Expression>>, SourceLocation),
    Identifier(String, SourceLocation),
    FunctionCall { name: String, args: Vec<Expression>, location: SourceLocation },
    Index { target: Box<Expression>, indices: Vec<IndexEntry>, location: SourceLocation },
    Ternary {
        condition: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Box<Expression>,
        location: SourceLocation,
    },
    Unary { op: UnaryOperator, operand: Box<Expression>, location: SourceLocation },
    Binary { op: BinaryOperator, lhs: Box<Expression>, rhs: Box<Expression>, location: SourceLocation },
}

impl Expression {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Expression::IntLiteral(_, loc)
            | Expression::FloatLiteral(_, loc)
            | Expression::StringLiteral(_, loc)
            | Expression::JsonLiteral(_, loc)
            | Expression::MatrixLiteral(_, loc)
            | Expression::Identifier(_, loc)
            | Expression::FunctionCall { location: loc, .. }
            | Expression::Index { location: loc, .. }
            | Expression::Ternary { location: loc, .. }
            | Expression::Unary { location: loc, .. }
            | Expression::Binary { location: loc, .. } => loc,
        }
    }

    /// Structural equality ignoring source locations, used where the parser
    /// output is compared to a hand-built expected tree in tests.
    pub fn equals(&self, other: &Expression) -> bool {
        use Expression::*;
        match (self, other) {
            (IntLiteral(a, _), IntLiteral(b, _)) => a == b,
            (FloatLiteral(a, _), FloatLiteral(b, _)) => a == b,
            (StringLiteral(a, _), StringLiteral(b, _)) => a == b,
            (JsonLiteral(a, _), JsonLiteral(b, _)) => a == b,
            (Identifier(a, _), Identifier(b, _)) => a == b,
            (MatrixLiteral(a, _), MatrixLiteral(b, _)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(ra, rb)| {
                        ra.len() == rb.len() && ra.iter().zip(rb).all(|(x, y)| x.equals(y))
                    })
            }
            (FunctionCall { name: n1, args: a1, .. }, FunctionCall { name: n2, args: a2, .. }) => {
                n1 == n2 && a1.len() == a2.len() && a1.iter().zip(a2).all(|(x, y)| x.equals(y))
            }
            (
                Index { target: t1, indices: i1, .. },
                Index { target: t2, indices: i2, .. },
            ) => t1.equals(t2) && i1.len() == i2.len(),
            (
                Ternary { condition: c1, if_true: t1, if_false: f1, .. },
                Ternary { condition: c2, if_true: t2, if_false: f2, .. },
            ) => c1.equals(c2) && t1.equals(t2) && f1.equals(f2),
            (Unary { op: o1, operand: x1, .. }, Unary { op: o2, operand: x2, .. }) => {
                o1 == o2 && x1.equals(x2)
            }
            (
                Binary { op: o1, lhs: l1, rhs: r1, .. },
                Binary { op: o2, lhs: l2, rhs: r2, .. },
            ) => o1 == o2 && l1.equals(l2) && r1.equals(r2),
            _ => false,
        }
    }
}

/// Walks an AST without committing to a traversal order for every caller:
/// implement the node kinds you care about, and the default methods recurse
/// into children for you (the "categorical fallback"). A visitor that
/// overrides nothing behaves like `RecursiveVisitor` and simply visits every
/// node in the tree.
pub trait Visitor {
    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }
    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement(self, stmt);
    }
}

/// The default recursive descent for [`Visitor::visit_expression`]; called
/// by the default method, or directly by an override that still wants to
/// visit its children.
pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::IntLiteral(..)
        | Expression::FloatLiteral(..)
        | Expression::StringLiteral(..)
        | Expression::JsonLiteral(..)
        | Expression::Identifier(..) => {}
        Expression::MatrixLiteral(rows, _) => {
            for row in rows {
                for cell in row {
                    visitor.visit_expression(cell);
                }
            }
        }
        Expression::FunctionCall { args, .. } => {
            for arg in args {
                visitor.visit_expression(arg);
            }
        }
        Expression::Index { target, indices, .. } => {
            visitor.visit_expression(target);
            for entry in indices {
                match entry {
                    IndexEntry::Single(e) => visitor.visit_expression(e),
                    IndexEntry::Range(from, to) => {
                        visitor.visit_expression(from);
                        visitor.visit_expression(to);
                    }
                }
            }
        }
        Expression::Ternary { condition, if_true, if_false, .. } => {
            visitor.visit_expression(condition);
            visitor.visit_expression(if_true);
            visitor.visit_expression(if_false);
        }
        Expression::Unary { operand, .. } => visitor.visit_expression(operand),
        Expression::Binary { lhs, rhs, .. } => {
            visitor.visit_expression(lhs);
            visitor.visit_expression(rhs);
        }
    }
}

/// The default recursive descent for [`Visitor::visit_statement`].
pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Statement) {
    match stmt {
        Statement::Bundle(instrs, _) => {
            for instr in instrs {
                if let Some(cond) = &instr.condition {
                    visitor.visit_expression(cond);
                }
                for operand in &instr.operands {
                    visitor.visit_expression(operand);
                }
                for annotation in &instr.annotations {
                    for operand in &annotation.operands {
                        visitor.visit_expression(operand);
                    }
                }
            }
        }
        Statement::Mapping { value, .. } => visitor.visit_expression(value),
        Statement::Variables { .. } | Statement::Subcircuit { .. } => {}
        Statement::IfElse { branches, else_branch, .. } => {
            for (cond, body) in branches {
                visitor.visit_expression(cond);
                for s in body {
                    visitor.visit_statement(s);
                }
            }
            if let Some(body) = else_branch {
                for s in body {
                    visitor.visit_statement(s);
                }
            }
        }
        Statement::ForLoop { init, condition, update, body, .. } => {
            if let Some(init) = init {
                visitor.visit_statement(init);
            }
            visitor.visit_expression(condition);
            if let Some(update) = update {
                visitor.visit_statement(update);
            }
            for s in body {
                visitor.visit_statement(s);
            }
        }
        Statement::ForeachLoop { from, to, body, .. } => {
            visitor.visit_expression(from);
            visitor.visit_expression(to);
            for s in body {
                visitor.visit_statement(s);
            }
        }
        Statement::WhileLoop { condition, body, .. } => {
            visitor.visit_expression(condition);
            for s in body {
                visitor.visit_statement(s);
            }
        }
        Statement::RepeatUntilLoop { body, condition, .. } => {
            for s in body {
                visitor.visit_statement(s);
            }
            visitor.visit_expression(condition);
        }
        Statement::Break(_) | Statement::Continue(_) => {}
    }
}

/// A single `Instruction` line inside a `Bundle`: a gate or meta-instruction
/// name, its operand expressions, an optional boolean condition (`c-...`
/// conditional gates), and any attached annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub name: String,
    pub condition: Option<Expression>,
    pub operands: Vec<Expression>,
    pub annotations: Vec<AnnotationData>,
    pub location: SourceLocation,
}

/// A syntactic statement, one line (or structured block) of a subcircuit
/// body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// One or more `Instruction`s applied in parallel on the same cycle.
    Bundle(Vec<Instruction>, SourceLocation),
    Mapping { name: String, value: Expression, location: SourceLocation },
    Variables { names: Vec<String>, type_name: String, location: SourceLocation },
    Subcircuit { name: String, iterations: Option<Expression>, location: SourceLocation },
    IfElse {
        branches: Vec<(Expression, Vec<Statement>)>,
        else_branch: Option<Vec<Statement>>,
        location: SourceLocation,
    },
    ForLoop {
        init: Option<Box<Statement>>,
        condition: Expression,
        update: Option<Box<Statement>>,
        body: Vec<Statement>,
        location: SourceLocation,
    },
    ForeachLoop {
        variable: String,
        from: Expression,
        to: Expression,
        body: Vec<Statement>,
        location: SourceLocation,
    },
    WhileLoop { condition: Expression, body: Vec<Statement>, location: SourceLocation },
    RepeatUntilLoop { body: Vec<Statement>, condition: Expression, location: SourceLocation },
    Break(SourceLocation),
    Continue(SourceLocation),
}

impl Statement {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Statement::Bundle(_, loc)
            | Statement::Mapping { location: loc, .. }
            | Statement::Variables { location: loc, .. }
            | Statement::Subcircuit { location: loc, .. }
            | Statement::IfElse { location: loc, .. }
            | Statement::ForLoop { location: loc, .. }
            | Statement::ForeachLoop { location: loc, .. }
            | Statement::WhileLoop { location: loc, .. }
            | Statement::RepeatUntilLoop { location: loc, .. }
            | Statement::Break(loc)
            | Statement::Continue(loc) => loc,
        }
    }

    /// A shallow copy: same variant and scalar fields, but any nested
    /// statement body is replaced with an empty one rather than recursively
    /// copied. Distinct from [`Clone`], which deep-copies the whole subtree;
    /// useful for rebuilding a node with the same header after its body has
    /// already been analyzed into something else.
    pub fn copy(&self) -> Statement {
        match self {
            Statement::Bundle(_, loc) => Statement::Bundle(Vec::new(), loc.clone()),
            Statement::Mapping { name, value, location } => Statement::Mapping {
                name: name.clone(),
                value: value.clone(),
                location: location.clone(),
            },
            Statement::Variables { names, type_name, location } => Statement::Variables {
                names: names.clone(),
                type_name: type_name.clone(),
                location: location.clone(),
            },
            Statement::Subcircuit { name, iterations, location } => Statement::Subcircuit {
                name: name.clone(),
                iterations: iterations.clone(),
                location: location.clone(),
            },
            Statement::IfElse { branches, location, .. } => Statement::IfElse {
                branches: branches.iter().map(|(cond, _)| (cond.clone(), Vec::new())).collect(),
                else_branch: None,
                location: location.clone(),
            },
            Statement::ForLoop { condition, location, .. } => Statement::ForLoop {
                init: None,
                condition: condition.clone(),
                update: None,
                body: Vec::new(),
                location: location.clone(),
            },
            Statement::ForeachLoop { variable, from, to, location, .. } => Statement::ForeachLoop {
                variable: variable.clone(),
                from: from.clone(),
                to: to.clone(),
                body: Vec::new(),
                location: location.clone(),
            },
            Statement::WhileLoop { condition, location, .. } => {
                Statement::WhileLoop { condition: condition.clone(), body: Vec::new(), location: location.clone() }
            }
            Statement::RepeatUntilLoop { condition, location, .. } => Statement::RepeatUntilLoop {
                body: Vec::new(),
                condition: condition.clone(),
                location: location.clone(),
            },
            Statement::Break(loc) => Statement::Break(loc.clone()),
            Statement::Continue(loc) => Statement::Continue(loc.clone()),
        }
    }

    /// Structural equality ignoring source locations and any attached
    /// annotations, the same "what matters semantically" comparison
    /// [`Expression::equals`] makes for expressions.
    pub fn equals(&self, other: &Statement) -> bool {
        use Statement::*;
        match (self, other) {
            (Bundle(a, _), Bundle(b, _)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| {
                        x.name == y.name
                            && x.operands.len() == y.operands.len()
                            && x.operands.iter().zip(&y.operands).all(|(p, q)| p.equals(q))
                    })
            }
            (Mapping { name: n1, value: v1, .. }, Mapping { name: n2, value: v2, .. }) => {
                n1 == n2 && v1.equals(v2)
            }
            (
                Variables { names: n1, type_name: t1, .. },
                Variables { names: n2, type_name: t2, .. },
            ) => n1 == n2 && t1 == t2,
            (
                Subcircuit { name: n1, .. },
                Subcircuit { name: n2, .. },
            ) => n1 == n2,
            (
                IfElse { branches: b1, else_branch: e1, .. },
                IfElse { branches: b2, else_branch: e2, .. },
            ) => {
                b1.len() == b2.len()
                    && b1.iter().zip(b2).all(|((c1, s1), (c2, s2))| {
                        c1.equals(c2) && statements_equal(s1, s2)
                    })
                    && match (e1, e2) {
                        (Some(s1), Some(s2)) => statements_equal(s1, s2),
                        (None, None) => true,
                        _ => false,
                    }
            }
            (
                ForLoop { condition: c1, body: b1, .. },
                ForLoop { condition: c2, body: b2, .. },
            ) => c1.equals(c2) && statements_equal(b1, b2),
            (
                ForeachLoop { variable: v1, from: f1, to: t1, body: bd1, .. },
                ForeachLoop { variable: v2, from: f2, to: t2, body: bd2, .. },
            ) => v1 == v2 && f1.equals(f2) && t1.equals(t2) && statements_equal(bd1, bd2),
            (
                WhileLoop { condition: c1, body: b1, .. },
                WhileLoop { condition: c2, body: b2, .. },
            ) => c1.equals(c2) && statements_equal(b1, b2),
            (
                RepeatUntilLoop { body: b1, condition: c1, .. },
                RepeatUntilLoop { body: b2, condition: c2, .. },
            ) => statements_equal(b1, b2) && c1.equals(c2),
            (Break(_), Break(_)) | (Continue(_), Continue(_)) => true,
            _ => false,
        }
    }
}

fn statements_equal(a: &[Statement], b: &[Statement]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
}

/// The root of a parsed cQASM file: the declared version, an optional
/// explicit `qubits N` count (v1.x only; v3.x sizes registers through
/// `Variables` declarations instead), and the top-level statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub version: String,
    pub num_qubits: Option<Expression>,
    pub statements: Vec<Statement>,
    pub location: SourceLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new("test.cq", 1, 0)
    }

    #[test]
    fn source_location_display_omits_zero_column() {
        let l = SourceLocation::new("a.cq", 3, 0);
        assert_eq!(l.to_string(), "a.cq:3");
        let l2 = SourceLocation::new("a.cq", 3, 5);
        assert_eq!(l2.to_string(), "a.cq:3:5");
    }

    #[test]
    fn expression_equals_ignores_location() {
        let a = Expression::IntLiteral(1, SourceLocation::new("a.cq", 1, 0));
        let b = Expression::IntLiteral(1, SourceLocation::new("b.cq", 99, 4));
        assert!(a.equals(&b));
    }

    #[test]
    fn binary_operator_canonical_names() {
        assert_eq!(BinaryOperator::Add.canonical_name(), "operator+");
        assert_eq!(BinaryOperator::Pow.canonical_name(), "operator**");
    }

    #[test]
    fn statement_location_accessor() {
        let s = Statement::Break(loc());
        assert_eq!(s.location().start_line, 1);
    }

    #[test]
    fn statement_copy_is_shallow() {
        let body = vec![Statement::Break(loc())];
        let stmt = Statement::WhileLoop { condition: Expression::IntLiteral(1, loc()), body, location: loc() };
        let shallow = stmt.copy();
        match shallow {
            Statement::WhileLoop { body, .. } => assert!(body.is_empty(), "copy() must not deep-copy the body"),
            other => panic!("expected WhileLoop, got {other:?}"),
        }
        match &stmt {
            Statement::WhileLoop { body, .. } => assert_eq!(body.len(), 1, "clone()/original must keep its body"),
            other => panic!("expected WhileLoop, got {other:?}"),
        }
    }

    #[test]
    fn statement_equals_ignores_location_and_annotations() {
        let instr_a = Instruction {
            name: "x".to_string(),
            condition: None,
            operands: vec![Expression::Identifier("q".to_string(), loc())],
            annotations: vec![AnnotationData { name: "note".to_string(), operands: vec![], location: loc() }],
            location: loc(),
        };
        let instr_b = Instruction {
            name: "x".to_string(),
            condition: None,
            operands: vec![Expression::Identifier("q".to_string(), SourceLocation::new("other.cq", 9, 1))],
            annotations: vec![],
            location: SourceLocation::new("other.cq", 9, 1),
        };
        let a = Statement::Bundle(vec![instr_a], loc());
        let b = Statement::Bundle(vec![instr_b], SourceLocation::new("other.cq", 9, 1));
        assert!(a.equals(&b));
    }

    #[test]
    fn visitor_counts_every_identifier_reached() {
        struct CountIdentifiers(usize);
        impl Visitor for CountIdentifiers {
            fn visit_expression(&mut self, expr: &Expression) {
                if matches!(expr, Expression::Identifier(..)) {
                    self.0 += 1;
                }
                walk_expression(self, expr);
            }
        }
        let body = vec![Statement::Bundle(
            vec![Instruction {
                name: "cnot".to_string(),
                condition: None,
                operands: vec![
                    Expression::Identifier("q".to_string(), loc()),
                    Expression::Identifier("r".to_string(), loc()),
                ],
                annotations: vec![],
                location: loc(),
            }],
            loc(),
        )];
        let stmt = Statement::WhileLoop { condition: Expression::IntLiteral(1, loc()), body, location: loc() };
        let mut counter = CountIdentifiers(0);
        counter.visit_statement(&stmt);
        assert_eq!(counter.0, 2);
    }
}
