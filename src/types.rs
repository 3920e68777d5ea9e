//! Type system for cQASM
//!
//! A [`Type`] pairs a [`TypeKind`] (the primitive category) with an
//! `assignable` flag: `assignable == true` means "this describes storage
//! that can be written to", i.e. an lvalue. Matrix kinds carry `(rows,
//! cols)`; `0` in either slot means "any size", which the overload resolver
//! treats as a looser match than an exact dimension (see `crate::overload`).
//!
//! `Unitary` gets its own `TypeKind` rather than being folded into
//! `ComplexMatrix`: the type-spec mini-language reserves `u` for it and
//! invariant 5 talks about "unitary operands" directly — see DESIGN.md.

use std::fmt;
use serde::{Deserialize, Serialize};

/// The primitive category of a [`Type`], independent of assignability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Qubit,
    Bit,
    Axis,
    Bool,
    Int,
    Real,
    Complex,
    String,
    Json,
    /// `rows`/`cols` of `0` mean "any size" (size-polymorphic).
    RealMatrix { rows: usize, cols: usize },
    ComplexMatrix { rows: usize, cols: usize },
    /// `dim` of `0` means "any power-of-two size"; otherwise must itself be
    /// a power of two.
    Unitary { dim: usize },
}

/// A fully-qualified cQASM type: primitive category plus assignability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    kind: TypeKind,
    assignable: bool,
}

impl Type {
    pub fn new(kind: TypeKind, assignable: bool) -> Self {
        Type { kind, assignable }
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_assignable(&self) -> bool {
        self.assignable
    }

    /// Returns a copy of this type with the assignable flag forced to
    /// `assignable`; the primitive category is unchanged.
    pub fn with_assignable(&self, assignable: bool) -> Type {
        Type { kind: self.kind.clone(), assignable }
    }

    pub fn qubit(assignable: bool) -> Type {
        Type::new(TypeKind::Qubit, assignable)
    }

    pub fn bit(assignable: bool) -> Type {
        Type::new(TypeKind::Bit, assignable)
    }

    pub fn axis() -> Type {
        Type::new(TypeKind::Axis, false)
    }

    pub fn bool_() -> Type {
        Type::new(TypeKind::Bool, false)
    }

    pub fn int() -> Type {
        Type::new(TypeKind::Int, false)
    }

    pub fn real() -> Type {
        Type::new(TypeKind::Real, false)
    }

    pub fn complex() -> Type {
        Type::new(TypeKind::Complex, false)
    }

    pub fn string() -> Type {
        Type::new(TypeKind::String, false)
    }

    pub fn json() -> Type {
        Type::new(TypeKind::Json, false)
    }

    pub fn real_matrix(rows: usize, cols: usize) -> Type {
        Type::new(TypeKind::RealMatrix { rows, cols }, false)
    }

    pub fn complex_matrix(rows: usize, cols: usize) -> Type {
        Type::new(TypeKind::ComplexMatrix { rows, cols }, false)
    }

    pub fn unitary(dim: usize) -> Type {
        Type::new(TypeKind::Unitary { dim }, false)
    }

    /// Whether this and `other` share a primitive category, ignoring
    /// assignability and any size-polymorphic `0` dimensions.
    pub fn same_primitive_category(&self, other: &Type) -> bool {
        use TypeKind::*;
        matches!(
            (&self.kind, &other.kind),
            (Qubit, Qubit)
                | (Bit, Bit)
                | (Axis, Axis)
                | (Bool, Bool)
                | (Int, Int)
                | (Real, Real)
                | (Complex, Complex)
                | (String, String)
                | (Json, Json)
                | (RealMatrix { .. }, RealMatrix { .. })
                | (ComplexMatrix { .. }, ComplexMatrix { .. })
                | (Unitary { .. }, Unitary { .. })
        )
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Qubit => write!(f, "qubit"),
            TypeKind::Bit => write!(f, "bit"),
            TypeKind::Axis => write!(f, "axis"),
            TypeKind::Bool => write!(f, "bool"),
            TypeKind::Int => write!(f, "int"),
            TypeKind::Real => write!(f, "real"),
            TypeKind::Complex => write!(f, "complex"),
            TypeKind::String => write!(f, "string"),
            TypeKind::Json => write!(f, "json"),
            TypeKind::RealMatrix { rows, cols } => write!(f, "real_matrix[{rows},{cols}]"),
            TypeKind::ComplexMatrix { rows, cols } => write!(f, "complex_matrix[{rows},{cols}]"),
            TypeKind::Unitary { dim } => write!(f, "unitary[{dim}]"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.assignable {
            write!(f, "{}&", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// Parses a type-spec string into an ordered list of [`Type`]s, one per
/// character. Lowercase selects the primitive category; uppercase selects
/// the same category but `assignable = true` (this is how `q`/`Q` and
/// `b`/`B`... except `b` is already claimed by `bool`, so bit only ever
/// appears as `B`). Matrix/unitary characters always produce the
/// size-polymorphic (`0`-dimensioned) form; callers needing an exact size
/// build the `Type` directly instead of going through a spec string.
///
/// An unrecognized character is a programmer error: tables are only ever
/// built from string literals inside this crate, so this panics rather than
/// threading a `Result` through every registration call site.
pub fn from_spec(spec: &str) -> Vec<Type> {
    spec.chars()
        .map(|c| {
            if c == 'B' {
                return Type::bit(true);
            }
            let assignable = c.is_ascii_uppercase();
            let kind = match c.to_ascii_lowercase() {
                'b' => TypeKind::Bool,
                'i' => TypeKind::Int,
                'r' => TypeKind::Real,
                'c' => TypeKind::Complex,
                'a' => TypeKind::Axis,
                's' => TypeKind::String,
                'j' => TypeKind::Json,
                'm' => TypeKind::RealMatrix { rows: 0, cols: 0 },
                'n' => TypeKind::ComplexMatrix { rows: 0, cols: 0 },
                'u' => TypeKind::Unitary { dim: 0 },
                'q' => TypeKind::Qubit,
                other => panic!("types::from_spec: unrecognized type-spec character '{other}'"),
            };
            Type::new(kind, assignable)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_spec_parses_scalars() {
        let types = from_spec("birc");
        assert_eq!(types[0].kind(), &TypeKind::Bool);
        assert_eq!(types[1].kind(), &TypeKind::Int);
        assert_eq!(types[2].kind(), &TypeKind::Real);
        assert_eq!(types[3].kind(), &TypeKind::Complex);
        assert!(types.iter().all(|t| !t.is_assignable()));
    }

    #[test]
    fn from_spec_distinguishes_qubit_and_bit() {
        let types = from_spec("qB");
        assert_eq!(types[0].kind(), &TypeKind::Qubit);
        assert_eq!(types[1].kind(), &TypeKind::Bit);
        assert!(types[1].is_assignable());
    }

    #[test]
    fn from_spec_marks_uppercase_assignable() {
        let types = from_spec("iI");
        assert!(!types[0].is_assignable());
        assert!(types[1].is_assignable());
        assert_eq!(types[0].kind(), types[1].kind());
    }

    #[test]
    #[should_panic]
    fn from_spec_panics_on_unknown_char() {
        from_spec("z");
    }

    #[test]
    fn matrix_kinds_carry_dimensions() {
        let t = Type::real_matrix(2, 3);
        assert_eq!(t.kind(), &TypeKind::RealMatrix { rows: 2, cols: 3 });
    }
}
