//! Primitive values for cQASM
//!
//! These are the scalar and matrix building blocks that [`crate::values::Value`]
//! wraps with type and constant-vs-reference information. Nothing here knows
//! about scopes, overloads, or the AST; it is pure data plus the arithmetic
//! the default function library (`crate::builtins`) needs.

use std::fmt;
use serde::{Deserialize, Serialize};

/// 64-bit signed integer, as cQASM's `int` type.
pub type Int = i64;

/// IEEE-754 double, as cQASM's `real` type.
pub type Real = f64;

/// A pair of reals, as cQASM's `complex` type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: Real,
    pub im: Real,
}

impl Complex {
    pub fn new(re: Real, im: Real) -> Self {
        Complex { re, im }
    }

    pub fn from_real(re: Real) -> Self {
        Complex { re, im: 0.0 }
    }

    pub fn polar(r: Real, theta: Real) -> Self {
        Complex::new(r * theta.cos(), r * theta.sin())
    }

    pub fn conj(self) -> Self {
        Complex::new(self.re, -self.im)
    }

    pub fn norm(self) -> Real {
        self.re.hypot(self.im)
    }

    pub fn arg(self) -> Real {
        self.im.atan2(self.re)
    }

    pub fn add(self, other: Complex) -> Complex {
        Complex::new(self.re + other.re, self.im + other.im)
    }

    pub fn sub(self, other: Complex) -> Complex {
        Complex::new(self.re - other.re, self.im - other.im)
    }

    pub fn mul(self, other: Complex) -> Complex {
        Complex::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }

    pub fn div(self, other: Complex) -> Option<Complex> {
        let denom = other.re * other.re + other.im * other.im;
        if denom == 0.0 {
            return None;
        }
        Some(Complex::new(
            (self.re * other.re + self.im * other.im) / denom,
            (self.im * other.re - self.re * other.im) / denom,
        ))
    }

    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im >= 0.0 {
            write!(f, "{}+{}i", self.re, self.im)
        } else {
            write!(f, "{}{}i", self.re, self.im)
        }
    }
}

/// One of the three Bloch-sphere axes, used by rotation-style gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn from_name(name: &str) -> Option<Axis> {
        match name {
            "x" | "X" => Some(Axis::X),
            "y" | "Y" => Some(Axis::Y),
            "z" | "Z" => Some(Axis::Z),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// A non-empty, major-first sequence of version components, e.g. `1.2` or `3.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version(Vec<i64>);

impl Version {
    /// Builds a version from components. Every component must be non-negative
    /// and at least one component must be present.
    pub fn new(components: Vec<i64>) -> Result<Self, String> {
        if components.is_empty() {
            return Err("version must have at least one component".to_string());
        }
        if components.iter().any(|c| *c < 0) {
            return Err(format!("version components must be non-negative, got {:?}", components));
        }
        Ok(Version(components))
    }

    pub fn components(&self) -> &[i64] {
        &self.0
    }

    pub fn major(&self) -> i64 {
        self.0[0]
    }

    pub fn minor(&self) -> i64 {
        self.0.get(1).copied().unwrap_or(0)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                std::cmp::Ordering::Equal => continue,
                other => return other,
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// A rectangular, row-major matrix of reals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Real>,
}

impl RMatrix {
    /// Builds a matrix from its rows. Every row must have the same length
    /// (invariant 4); an empty row list produces a 0x0 matrix.
    pub fn from_rows(rows: Vec<Vec<Real>>) -> Result<Self, String> {
        let num_rows = rows.len();
        let num_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != num_cols) {
            return Err("matrix literal rows have unequal length".to_string());
        }
        let data = rows.into_iter().flatten().collect();
        Ok(RMatrix { rows: num_rows, cols: num_cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn at(&self, row: usize, col: usize) -> Real {
        self.data[row * self.cols + col]
    }

    pub fn data(&self) -> &[Real] {
        &self.data
    }
}

/// A rectangular, row-major matrix of complex numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Complex>,
}

impl CMatrix {
    pub fn from_rows(rows: Vec<Vec<Complex>>) -> Result<Self, String> {
        let num_rows = rows.len();
        let num_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != num_cols) {
            return Err("matrix literal rows have unequal length".to_string());
        }
        let data = rows.into_iter().flatten().collect();
        Ok(CMatrix { rows: num_rows, cols: num_cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn at(&self, row: usize, col: usize) -> Complex {
        self.data[row * self.cols + col]
    }

    pub fn data(&self) -> &[Complex] {
        &self.data
    }
}

/// A square complex matrix whose dimension is a power of two, as used by
/// custom-gate instructions. Unitarity is checked with a tolerance, not
/// enforced by the type itself (invariant 5 is a diagnostic, not a hard
/// failure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unitary {
    dim: usize,
    data: Vec<Complex>,
}

impl Unitary {
    pub fn from_rows(rows: Vec<Vec<Complex>>) -> Result<Self, String> {
        let dim = rows.len();
        if rows.iter().any(|r| r.len() != dim) {
            return Err("unitary operand must be square".to_string());
        }
        if dim == 0 || !dim.is_power_of_two() {
            return Err(format!("unitary operand dimension {dim} is not a power of two"));
        }
        let data = rows.into_iter().flatten().collect();
        Ok(Unitary { dim, data })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn at(&self, row: usize, col: usize) -> Complex {
        self.data[row * self.dim + col]
    }

    /// Frobenius norm of `U U^dagger - I`; invariant 5 treats anything above
    /// 1e-6 as a (non-fatal) diagnostic.
    pub fn unitarity_error(&self) -> Real {
        let n = self.dim;
        let mut sum_sq = 0.0;
        for i in 0..n {
            for j in 0..n {
                let mut acc = Complex::new(0.0, 0.0);
                for k in 0..n {
                    acc = acc.add(self.at(i, k).mul(self.at(j, k).conj()));
                }
                let expected = if i == j { 1.0 } else { 0.0 };
                let diff = Complex::new(acc.re - expected, acc.im);
                sum_sq += diff.re * diff.re + diff.im * diff.im;
            }
        }
        sum_sq.sqrt()
    }

    pub fn is_unitary(&self, tolerance: Real) -> bool {
        self.unitarity_error() <= tolerance
    }
}

/// Default tolerance used when checking invariant 5.
pub const UNITARY_TOLERANCE: Real = 1e-6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering_pads_missing_components() {
        let v1 = Version::new(vec![1, 2]).unwrap();
        let v2 = Version::new(vec![1, 2, 0]).unwrap();
        assert_eq!(v1, v1.clone());
        assert!(v1 <= v2);
        assert!(Version::new(vec![1, 1]).unwrap() < v1);
    }

    #[test]
    fn version_rejects_negative_components() {
        assert!(Version::new(vec![1, -1]).is_err());
        assert!(Version::new(vec![]).is_err());
    }

    #[test]
    fn rmatrix_rejects_unequal_row_lengths() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(RMatrix::from_rows(rows).is_err());
    }

    #[test]
    fn identity_unitary_has_zero_error() {
        let rows = vec![
            vec![Complex::new(1.0, 0.0), Complex::new(0.0, 0.0)],
            vec![Complex::new(0.0, 0.0), Complex::new(1.0, 0.0)],
        ];
        let u = Unitary::from_rows(rows).unwrap();
        assert!(u.is_unitary(UNITARY_TOLERANCE));
    }

    #[test]
    fn non_power_of_two_dimension_rejected() {
        let rows = vec![
            vec![Complex::new(1.0, 0.0); 3];
            3
        ];
        assert!(Unitary::from_rows(rows).is_err());
    }
}
