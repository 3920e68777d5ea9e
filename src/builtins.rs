//! Default function and instruction libraries
//!
//! Populates a fresh [`crate::symbols::Scope`] with the standard cQASM
//! operator and transcendental functions plus a representative default
//! instruction set per dialect. A host crate layers its own gates and
//! functions on top via `crate::config::AnalyzerConfig`, the same builder
//! pattern used elsewhere in this crate for extending a default registry
//! with caller-supplied entries.
//!
//! Every entry is a plain `fn(&[Value]) -> Result<Value, String>` rather
//! than a closure: `crate::symbols::FunctionImpl` is a bare function
//! pointer (no captured state), so each operator/type combination below is
//! its own small named function, generated with a macro where the
//! type-specific unpacking would otherwise be pure repetition.

use crate::config::Dialect;
use crate::primitives::Complex;
use crate::symbols::{ErrorModelTag, InstructionTag, Scope};
use crate::types::Type;
use crate::values::Value;

/// Registers every default function (arithmetic, comparison, bitwise,
/// logical, ternary, transcendental, complex helpers) into `scope`.
pub fn register_default_functions(scope: &mut Scope) {
    register_arithmetic(scope);
    register_comparisons(scope);
    register_bitwise(scope);
    register_logical(scope);
    register_ternary(scope);
    register_transcendentals(scope);
    register_complex_helpers(scope);
}

/// Registers the implicit `true`/`false` constants and `im`, the imaginary
/// unit.
pub fn register_default_constants(scope: &mut Scope) {
    scope.mappings.add("true", Value::ConstBool(true));
    scope.mappings.add("false", Value::ConstBool(false));
    scope.mappings.add("im", Value::ConstComplex(Complex::new(0.0, 1.0)));
}

/// Registers a representative default instruction set for `dialect`:
/// single/two/three-qubit gates, measurement, and the classical `not`
/// meta-instruction. `set`/`goto` are handled structurally by
/// `crate::analyzer` rather than through this table, since they don't
/// resolve to a fixed operand-type signature the same way a gate does.
pub fn register_default_instructions(scope: &mut Scope, dialect: Dialect) {
    let mut gate = |name: &str, arity: usize| {
        let tag = InstructionTag { canonical_name: name.to_string() };
        scope.instructions.register(name, tag, vec![Type::qubit(true); arity]);
    };
    for name in ["x", "y", "z", "h", "i", "s", "sdag", "t", "tdag"] {
        gate(name, 1);
    }
    gate("cnot", 2);
    gate("cz", 2);
    gate("swap", 2);
    gate("toffoli", 3);

    for name in ["rx", "ry", "rz"] {
        scope.instructions.register(
            name,
            InstructionTag { canonical_name: name.to_string() },
            vec![Type::qubit(true), Type::real()],
        );
    }

    scope.instructions.register(
        "measure",
        InstructionTag { canonical_name: "measure".to_string() },
        vec![Type::qubit(true), Type::bit(true)],
    );
    scope.instructions.register(
        "measure_z",
        InstructionTag { canonical_name: "measure_z".to_string() },
        vec![Type::qubit(true)],
    );
    scope.instructions.register(
        "not",
        InstructionTag { canonical_name: "not".to_string() },
        vec![Type::bit(true)],
    );

    if dialect.has_error_model() {
        scope.error_models.register(
            "depolarizing_channel",
            ErrorModelTag { canonical_name: "depolarizing_channel".to_string() },
            vec![Type::real()],
        );
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

fn add_int(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => Ok(Value::ConstInt(a.wrapping_add(*b))),
        _ => Err("operator+: expected (int, int)".to_string()),
    }
}
fn add_real(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstReal(a), Value::ConstReal(b)) => Ok(Value::ConstReal(a + b)),
        _ => Err("operator+: expected (real, real)".to_string()),
    }
}
fn add_complex(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstComplex(a), Value::ConstComplex(b)) => Ok(Value::ConstComplex(a.add(*b))),
        _ => Err("operator+: expected (complex, complex)".to_string()),
    }
}
fn add_string(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstString(a), Value::ConstString(b)) => Ok(Value::ConstString(format!("{a}{b}"))),
        _ => Err("operator+: expected (string, string)".to_string()),
    }
}

fn sub_int(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => Ok(Value::ConstInt(a.wrapping_sub(*b))),
        _ => Err("operator-: expected (int, int)".to_string()),
    }
}
fn sub_real(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstReal(a), Value::ConstReal(b)) => Ok(Value::ConstReal(a - b)),
        _ => Err("operator-: expected (real, real)".to_string()),
    }
}
fn sub_complex(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstComplex(a), Value::ConstComplex(b)) => Ok(Value::ConstComplex(a.sub(*b))),
        _ => Err("operator-: expected (complex, complex)".to_string()),
    }
}
fn neg_int(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstInt(a) => Ok(Value::ConstInt(-a)),
        _ => Err("operator-: expected int".to_string()),
    }
}
fn neg_real(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstReal(a) => Ok(Value::ConstReal(-a)),
        _ => Err("operator-: expected real".to_string()),
    }
}
fn neg_complex(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstComplex(a) => Ok(Value::ConstComplex(Complex::new(-a.re, -a.im))),
        _ => Err("operator-: expected complex".to_string()),
    }
}

fn mul_int(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => Ok(Value::ConstInt(a.wrapping_mul(*b))),
        _ => Err("operator*: expected (int, int)".to_string()),
    }
}
fn mul_real(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstReal(a), Value::ConstReal(b)) => Ok(Value::ConstReal(a * b)),
        _ => Err("operator*: expected (real, real)".to_string()),
    }
}
fn mul_complex(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstComplex(a), Value::ConstComplex(b)) => Ok(Value::ConstComplex(a.mul(*b))),
        _ => Err("operator*: expected (complex, complex)".to_string()),
    }
}

fn div_real(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstReal(a), Value::ConstReal(b)) => {
            if *b == 0.0 {
                Err("division by zero".to_string())
            } else {
                Ok(Value::ConstReal(a / b))
            }
        }
        _ => Err("operator/: expected (real, real)".to_string()),
    }
}
fn div_complex(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstComplex(a), Value::ConstComplex(b)) => {
            a.div(*b).map(Value::ConstComplex).ok_or_else(|| "division by zero".to_string())
        }
        _ => Err("operator/: expected (complex, complex)".to_string()),
    }
}
fn floordiv_int(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => {
            if *b == 0 {
                Err("division by zero".to_string())
            } else {
                Ok(Value::ConstInt(floor_div(*a, *b)))
            }
        }
        _ => Err("operator//: expected (int, int)".to_string()),
    }
}
fn mod_int(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => {
            if *b == 0 {
                Err("division by zero".to_string())
            } else {
                Ok(Value::ConstInt(floor_mod(*a, *b)))
            }
        }
        _ => Err("operator%: expected (int, int)".to_string()),
    }
}

fn pow_real(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstReal(a), Value::ConstReal(b)) => Ok(Value::ConstReal(a.powf(*b))),
        _ => Err("operator**: expected (real, real)".to_string()),
    }
}
fn pow_int(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => {
            if *b < 0 {
                Ok(Value::ConstReal((*a as f64).powf(*b as f64)))
            } else {
                Ok(Value::ConstInt(a.pow(*b as u32)))
            }
        }
        _ => Err("operator**: expected (int, int)".to_string()),
    }
}

fn register_arithmetic(scope: &mut Scope) {
    use Type as T;
    let f = &mut scope.functions;
    f.register("operator+", add_int as crate::symbols::FunctionImpl, vec![T::int(), T::int()]);
    f.register("operator+", add_real, vec![T::real(), T::real()]);
    f.register("operator+", add_complex, vec![T::complex(), T::complex()]);
    f.register("operator+", add_string, vec![T::string(), T::string()]);

    f.register("operator-", sub_int, vec![T::int(), T::int()]);
    f.register("operator-", sub_real, vec![T::real(), T::real()]);
    f.register("operator-", sub_complex, vec![T::complex(), T::complex()]);
    f.register("operator-", neg_int, vec![T::int()]);
    f.register("operator-", neg_real, vec![T::real()]);
    f.register("operator-", neg_complex, vec![T::complex()]);

    f.register("operator*", mul_int, vec![T::int(), T::int()]);
    f.register("operator*", mul_real, vec![T::real(), T::real()]);
    f.register("operator*", mul_complex, vec![T::complex(), T::complex()]);

    f.register("operator/", div_real, vec![T::real(), T::real()]);
    f.register("operator/", div_complex, vec![T::complex(), T::complex()]);
    f.register("operator//", floordiv_int, vec![T::int(), T::int()]);
    f.register("operator%", mod_int, vec![T::int(), T::int()]);

    f.register("operator**", pow_real, vec![T::real(), T::real()]);
    f.register("operator**", pow_int, vec![T::int(), T::int()]);
}

macro_rules! cmp_fn {
    ($fn_name:ident, $variant:ident, $ty:ty, $op_name:expr, $op:tt) => {
        fn $fn_name(args: &[Value]) -> Result<Value, String> {
            match (&args[0], &args[1]) {
                (Value::$variant(a), Value::$variant(b)) => Ok(Value::ConstBool(a $op b)),
                _ => Err(concat!($op_name, ": operand type mismatch").to_string()),
            }
        }
    };
}

cmp_fn!(eq_int, ConstInt, i64, "operator==", ==);
cmp_fn!(eq_real, ConstReal, f64, "operator==", ==);
cmp_fn!(eq_bool, ConstBool, bool, "operator==", ==);
cmp_fn!(eq_complex, ConstComplex, Complex, "operator==", ==);
cmp_fn!(ne_int, ConstInt, i64, "operator!=", !=);
cmp_fn!(ne_real, ConstReal, f64, "operator!=", !=);
cmp_fn!(ne_bool, ConstBool, bool, "operator!=", !=);
cmp_fn!(ne_complex, ConstComplex, Complex, "operator!=", !=);
cmp_fn!(lt_int, ConstInt, i64, "operator<", <);
cmp_fn!(lt_real, ConstReal, f64, "operator<", <);
cmp_fn!(le_int, ConstInt, i64, "operator<=", <=);
cmp_fn!(le_real, ConstReal, f64, "operator<=", <=);
cmp_fn!(gt_int, ConstInt, i64, "operator>", >);
cmp_fn!(gt_real, ConstReal, f64, "operator>", >);
cmp_fn!(ge_int, ConstInt, i64, "operator>=", >=);
cmp_fn!(ge_real, ConstReal, f64, "operator>=", >=);

fn register_comparisons(scope: &mut Scope) {
    use Type as T;
    let f = &mut scope.functions;
    f.register("operator==", eq_int, vec![T::int(), T::int()]);
    f.register("operator==", eq_real, vec![T::real(), T::real()]);
    f.register("operator==", eq_bool, vec![T::bool_(), T::bool_()]);
    f.register("operator==", eq_complex, vec![T::complex(), T::complex()]);
    f.register("operator!=", ne_int, vec![T::int(), T::int()]);
    f.register("operator!=", ne_real, vec![T::real(), T::real()]);
    f.register("operator!=", ne_bool, vec![T::bool_(), T::bool_()]);
    f.register("operator!=", ne_complex, vec![T::complex(), T::complex()]);
    f.register("operator<", lt_int, vec![T::int(), T::int()]);
    f.register("operator<", lt_real, vec![T::real(), T::real()]);
    f.register("operator<=", le_int, vec![T::int(), T::int()]);
    f.register("operator<=", le_real, vec![T::real(), T::real()]);
    f.register("operator>", gt_int, vec![T::int(), T::int()]);
    f.register("operator>", gt_real, vec![T::real(), T::real()]);
    f.register("operator>=", ge_int, vec![T::int(), T::int()]);
    f.register("operator>=", ge_real, vec![T::real(), T::real()]);
}

fn bitnot(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstInt(a) => Ok(Value::ConstInt(!a)),
        _ => Err("operator~: expected int".to_string()),
    }
}
fn bitand(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => Ok(Value::ConstInt(a & b)),
        _ => Err("operator&: expected (int, int)".to_string()),
    }
}
fn bitor(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => Ok(Value::ConstInt(a | b)),
        _ => Err("operator|: expected (int, int)".to_string()),
    }
}
fn bitxor(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => Ok(Value::ConstInt(a ^ b)),
        _ => Err("operator^: expected (int, int)".to_string()),
    }
}
fn shl(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => Ok(Value::ConstInt(a << (b & 63))),
        _ => Err("operator<<: expected (int, int)".to_string()),
    }
}
fn shr_arith(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => Ok(Value::ConstInt(a >> (b & 63))),
        _ => Err("operator>>: expected (int, int)".to_string()),
    }
}
fn shr_logical(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstInt(a), Value::ConstInt(b)) => Ok(Value::ConstInt(((*a as u64) >> (b & 63)) as i64)),
        _ => Err("operator>>>: expected (int, int)".to_string()),
    }
}

fn register_bitwise(scope: &mut Scope) {
    use Type as T;
    let f = &mut scope.functions;
    f.register("operator~", bitnot, vec![T::int()]);
    f.register("operator&", bitand, vec![T::int(), T::int()]);
    f.register("operator|", bitor, vec![T::int(), T::int()]);
    f.register("operator^", bitxor, vec![T::int(), T::int()]);
    f.register("operator<<", shl, vec![T::int(), T::int()]);
    f.register("operator>>", shr_arith, vec![T::int(), T::int()]);
    f.register("operator>>>", shr_logical, vec![T::int(), T::int()]);
}

fn lognot(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstBool(a) => Ok(Value::ConstBool(!a)),
        _ => Err("operator!: expected bool".to_string()),
    }
}
fn logand(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstBool(a), Value::ConstBool(b)) => Ok(Value::ConstBool(*a && *b)),
        _ => Err("operator&&: expected (bool, bool)".to_string()),
    }
}
fn logor(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstBool(a), Value::ConstBool(b)) => Ok(Value::ConstBool(*a || *b)),
        _ => Err("operator||: expected (bool, bool)".to_string()),
    }
}
fn logxor(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstBool(a), Value::ConstBool(b)) => Ok(Value::ConstBool(a ^ b)),
        _ => Err("operator^^: expected (bool, bool)".to_string()),
    }
}

fn register_logical(scope: &mut Scope) {
    use Type as T;
    let f = &mut scope.functions;
    f.register("operator!", lognot, vec![T::bool_()]);
    f.register("operator&&", logand, vec![T::bool_(), T::bool_()]);
    f.register("operator||", logor, vec![T::bool_(), T::bool_()]);
    f.register("operator^^", logxor, vec![T::bool_(), T::bool_()]);
}

fn ternary(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstBool(true) => Ok(args[1].clone()),
        Value::ConstBool(false) => Ok(args[2].clone()),
        other => Err(format!("operator?: condition must be bool, got {}", other.type_of())),
    }
}

fn register_ternary(scope: &mut Scope) {
    use Type as T;
    let f = &mut scope.functions;
    for ty in [T::complex(), T::real(), T::int(), T::bool_()] {
        f.register("operator?:", ternary, vec![T::bool_(), ty.clone(), ty]);
    }
}

macro_rules! real_unary_fn {
    ($fn_name:ident, $op:expr) => {
        fn $fn_name(args: &[Value]) -> Result<Value, String> {
            match &args[0] {
                Value::ConstReal(a) => Ok(Value::ConstReal($op(*a))),
                _ => Err(concat!(stringify!($fn_name), ": expected real").to_string()),
            }
        }
    };
}

real_unary_fn!(fn_sqrt, f64::sqrt);
real_unary_fn!(fn_exp, f64::exp);
real_unary_fn!(fn_log, f64::ln);
real_unary_fn!(fn_sin, f64::sin);
real_unary_fn!(fn_cos, f64::cos);
real_unary_fn!(fn_tan, f64::tan);
real_unary_fn!(fn_asin, f64::asin);
real_unary_fn!(fn_acos, f64::acos);
real_unary_fn!(fn_atan, f64::atan);
real_unary_fn!(fn_sinh, f64::sinh);
real_unary_fn!(fn_cosh, f64::cosh);
real_unary_fn!(fn_tanh, f64::tanh);
real_unary_fn!(fn_asinh, f64::asinh);
real_unary_fn!(fn_acosh, f64::acosh);
real_unary_fn!(fn_atanh, f64::atanh);

fn abs_int(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstInt(a) => Ok(Value::ConstInt(a.abs())),
        _ => Err("abs: expected int".to_string()),
    }
}
fn abs_real(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstReal(a) => Ok(Value::ConstReal(a.abs())),
        _ => Err("abs: expected real".to_string()),
    }
}

fn register_transcendentals(scope: &mut Scope) {
    use Type as T;
    let f = &mut scope.functions;
    f.register("sqrt", fn_sqrt, vec![T::real()]);
    f.register("exp", fn_exp, vec![T::real()]);
    f.register("log", fn_log, vec![T::real()]);
    f.register("sin", fn_sin, vec![T::real()]);
    f.register("cos", fn_cos, vec![T::real()]);
    f.register("tan", fn_tan, vec![T::real()]);
    f.register("asin", fn_asin, vec![T::real()]);
    f.register("acos", fn_acos, vec![T::real()]);
    f.register("atan", fn_atan, vec![T::real()]);
    f.register("sinh", fn_sinh, vec![T::real()]);
    f.register("cosh", fn_cosh, vec![T::real()]);
    f.register("tanh", fn_tanh, vec![T::real()]);
    f.register("asinh", fn_asinh, vec![T::real()]);
    f.register("acosh", fn_acosh, vec![T::real()]);
    f.register("atanh", fn_atanh, vec![T::real()]);
    f.register("abs", abs_int, vec![T::int()]);
    f.register("abs", abs_real, vec![T::real()]);
}

fn make_complex(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstReal(re), Value::ConstReal(im)) => Ok(Value::ConstComplex(Complex::new(*re, *im))),
        _ => Err("complex: expected (real, real)".to_string()),
    }
}
fn make_polar(args: &[Value]) -> Result<Value, String> {
    match (&args[0], &args[1]) {
        (Value::ConstReal(r), Value::ConstReal(theta)) => Ok(Value::ConstComplex(Complex::polar(*r, *theta))),
        _ => Err("polar: expected (real, real)".to_string()),
    }
}
fn complex_real(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstComplex(c) => Ok(Value::ConstReal(c.re)),
        _ => Err("real: expected complex".to_string()),
    }
}
fn complex_imag(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstComplex(c) => Ok(Value::ConstReal(c.im)),
        _ => Err("imag: expected complex".to_string()),
    }
}
fn complex_arg(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstComplex(c) => Ok(Value::ConstReal(c.arg())),
        _ => Err("arg: expected complex".to_string()),
    }
}
fn complex_norm(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstComplex(c) => Ok(Value::ConstReal(c.norm())),
        _ => Err("norm: expected complex".to_string()),
    }
}
fn complex_conj(args: &[Value]) -> Result<Value, String> {
    match &args[0] {
        Value::ConstComplex(c) => Ok(Value::ConstComplex(c.conj())),
        _ => Err("conj: expected complex".to_string()),
    }
}

fn register_complex_helpers(scope: &mut Scope) {
    use Type as T;
    let f = &mut scope.functions;
    f.register("complex", make_complex, vec![T::real(), T::real()]);
    f.register("polar", make_polar, vec![T::real(), T::real()]);
    f.register("real", complex_real, vec![T::complex()]);
    f.register("imag", complex_imag, vec![T::complex()]);
    f.register("arg", complex_arg, vec![T::complex()]);
    f.register("norm", complex_norm, vec![T::complex()]);
    f.register("conj", complex_conj, vec![T::complex()]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Scope;

    #[test]
    fn default_constants_registered() {
        let mut scope = Scope::new(false);
        register_default_constants(&mut scope);
        assert_eq!(scope.mappings.get("true"), Some(&Value::ConstBool(true)));
    }

    #[test]
    fn default_instructions_include_measure() {
        let mut scope = Scope::new(false);
        register_default_instructions(&mut scope, Dialect::V3);
        assert!(scope.instructions.contains("measure"));
        assert!(!scope.error_models.contains("depolarizing_channel"));
    }

    #[test]
    fn v1_dialect_registers_error_model() {
        let mut scope = Scope::new(false);
        register_default_instructions(&mut scope, Dialect::V1);
        assert!(scope.error_models.contains("depolarizing_channel"));
    }

    #[test]
    fn floor_division_matches_python_semantics() {
        assert_eq!(floor_div(-7, 2), -4);
        assert_eq!(floor_mod(-7, 2), 1);
    }

    #[test]
    fn int_addition_resolves_through_scope() {
        let mut scope = Scope::new(false);
        register_default_functions(&mut scope);
        let (tag, args) = scope.functions.resolve("operator+", &[Value::ConstInt(2), Value::ConstInt(3)]).unwrap();
        assert_eq!(tag(&args).unwrap(), Value::ConstInt(5));
    }
}
