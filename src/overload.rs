//! Generic overload resolution
//!
//! Direct counterpart to `cqasm-overload.hpp`'s `Overload`/`OverloadResolver`/
//! `OverloadedNameResolver` templates: a name maps to a list of overloads
//! registered in insertion order; resolution walks that list **in reverse**
//! so later registrations win ties, checks arity, then tries to
//! [`crate::values::promote`] every argument to the overload's declared
//! parameter types. The first overload where every argument promotes wins.

use crate::types::Type;
use crate::values::{promote, Value};
use std::collections::HashMap;

/// One registered overload: an opaque `tag` (the thing resolution returns,
/// e.g. a function pointer or instruction descriptor) plus its declared
/// parameter types.
#[derive(Debug, Clone)]
pub struct Overload<Tag> {
    pub tag: Tag,
    pub param_types: Vec<Type>,
}

impl<Tag> Overload<Tag> {
    pub fn new(tag: Tag, param_types: Vec<Type>) -> Self {
        Overload { tag, param_types }
    }
}

/// All overloads registered under a single name, tried in reverse
/// registration order.
#[derive(Debug, Clone)]
pub struct OverloadResolver<Tag> {
    overloads: Vec<Overload<Tag>>,
}

impl<Tag> OverloadResolver<Tag> {
    pub fn new() -> Self {
        OverloadResolver { overloads: Vec::new() }
    }

    pub fn add_overload(&mut self, tag: Tag, param_types: Vec<Type>) {
        self.overloads.push(Overload::new(tag, param_types));
    }

    /// Attempts to resolve `args` against the registered overloads. Returns
    /// the winning tag together with every argument promoted to that
    /// overload's parameter types, in argument order.
    pub fn resolve(&self, args: &[Value]) -> Result<(&Tag, Vec<Value>), String>
    where
        Tag: Clone,
    {
        for overload in self.overloads.iter().rev() {
            if overload.param_types.len() != args.len() {
                continue;
            }
            let mut promoted = Vec::with_capacity(args.len());
            let mut ok = true;
            for (arg, param_ty) in args.iter().zip(&overload.param_types) {
                match promote(arg, param_ty) {
                    Some(v) => promoted.push(v),
                    None => {
                        ok = false;
                        break;
                    }
                }
            }
            if ok {
                return Ok((&overload.tag, promoted));
            }
        }
        let arg_types: Vec<String> = args.iter().map(|a| a.type_of().to_string()).collect();
        Err(format!(
            "no overload accepts argument types ({})",
            arg_types.join(", ")
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    pub fn len(&self) -> usize {
        self.overloads.len()
    }
}

impl<Tag> Default for OverloadResolver<Tag> {
    fn default() -> Self {
        Self::new()
    }
}

/// A name-keyed table of [`OverloadResolver`]s. Lookup is always
/// case-sensitive; a case-insensitive table is obtained by lowercasing both
/// at registration and at lookup time (cQASM identifiers are already
/// expected to be lowercase by convention, so this crate does not do that
/// implicitly).
#[derive(Debug, Clone)]
pub struct OverloadedNameResolver<Tag> {
    by_name: HashMap<String, OverloadResolver<Tag>>,
}

impl<Tag> OverloadedNameResolver<Tag> {
    pub fn new() -> Self {
        OverloadedNameResolver { by_name: HashMap::new() }
    }

    pub fn register(&mut self, name: impl Into<String>, tag: Tag, param_types: Vec<Type>) {
        self.by_name.entry(name.into()).or_insert_with(OverloadResolver::new).add_overload(tag, param_types);
    }

    pub fn resolve(&self, name: &str, args: &[Value]) -> Result<(&Tag, Vec<Value>), String>
    where
        Tag: Clone,
    {
        match self.by_name.get(name) {
            None => Err(format!("unknown name '{name}'")),
            Some(resolver) => resolver.resolve(args).map_err(|e| format!("'{name}': {e}")),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}

impl<Tag> Default for OverloadedNameResolver<Tag> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_registration_wins_on_ambiguity() {
        let mut table: OverloadedNameResolver<&'static str> = OverloadedNameResolver::new();
        table.register("f", "generic", vec![Type::int()]);
        table.register("f", "specific", vec![Type::int()]);
        let (tag, _) = table.resolve("f", &[Value::ConstInt(1)]).unwrap();
        assert_eq!(*tag, "specific");
    }

    #[test]
    fn arity_mismatch_is_skipped() {
        let mut table: OverloadedNameResolver<&'static str> = OverloadedNameResolver::new();
        table.register("f", "one-arg", vec![Type::int()]);
        table.register("f", "two-arg", vec![Type::int(), Type::int()]);
        let (tag, args) = table.resolve("f", &[Value::ConstInt(1), Value::ConstInt(2)]).unwrap();
        assert_eq!(*tag, "two-arg");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn promotion_applies_during_resolution() {
        let mut table: OverloadedNameResolver<&'static str> = OverloadedNameResolver::new();
        table.register("f", "real-overload", vec![Type::real()]);
        let (_, promoted) = table.resolve("f", &[Value::ConstInt(3)]).unwrap();
        assert_eq!(promoted[0], Value::ConstReal(3.0));
    }

    #[test]
    fn unresolved_name_is_an_error() {
        let table: OverloadedNameResolver<&'static str> = OverloadedNameResolver::new();
        assert!(table.resolve("missing", &[]).is_err());
    }

    #[test]
    fn no_matching_overload_is_an_error() {
        let mut table: OverloadedNameResolver<&'static str> = OverloadedNameResolver::new();
        table.register("f", "int-only", vec![Type::int()]);
        assert!(table.resolve("f", &[Value::ConstString("x".to_string())]).is_err());
    }
}
