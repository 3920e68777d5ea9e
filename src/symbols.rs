//! Symbol tables and the scope stack
//!
//! Four tables live inside every [`Scope`]: mappings, functions,
//! instructions, and (v1.x only) error models. `crate::analyzer` pushes a
//! fresh `Scope` for the global program and for every structured block, and
//! pops it on exit; name lookup walks the stack from innermost to outermost.

use crate::overload::OverloadedNameResolver;
use crate::semantic::{AnnotationData, Variable};
use crate::types::Type;
use crate::values::Value;
use std::collections::HashMap;

/// `name -> Value`. `add` overwrites a prior entry in the same scope: later
/// mappings in the same block shadow earlier ones with the same name.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: HashMap<String, Value>,
}

impl MappingTable {
    pub fn new() -> Self {
        MappingTable::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

/// A registered function implementation: given already-resolved argument
/// `Value`s, produce a result `Value`. Non-constant arguments are the
/// evaluator's concern (it decides whether to call this at all versus
/// leaving a `Value::FunctionCall` in place); by the time a call reaches
/// here every argument is a concrete value.
pub type FunctionImpl = fn(&[Value]) -> Result<Value, String>;

pub type FunctionTable = OverloadedNameResolver<FunctionImpl>;

/// Resolving an instruction yields the gate/meta-instruction's canonical
/// name (it may differ from the call's surface spelling, e.g. case folding)
/// plus the parameter types used to validate operand count/kind at the
/// call site; the analyzer builds the full `Instruction` node from this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionTag {
    pub canonical_name: String,
}

pub type InstructionTable = OverloadedNameResolver<InstructionTag>;

/// Dialect-gated: v1.x's `error_model` statement resolves a model by name
/// and parameter list here; v3.x has no such table at all
/// (`v3x/cqasm-resolver.hpp` has no `ErrorModelTable`), so `Analyzer` simply
/// never populates or consults one in v3.x mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorModelTag {
    pub canonical_name: String,
}

pub type ErrorModelTable = OverloadedNameResolver<ErrorModelTag>;

/// One level of lexical nesting: the global program scope, or a structured
/// block (`if`/`for`/`while`/...) nested inside it.
#[derive(Debug, Default)]
pub struct Scope {
    pub mappings: MappingTable,
    pub functions: FunctionTable,
    pub instructions: InstructionTable,
    pub error_models: ErrorModelTable,
    /// Variables declared directly in this scope, promoted to
    /// `Program.variables` when the scope pops.
    pub variables: Vec<Variable>,
    /// Declared variable types by name, consulted by `resolve_variable`
    /// without needing to scan `variables` linearly.
    variable_types: HashMap<String, Type>,
    /// Whether this scope (or an enclosing one up to the nearest loop) is
    /// inside a loop body, making `break`/`continue` legal.
    pub inside_loop: bool,
}

impl Scope {
    pub fn new(inside_loop: bool) -> Self {
        Scope { inside_loop, ..Default::default() }
    }

    pub fn declare_variable(&mut self, variable: Variable) {
        self.variable_types.insert(variable.name.clone(), variable.ty.clone());
        self.variables.push(variable);
    }

    pub fn variable_type(&self, name: &str) -> Option<&Type> {
        self.variable_types.get(name)
    }
}

/// Innermost-to-outermost stack of [`Scope`]s. `push`/`pop` must be matched
/// LIFO by the caller; this type does not enforce balance itself (the
/// analyzer's structured-statement handlers are responsible for that, the
/// same way `cqasm-analyzer.hpp`'s `push_scope`/`pop_scope` pair is used).
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack { scopes: vec![Scope::new(false)] }
    }

    pub fn push(&mut self, inside_loop: bool) {
        let nested = self.scopes.last().map(|s| s.inside_loop).unwrap_or(false) || inside_loop;
        self.scopes.push(Scope::new(nested));
    }

    /// Pops the innermost scope and returns it so the caller can fold its
    /// variables into the enclosing semantic node.
    pub fn pop(&mut self) -> Scope {
        self.scopes.pop().expect("pop_scope called with no scope pushed")
    }

    pub fn current(&self) -> &Scope {
        self.scopes.last().expect("scope stack is never empty")
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("scope stack is never empty")
    }

    pub fn global(&self) -> &Scope {
        self.scopes.first().expect("scope stack is never empty")
    }

    pub fn global_mut(&mut self) -> &mut Scope {
        self.scopes.first_mut().expect("scope stack is never empty")
    }

    pub fn inside_loop(&self) -> bool {
        self.current().inside_loop
    }

    /// Walks from innermost to outermost scope, returning the first mapping
    /// found under `name`.
    pub fn resolve_mapping(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|s| s.mappings.get(name))
    }

    /// Walks from innermost to outermost scope, returning the first
    /// declared variable's type under `name`.
    pub fn resolve_variable(&self, name: &str) -> Option<&Type> {
        self.scopes.iter().rev().find_map(|s| s.variable_type(name))
    }

    /// Walks from innermost to outermost scope, resolving a function call;
    /// the global scope always carries the default library
    /// (`crate::builtins`), so this never needs to search further than one
    /// hit.
    pub fn resolve_function(&self, name: &str, args: &[Value]) -> Result<(&FunctionImpl, Vec<Value>), String> {
        for scope in self.scopes.iter().rev() {
            if scope.functions.contains(name) {
                return scope.functions.resolve(name, args);
            }
        }
        Err(format!("unknown function '{name}'"))
    }

    pub fn resolve_instruction(&self, name: &str, args: &[Value]) -> Result<(&InstructionTag, Vec<Value>), String> {
        for scope in self.scopes.iter().rev() {
            if scope.instructions.contains(name) {
                return scope.instructions.resolve(name, args);
            }
        }
        Err(format!("unknown instruction '{name}'"))
    }

    pub fn resolve_error_model(&self, name: &str, args: &[Value]) -> Result<(&ErrorModelTag, Vec<Value>), String> {
        for scope in self.scopes.iter().rev() {
            if scope.error_models.contains(name) {
                return scope.error_models.resolve(name, args);
            }
        }
        Err(format!("unknown error model '{name}'"))
    }
}

/// Converts analyzed annotation operands into the semantic tree's
/// `AnnotationData`, reused by every statement handler that can carry
/// annotations (bundles, instructions, structured statements).
pub fn annotation_from_values(name: String, operands: Vec<Value>) -> AnnotationData {
    AnnotationData { name, operands }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_table_later_add_shadows_earlier() {
        let mut table = MappingTable::new();
        table.add("x", Value::ConstInt(1));
        table.add("x", Value::ConstInt(2));
        assert_eq!(table.get("x"), Some(&Value::ConstInt(2)));
    }

    #[test]
    fn scope_stack_resolves_innermost_first() {
        let mut stack = ScopeStack::new();
        stack.global_mut().mappings.add("x", Value::ConstInt(1));
        stack.push(false);
        stack.current_mut().mappings.add("x", Value::ConstInt(2));
        assert_eq!(stack.resolve_mapping("x"), Some(&Value::ConstInt(2)));
        stack.pop();
        assert_eq!(stack.resolve_mapping("x"), Some(&Value::ConstInt(1)));
    }

    #[test]
    fn inside_loop_flag_propagates_to_nested_scopes() {
        let mut stack = ScopeStack::new();
        assert!(!stack.inside_loop());
        stack.push(true);
        assert!(stack.inside_loop());
        stack.push(false);
        assert!(stack.inside_loop(), "nested scope inside a loop body is still inside the loop");
        stack.pop();
        stack.pop();
        assert!(!stack.inside_loop());
    }

    #[test]
    #[should_panic]
    fn popping_the_global_scope_panics() {
        let mut stack = ScopeStack::new();
        stack.pop();
        stack.pop();
    }
}
