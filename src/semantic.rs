//! The semantic tree
//!
//! What `crate::analyzer` produces: a fully resolved, typed view of a
//! cQASM program. Unlike the AST (`crate::ast`), every reference here is
//! either a concrete `Value` or a `crate::tree::Link`/`OptLink` into this
//! program's own arenas — there is no more name lookup left to do once a
//! `Program` exists.

use crate::ast::SourceLocation;
use crate::primitives::Version;
use crate::tree::{Arena, NodeId, OptLink};
use crate::values::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A fully analyzed cQASM program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub version: Version,
    pub num_qubits: i64,
    pub error_model: Option<ErrorModel>,
    pub subcircuits: Arena<Subcircuit>,
    pub mappings: Vec<Mapping>,
    pub variables: Vec<Variable>,
    /// The analyzer's own API version; invariant 6 requires this to be
    /// `>=` the program's declared `version`.
    pub api_version: Version,
}

impl Program {
    /// A readable, deterministic dump of the tree's structure, used by the
    /// `--dump-tree` CLI flag and in tests as a cheap golden-output check.
    pub fn dump_tree(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Program v{} (api {})\n", self.version, self.api_version));
        out.push_str(&format!("  num_qubits: {}\n", self.num_qubits));
        if let Some(em) = &self.error_model {
            out.push_str(&format!("  error_model: {}\n", em.name));
        }
        for v in &self.variables {
            out.push_str(&format!("  variable {}: {}\n", v.name, v.ty));
        }
        for m in &self.mappings {
            out.push_str(&format!("  mapping {} = {:?}\n", m.name, m.value));
        }
        for sc in self.subcircuits.iter() {
            out.push_str(&format!("  subcircuit {} (x{})\n", sc.name, sc.iterations));
            dump_block(&sc.body, 2, &mut out);
        }
        out
    }

    /// Subcircuits reachable from the first one, following either the
    /// implicit fallthrough into the next subcircuit or an explicit `goto`.
    /// Anything left out is dead: a subcircuit a program can declare but
    /// never actually execute.
    pub fn find_reachable(&self) -> HashSet<NodeId<Subcircuit>> {
        let mut reachable = HashSet::new();
        let ids: Vec<_> = self.subcircuits.ids().collect();
        let Some(&first) = ids.first() else {
            return reachable;
        };
        let mut stack = vec![first];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            let sc = self.subcircuits.get(id);
            for target in goto_targets(&sc.body) {
                if let Some(resolved) = target.id() {
                    stack.push(resolved);
                }
            }
            if let Some(next_pos) = ids.iter().position(|i| *i == id).map(|p| p + 1) {
                if let Some(&next) = ids.get(next_pos) {
                    stack.push(next);
                }
            }
        }
        reachable
    }

    /// Every `goto` target in a fully analyzed program must be resolved;
    /// an `Unresolved` `OptLink` surviving this far is an analyzer bug (the
    /// user-facing "unknown subcircuit" diagnostic is raised earlier, while
    /// resolving goto links, not here).
    pub fn check_complete(&self) -> Result<(), String> {
        for sc in self.subcircuits.iter() {
            if let Some(name) = goto_targets(&sc.body).into_iter().find_map(|t| t.deferred_name()) {
                return Err(format!("unresolved goto target '{name}' survived analysis"));
            }
        }
        Ok(())
    }
}

fn goto_targets(block: &Block) -> Vec<&OptLink<Subcircuit>> {
    let mut out = Vec::new();
    collect_goto_targets(block, &mut out);
    out
}

fn collect_goto_targets<'a>(block: &'a Block, out: &mut Vec<&'a OptLink<Subcircuit>>) {
    for stmt in &block.statements {
        match stmt {
            Statement::BundleExt(bases, _) => {
                for base in bases {
                    if let InstructionBase::GotoInstruction { target, .. } = base {
                        out.push(target);
                    }
                }
            }
            Statement::IfElse { branches, else_branch, .. } => {
                for (_, body) in branches {
                    collect_goto_targets(body, out);
                }
                if let Some(body) = else_branch {
                    collect_goto_targets(body, out);
                }
            }
            Statement::ForLoop { body, .. }
            | Statement::ForeachLoop { body, .. }
            | Statement::WhileLoop { body, .. }
            | Statement::RepeatUntilLoop { body, .. } => collect_goto_targets(body, out),
            Statement::Break(_) | Statement::Continue(_) => {}
        }
    }
}

fn dump_block(block: &Block, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    for stmt in &block.statements {
        out.push_str(&format!("{pad}{}\n", describe_statement(stmt)));
        match stmt {
            Statement::IfElse { branches, else_branch, .. } => {
                for (_, body) in branches {
                    dump_block(body, indent + 1, out);
                }
                if let Some(body) = else_branch {
                    dump_block(body, indent + 1, out);
                }
            }
            Statement::ForLoop { body, .. }
            | Statement::ForeachLoop { body, .. }
            | Statement::WhileLoop { body, .. }
            | Statement::RepeatUntilLoop { body, .. } => dump_block(body, indent + 1, out),
            _ => {}
        }
    }
}

fn describe_statement(stmt: &Statement) -> String {
    match stmt {
        Statement::BundleExt(instrs, _) => format!("bundle ({} instruction(s))", instrs.len()),
        Statement::IfElse { branches, .. } => format!("if/elif x{}", branches.len()),
        Statement::ForLoop { .. } => "for".to_string(),
        Statement::ForeachLoop { variable, .. } => format!("foreach {variable}"),
        Statement::WhileLoop { .. } => "while".to_string(),
        Statement::RepeatUntilLoop { .. } => "repeat/until".to_string(),
        Statement::Break(_) => "break".to_string(),
        Statement::Continue(_) => "continue".to_string(),
    }
}

/// A dialect-1.x error model declaration (`error_model depolarizing_channel, 0.05`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorModel {
    pub name: String,
    pub operands: Vec<Value>,
    pub location: SourceLocation,
}

/// One named subcircuit. Holds either a flat list of bundles (dialect
/// <=1.1) or exactly one structured `Block` (dialect >=1.2); both shapes
/// are represented with the single `Block` type here, with "bundles only"
/// simply being a `Block` whose statements are all `Statement::BundleExt`.
/// `crate::analyzer` is responsible for rejecting structured statements
/// when the active dialect doesn't allow them, rather than this type
/// forbidding it structurally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcircuit {
    pub name: String,
    pub iterations: i64,
    pub body: Block,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new() -> Self {
        Block::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    BundleExt(Vec<InstructionBase>, SourceLocation),
    IfElse {
        branches: Vec<(Value, Block)>,
        else_branch: Option<Block>,
        location: SourceLocation,
    },
    ForLoop {
        init: Option<Box<InstructionBase>>,
        condition: Value,
        update: Option<Box<InstructionBase>>,
        body: Block,
        location: SourceLocation,
    },
    ForeachLoop { variable: String, from: i64, to: i64, body: Block, location: SourceLocation },
    WhileLoop { condition: Value, body: Block, location: SourceLocation },
    RepeatUntilLoop { body: Block, condition: Value, location: SourceLocation },
    Break(SourceLocation),
    Continue(SourceLocation),
}

/// One resolved gate/meta-instruction call inside a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionBaseData {
    pub condition: Option<Value>,
    pub annotations: Vec<AnnotationData>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InstructionBase {
    Instruction { name: String, operands: Vec<Value>, data: InstructionBaseData },
    SetInstruction { lhs: Value, rhs: Value, data: InstructionBaseData },
    GotoInstruction { target: OptLink<Subcircuit>, data: InstructionBaseData },
}

impl InstructionBase {
    pub fn data(&self) -> &InstructionBaseData {
        match self {
            InstructionBase::Instruction { data, .. }
            | InstructionBase::SetInstruction { data, .. }
            | InstructionBase::GotoInstruction { data, .. } => data,
        }
    }

    /// Structural equality ignoring annotations and source location: two
    /// instructions that do the same thing with different `@`-annotations
    /// attached are still `equals`, even though they aren't `==`.
    pub fn equals(&self, other: &InstructionBase) -> bool {
        match (self, other) {
            (
                InstructionBase::Instruction { name: n1, operands: o1, .. },
                InstructionBase::Instruction { name: n2, operands: o2, .. },
            ) => n1 == n2 && o1 == o2,
            (
                InstructionBase::SetInstruction { lhs: l1, rhs: r1, .. },
                InstructionBase::SetInstruction { lhs: l2, rhs: r2, .. },
            ) => l1 == l2 && r1 == r2,
            (
                InstructionBase::GotoInstruction { target: t1, .. },
                InstructionBase::GotoInstruction { target: t2, .. },
            ) => t1 == t2,
            _ => false,
        }
    }
}

/// A user-visible mapping: `map name = expr`, flattened into the program
/// regardless of which scope declared it (the scope it was declared in
/// still gates where it's *visible*, enforced at analysis time, not by this
/// type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mapping {
    pub name: String,
    pub value: Value,
    pub location: SourceLocation,
}

/// A user-declared classical or quantum variable (v3.x `qubit q`, `bit[5] b`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub ty: crate::types::Type,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationData {
    pub name: String,
    pub operands: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::synthetic()
    }

    #[test]
    fn dump_tree_includes_subcircuit_names() {
        let mut program = Program {
            version: Version::new(vec![1, 2]).unwrap(),
            num_qubits: 3,
            error_model: None,
            subcircuits: Arena::new(),
            mappings: vec![],
            variables: vec![],
            api_version: Version::new(vec![1, 2]).unwrap(),
        };
        program.subcircuits.push(Subcircuit {
            name: "main".to_string(),
            iterations: 1,
            body: Block::new(),
            location: loc(),
        });
        let dump = program.dump_tree();
        assert!(dump.contains("subcircuit main"));
        assert!(dump.contains("num_qubits: 3"));
    }

    #[test]
    fn instruction_base_data_accessor_covers_all_variants() {
        let data = InstructionBaseData { condition: None, annotations: vec![], location: loc() };
        let instr = InstructionBase::Instruction { name: "x".to_string(), operands: vec![], data };
        assert!(instr.data().condition.is_none());
    }

    #[test]
    fn instruction_base_equals_ignores_annotations_and_location() {
        let data_a = InstructionBaseData {
            condition: None,
            annotations: vec![AnnotationData { name: "note".to_string(), operands: vec![] }],
            location: loc(),
        };
        let data_b = InstructionBaseData {
            condition: None,
            annotations: vec![],
            location: SourceLocation::new("other.cq", 7, 0),
        };
        let a = InstructionBase::Instruction { name: "x".to_string(), operands: vec![], data: data_a };
        let b = InstructionBase::Instruction { name: "x".to_string(), operands: vec![], data: data_b };
        assert!(a.equals(&b));
    }

    fn program_with_empty_subcircuits(names: &[&str]) -> Program {
        let mut program = Program {
            version: Version::new(vec![1, 2]).unwrap(),
            num_qubits: 1,
            error_model: None,
            subcircuits: Arena::new(),
            mappings: vec![],
            variables: vec![],
            api_version: Version::new(vec![1, 2]).unwrap(),
        };
        for name in names {
            program.subcircuits.push(Subcircuit {
                name: name.to_string(),
                iterations: 1,
                body: Block::new(),
                location: loc(),
            });
        }
        program
    }

    #[test]
    fn find_reachable_includes_fallthrough_and_goto_targets() {
        let mut program = program_with_empty_subcircuits(&["first", "second", "via_goto"]);
        let third_id = program.subcircuits.ids().nth(2).unwrap();
        let data = InstructionBaseData { condition: None, annotations: vec![], location: loc() };
        program.subcircuits.get_mut(program.subcircuits.ids().next().unwrap()).body.statements.push(
            Statement::BundleExt(
                vec![InstructionBase::GotoInstruction { target: OptLink::Resolved(third_id), data }],
                loc(),
            ),
        );
        let reachable = program.find_reachable();
        assert_eq!(reachable.len(), 3, "fallthrough to 'second' plus the goto to 'via_goto'");
    }

    #[test]
    fn check_complete_rejects_an_unresolved_goto() {
        let mut program = program_with_empty_subcircuits(&["main"]);
        let data = InstructionBaseData { condition: None, annotations: vec![], location: loc() };
        program.subcircuits.get_mut(program.subcircuits.ids().next().unwrap()).body.statements.push(
            Statement::BundleExt(
                vec![InstructionBase::GotoInstruction {
                    target: OptLink::unresolved("nowhere"),
                    data,
                }],
                loc(),
            ),
        );
        let err = program.check_complete().unwrap_err();
        assert!(err.contains("nowhere"));
    }
}
