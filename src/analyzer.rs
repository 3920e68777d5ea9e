//! Statement analyzer and driver
//!
//! Consumes an `ast::Program` by reference and produces a `semantic::Program`
//! plus an accumulated list of diagnostics, walking each subcircuit
//! statement by statement and resolving deferred `goto` links once the
//! whole tree is built.
//! Nothing here ever panics on a malformed program: every failure mode is a
//! string pushed to `AnalysisResult::errors`, and analysis keeps going to
//! surface as many problems as possible in one pass rather than stopping at
//! the first.

use crate::ast;
use crate::builtins;
use crate::config::{AnalyzerConfig, Dialect};
use crate::evaluator;
use crate::primitives::Version;
use crate::semantic::{
    AnnotationData, Block, ErrorModel, InstructionBase, InstructionBaseData, Mapping, Program,
    Statement, Subcircuit, Variable,
};
use crate::symbols::{annotation_from_values, ScopeStack};
use crate::tree::{Arena, NodeId, OptLink};
use crate::types::Type;
use crate::values::{promote, Value};
use std::collections::HashMap;
use std::path::Path;

/// Result of one `Analyzer::analyze` call. `program` is only fully trusted
/// when `errors` is empty; a non-empty `errors` list may still come with a
/// partially built `program` (e.g. an unresolved goto link), useful for
/// tooling that wants to report on a best-effort tree.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub program: Option<Program>,
    pub errors: Vec<String>,
}

impl AnalysisResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convenience for callers that want `Result`-style use: prints every
    /// accumulated diagnostic to stderr and collapses them into one `Err`,
    /// or returns the analyzed program if there were none.
    pub fn unwrap_program(self) -> Result<Program, String> {
        if self.errors.is_empty() {
            return self.program.ok_or_else(|| "analysis produced no program and no errors".to_string());
        }
        for error in &self.errors {
            eprintln!("{error}");
        }
        Err(format!("{} error(s) during analysis", self.errors.len()))
    }
}

/// Drives one complete analysis. Holds the dialect and declared API version
/// plus the scope stack used only during `analyze`; per the concurrency
/// model, an `Analyzer`'s registered tables are configuration and are not
/// mutated by `analyze` itself, so the same instance can run `analyze`
/// repeatedly on independent inputs.
pub struct Analyzer {
    dialect: Dialect,
    api_version: Version,
    scopes: ScopeStack,
    with_defaults: bool,
    extra_constants: Vec<crate::config::ExtraConstant>,
    extra_functions: Vec<crate::config::ExtraFunction>,
    extra_instructions: Vec<crate::config::ExtraInstruction>,
}

impl Analyzer {
    /// A bare analyzer with no symbols registered at all.
    pub fn new(dialect: Dialect, api_version: Version) -> Self {
        Analyzer {
            dialect,
            api_version,
            scopes: ScopeStack::new(),
            with_defaults: false,
            extra_constants: Vec::new(),
            extra_functions: Vec::new(),
            extra_instructions: Vec::new(),
        }
    }

    /// An analyzer seeded with the default constant/function/instruction
    /// libraries for `dialect`, as a host normally wants. The defaults are
    /// re-registered on every `analyze` call (see there), so this only
    /// needs to record the intent here.
    pub fn with_defaults(dialect: Dialect, api_version: Version) -> Self {
        let mut analyzer = Analyzer::new(dialect, api_version);
        analyzer.with_defaults = true;
        analyzer
    }

    /// Layers a host's `AnalyzerConfig` extras on top of whatever is already
    /// registered, overriding dialect/api_version to match the config.
    /// The extras are recorded rather than registered immediately: `analyze`
    /// rebuilds the scope stack from scratch on every call (so one
    /// `Analyzer` can run repeatedly on independent inputs), and replays
    /// both the defaults and these extras into it each time.
    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.dialect = config.dialect;
        self.api_version = config.api_version;
        self.extra_constants.extend(config.extra_constants);
        self.extra_functions.extend(config.extra_functions);
        self.extra_instructions.extend(config.extra_instructions);
        self
    }

    fn populate_global_scope(
        scope: &mut crate::symbols::Scope,
        with_defaults: bool,
        dialect: Dialect,
        extra_constants: &[crate::config::ExtraConstant],
        extra_functions: &[crate::config::ExtraFunction],
        extra_instructions: &[crate::config::ExtraInstruction],
    ) {
        if with_defaults {
            builtins::register_default_constants(scope);
            builtins::register_default_functions(scope);
            builtins::register_default_instructions(scope, dialect);
        }
        for constant in extra_constants {
            scope.mappings.add(constant.name.clone(), constant.value.clone());
        }
        for function in extra_functions {
            scope.functions.register(function.name.clone(), function.implementation, function.param_types.clone());
        }
        for instruction in extra_instructions {
            let tag = crate::symbols::InstructionTag { canonical_name: instruction.name.clone() };
            scope
                .instructions
                .register(instruction.name.clone(), tag, crate::types::from_spec(&instruction.param_spec));
        }
    }

    /// Convenience wrapper: tokenizes and parses `source`, then analyzes the
    /// result, merging parser diagnostics into the same `errors` list.
    pub fn analyze_string(&mut self, source: &str, filename: &str) -> AnalysisResult {
        let (tokens, lex_diagnostics) = crate::lexer::tokenize(source, filename);
        let (ast_program, parse_diagnostics) = crate::parser::Parser::new(tokens).parse_program();
        let mut errors: Vec<String> =
            lex_diagnostics.iter().chain(parse_diagnostics.iter()).map(|d| d.to_string()).collect();
        let Some(ast_program) = ast_program else {
            return AnalysisResult { program: None, errors };
        };
        let mut result = self.analyze(&ast_program);
        errors.append(&mut result.errors);
        AnalysisResult { program: result.program, errors }
    }

    /// Reads `path` from disk and analyzes it. Returns `Err` only for the
    /// I/O failure itself; parse/semantic problems are accumulated
    /// diagnostics inside the returned `AnalysisResult`, same as
    /// `analyze_string`.
    pub fn analyze_file(&mut self, path: &Path) -> Result<AnalysisResult, String> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        let filename = path.to_string_lossy().to_string();
        Ok(self.analyze_string(&source, &filename))
    }

    /// The full driver described in the component design: validate the
    /// version, size the qubit register, then walk every top-level
    /// statement before resolving deferred goto links.
    pub fn analyze(&mut self, ast_program: &ast::Program) -> AnalysisResult {
        let mut errors = Vec::new();
        self.scopes = ScopeStack::new();
        Self::populate_global_scope(
            self.scopes.global_mut(),
            self.with_defaults,
            self.dialect,
            &self.extra_constants,
            &self.extra_functions,
            &self.extra_instructions,
        );

        let version = match parse_version(&ast_program.version) {
            Ok(v) => v,
            Err(e) => {
                errors.push(format!("{}: {e}", ast_program.location));
                return AnalysisResult { program: None, errors };
            }
        };
        if version > self.api_version {
            errors.push(format!(
                "{}: program declares version {version} but analyzer only supports up to {}",
                ast_program.location, self.api_version
            ));
        }

        let num_qubits = match &ast_program.num_qubits {
            Some(expr) => match evaluator::evaluate(expr, &self.scopes) {
                Ok(Value::ConstInt(n)) if n >= 1 => n,
                Ok(Value::ConstInt(n)) => {
                    errors.push(format!("{}: num_qubits must be >= 1, got {n}", expr.location()));
                    1
                }
                Ok(other) => {
                    errors.push(format!(
                        "{}: num_qubits must be a constant int, got {}",
                        expr.location(),
                        other.type_of()
                    ));
                    1
                }
                Err(e) => {
                    errors.push(e);
                    1
                }
            },
            None => 0,
        };

        let mut ctx = AnalysisCtx {
            dialect: self.dialect,
            version: version.clone(),
            num_qubits,
            subcircuits: Arena::new(),
            mappings: Vec::new(),
            variables: Vec::new(),
            error_model: None,
        };

        let mut current_subcircuit: Option<NodeId<Subcircuit>> = None;
        for stmt in &ast_program.statements {
            ctx.analyze_top_level_statement(stmt, &mut self.scopes, &mut current_subcircuit, &mut errors);
        }

        resolve_gotos(&mut ctx.subcircuits, &mut errors);

        let program = Program {
            version,
            num_qubits: ctx.num_qubits,
            error_model: ctx.error_model,
            subcircuits: ctx.subcircuits,
            mappings: ctx.mappings,
            variables: ctx.variables,
            api_version: self.api_version.clone(),
        };

        AnalysisResult { program: Some(program), errors }
    }
}

/// Parses a dotted version string (e.g. `"1.2"`) the same way a `version`
/// header is validated internally; exposed so callers like the CLI can
/// validate a user-supplied `--api-version` with the identical rules.
pub fn parse_version(text: &str) -> Result<Version, String> {
    let parts: Result<Vec<i64>, _> = text.split('.').map(|p| p.parse::<i64>()).collect();
    let parts = parts.map_err(|_| format!("malformed version string '{text}'"))?;
    Version::new(parts)
}

/// Mutable analysis state threaded through the top-level and nested-block
/// walks; kept separate from `Analyzer` so `&mut self` borrows of the scope
/// stack and of this state don't conflict.
struct AnalysisCtx {
    dialect: Dialect,
    /// The program's own declared `version` header, distinct from `dialect`
    /// (the v1.x/v3.x family split): `set`/`goto` and structured control
    /// flow were introduced in cQASM 1.2, so gating them needs the actual
    /// declared version number, not just which family it belongs to.
    version: Version,
    num_qubits: i64,
    subcircuits: Arena<Subcircuit>,
    mappings: Vec<Mapping>,
    variables: Vec<Variable>,
    error_model: Option<ErrorModel>,
}

/// The earliest declared version allowing `set`/`goto` and structured
/// control flow (`if`/`for`/`foreach`/`while`/`repeat`); cQASM <=1.1
/// programs are flat bundle lists only.
fn min_structured_version() -> Version {
    Version::new(vec![1, 2]).expect("1.2 is a valid version")
}

impl AnalysisCtx {
    fn analyze_top_level_statement(
        &mut self,
        stmt: &ast::Statement,
        scopes: &mut ScopeStack,
        current_subcircuit: &mut Option<NodeId<Subcircuit>>,
        errors: &mut Vec<String>,
    ) {
        match stmt {
            ast::Statement::Mapping { name, value, location } => {
                self.analyze_mapping(name, value, location, scopes, errors);
            }
            ast::Statement::Variables { names, type_name, location } => {
                self.analyze_variables(names, type_name, location, scopes, errors);
            }
            ast::Statement::Subcircuit { name, iterations, location } => {
                *current_subcircuit =
                    Some(self.analyze_subcircuit_header(name, iterations, location, scopes, errors));
            }
            other => match current_subcircuit {
                Some(id) => {
                    if let Some(semantic_stmt) = self.analyze_block_statement(other, scopes, errors) {
                        self.subcircuits.get_mut(*id).body.statements.push(semantic_stmt);
                    }
                }
                None => errors.push(format!(
                    "{}: instructions may only appear inside a subcircuit",
                    other.location()
                )),
            },
        }
    }

    fn analyze_mapping(
        &mut self,
        name: &str,
        value: &ast::Expression,
        location: &ast::SourceLocation,
        scopes: &mut ScopeStack,
        errors: &mut Vec<String>,
    ) {
        match evaluator::evaluate(value, scopes) {
            Ok(v) => {
                scopes.current_mut().mappings.add(name.to_string(), v.clone());
                self.mappings.push(Mapping { name: name.to_string(), value: v, location: location.clone() });
            }
            Err(e) => errors.push(e),
        }
    }

    fn analyze_variables(
        &mut self,
        names: &[String],
        type_name: &str,
        location: &ast::SourceLocation,
        scopes: &mut ScopeStack,
        errors: &mut Vec<String>,
    ) {
        let Some(ty) = type_from_name(type_name) else {
            errors.push(format!("{location}: unknown type name '{type_name}'"));
            return;
        };
        for name in names {
            if scopes.current().variable_type(name).is_some() {
                errors.push(format!("{location}: variable '{name}' already declared in this scope"));
                continue;
            }
            let variable = Variable { name: name.clone(), ty: ty.clone(), location: location.clone() };
            scopes.current_mut().declare_variable(variable.clone());
            self.variables.push(variable);
        }
    }

    fn analyze_subcircuit_header(
        &mut self,
        name: &str,
        iterations: &Option<ast::Expression>,
        location: &ast::SourceLocation,
        scopes: &mut ScopeStack,
        errors: &mut Vec<String>,
    ) -> NodeId<Subcircuit> {
        if self.subcircuits.position(|sc| sc.name == name).is_some() {
            errors.push(format!("{location}: duplicate subcircuit name '{name}'"));
        }
        let iterations = match iterations {
            Some(expr) => match evaluator::evaluate(expr, scopes) {
                Ok(Value::ConstInt(n)) if n >= 1 => n,
                Ok(Value::ConstInt(n)) => {
                    errors.push(format!("{}: subcircuit iteration count must be >= 1, got {n}", expr.location()));
                    1
                }
                Ok(other) => {
                    errors.push(format!(
                        "{}: subcircuit iteration count must be a constant int, got {}",
                        expr.location(),
                        other.type_of()
                    ));
                    1
                }
                Err(e) => {
                    errors.push(e);
                    1
                }
            },
            None => 1,
        };
        self.subcircuits.push(Subcircuit {
            name: name.to_string(),
            iterations,
            body: Block::new(),
            location: location.clone(),
        })
    }

    /// Analyzes a block of statements as used inside a subcircuit body or a
    /// structured statement's nested body.
    fn analyze_block(
        &mut self,
        statements: &[ast::Statement],
        scopes: &mut ScopeStack,
        errors: &mut Vec<String>,
    ) -> Block {
        let mut block = Block::new();
        for stmt in statements {
            if let Some(semantic_stmt) = self.analyze_block_statement(stmt, scopes, errors) {
                block.statements.push(semantic_stmt);
            }
        }
        block
    }

    fn analyze_block_statement(
        &mut self,
        stmt: &ast::Statement,
        scopes: &mut ScopeStack,
        errors: &mut Vec<String>,
    ) -> Option<Statement> {
        let is_structured = matches!(
            stmt,
            ast::Statement::IfElse { .. }
                | ast::Statement::ForLoop { .. }
                | ast::Statement::ForeachLoop { .. }
                | ast::Statement::WhileLoop { .. }
                | ast::Statement::RepeatUntilLoop { .. }
        );
        if is_structured && self.version < min_structured_version() {
            let diagnostic = crate::diagnostics::Diagnostic::error(
                crate::diagnostics::ErrorKind::Dialect,
                format!("structured control flow requires a declared version >= 1.2, program declares {}", self.version),
                stmt.location().clone(),
            );
            errors.push(diagnostic.to_string());
            return None;
        }
        match stmt {
            ast::Statement::Bundle(instrs, location) => {
                Some(self.analyze_bundle(instrs, location, scopes, errors))
            }
            ast::Statement::Mapping { name, value, location } => {
                self.analyze_mapping(name, value, location, scopes, errors);
                None
            }
            ast::Statement::Variables { .. } | ast::Statement::Subcircuit { .. } => {
                errors.push(format!("{}: declaration not allowed inside a structured statement body", stmt.location()));
                None
            }
            ast::Statement::IfElse { branches, else_branch, location } => {
                let mut sem_branches = Vec::with_capacity(branches.len());
                for (cond_expr, body) in branches {
                    let cond = self.eval_bool_condition(cond_expr, scopes, errors);
                    scopes.push(false);
                    let sem_body = self.analyze_block(body, scopes, errors);
                    scopes.pop();
                    sem_branches.push((cond, sem_body));
                }
                let sem_else = else_branch.as_ref().map(|body| {
                    scopes.push(false);
                    let sem_body = self.analyze_block(body, scopes, errors);
                    scopes.pop();
                    sem_body
                });
                Some(Statement::IfElse {
                    branches: sem_branches,
                    else_branch: sem_else,
                    location: location.clone(),
                })
            }
            ast::Statement::ForLoop { init, condition, update, body, location } => {
                scopes.push(true);
                let sem_init = init.as_ref().and_then(|s| self.analyze_set_like(s, scopes, errors)).map(Box::new);
                let cond = self.eval_bool_condition(condition, scopes, errors);
                let sem_update = update.as_ref().and_then(|s| self.analyze_set_like(s, scopes, errors)).map(Box::new);
                let sem_body = self.analyze_block(body, scopes, errors);
                scopes.pop();
                Some(Statement::ForLoop {
                    init: sem_init,
                    condition: cond,
                    update: sem_update,
                    body: sem_body,
                    location: location.clone(),
                })
            }
            ast::Statement::ForeachLoop { variable, from, to, body, location } => {
                if scopes.resolve_variable(variable).is_none() {
                    errors.push(format!("{location}: foreach loop variable '{variable}' is not declared"));
                }
                let from_v = self.eval_const_int(from, scopes, errors);
                let to_v = self.eval_const_int(to, scopes, errors);
                scopes.push(true);
                let sem_body = self.analyze_block(body, scopes, errors);
                scopes.pop();
                Some(Statement::ForeachLoop {
                    variable: variable.clone(),
                    from: from_v,
                    to: to_v,
                    body: sem_body,
                    location: location.clone(),
                })
            }
            ast::Statement::WhileLoop { condition, body, location } => {
                let cond = self.eval_bool_condition(condition, scopes, errors);
                scopes.push(true);
                let sem_body = self.analyze_block(body, scopes, errors);
                scopes.pop();
                Some(Statement::WhileLoop { condition: cond, body: sem_body, location: location.clone() })
            }
            ast::Statement::RepeatUntilLoop { body, condition, location } => {
                scopes.push(true);
                let sem_body = self.analyze_block(body, scopes, errors);
                let cond = self.eval_bool_condition(condition, scopes, errors);
                scopes.pop();
                Some(Statement::RepeatUntilLoop { body: sem_body, condition: cond, location: location.clone() })
            }
            ast::Statement::Break(location) => {
                if !scopes.inside_loop() {
                    errors.push(format!("{location}: break outside a loop"));
                    return None;
                }
                Some(Statement::Break(location.clone()))
            }
            ast::Statement::Continue(location) => {
                if !scopes.inside_loop() {
                    errors.push(format!("{location}: continue outside a loop"));
                    return None;
                }
                Some(Statement::Continue(location.clone()))
            }
        }
    }

    fn eval_bool_condition(
        &mut self,
        expr: &ast::Expression,
        scopes: &mut ScopeStack,
        errors: &mut Vec<String>,
    ) -> Value {
        match evaluator::evaluate(expr, scopes) {
            Ok(v) => match promote(&v, &Type::bool_()) {
                Some(b) => b,
                None => {
                    errors.push(format!("{}: condition must be bool, got {}", expr.location(), v.type_of()));
                    Value::ConstBool(false)
                }
            },
            Err(e) => {
                errors.push(e);
                Value::ConstBool(false)
            }
        }
    }

    fn eval_const_int(&mut self, expr: &ast::Expression, scopes: &mut ScopeStack, errors: &mut Vec<String>) -> i64 {
        match evaluator::evaluate(expr, scopes) {
            Ok(Value::ConstInt(n)) => n,
            Ok(other) => {
                errors.push(format!("{}: expected constant int, got {}", expr.location(), other.type_of()));
                0
            }
            Err(e) => {
                errors.push(e);
                0
            }
        }
    }

    /// Analyzes a `Bundle` AST node appearing as a c-style for loop's
    /// init/update clause: it must contain exactly one instruction, which is
    /// then analyzed as an ordinary instruction (typically `set`).
    fn analyze_set_like(
        &mut self,
        stmt: &ast::Statement,
        scopes: &mut ScopeStack,
        errors: &mut Vec<String>,
    ) -> Option<InstructionBase> {
        match stmt {
            ast::Statement::Bundle(instrs, location) if instrs.len() == 1 => {
                self.analyze_instruction(&instrs[0], scopes, errors)
            }
            other => {
                errors.push(format!(
                    "{}: for-loop init/update must be a single instruction",
                    other.location()
                ));
                None
            }
        }
    }

    fn analyze_bundle(
        &mut self,
        instrs: &[ast::Instruction],
        location: &ast::SourceLocation,
        scopes: &mut ScopeStack,
        errors: &mut Vec<String>,
    ) -> Statement {
        let mut bases = Vec::with_capacity(instrs.len());
        for instr in instrs {
            if let Some(base) = self.analyze_instruction(instr, scopes, errors) {
                bases.push(base);
            }
        }
        check_bundle_overlap(&bases, location, errors);
        Statement::BundleExt(bases, location.clone())
    }

    fn analyze_instruction(
        &mut self,
        instr: &ast::Instruction,
        scopes: &mut ScopeStack,
        errors: &mut Vec<String>,
    ) -> Option<InstructionBase> {
        let condition = instr.condition.as_ref().map(|c| self.eval_bool_condition(c, scopes, errors));
        let annotations = self.analyze_annotations(&instr.annotations, scopes, errors);
        let data = InstructionBaseData { condition, annotations, location: instr.location.clone() };

        if (instr.name == "set" || instr.name == "goto") && self.version < min_structured_version() {
            let diagnostic = crate::diagnostics::Diagnostic::error(
                crate::diagnostics::ErrorKind::Dialect,
                format!("'{}' requires a declared version >= 1.2, program declares {}", instr.name, self.version),
                instr.location.clone(),
            );
            errors.push(diagnostic.to_string());
            return None;
        }

        if instr.name == "set" {
            if instr.operands.len() != 2 {
                errors.push(format!("{}: set requires exactly 2 operands", instr.location));
                return None;
            }
            let lhs = match evaluator::evaluate(&instr.operands[0], scopes) {
                Ok(v) => self.expand_whole_register_ref(v),
                Err(e) => {
                    errors.push(e);
                    return None;
                }
            };
            if !lhs.type_of().is_assignable() {
                errors.push(format!("{}: left-hand side of 'set' is not assignable", instr.location));
                return None;
            }
            let rhs = match evaluator::evaluate(&instr.operands[1], scopes) {
                Ok(v) => v,
                Err(e) => {
                    errors.push(e);
                    return None;
                }
            };
            let rhs = match promote(&rhs, &lhs.type_of()) {
                Some(v) => v,
                None => {
                    errors.push(format!(
                        "{}: cannot assign {} to {}",
                        instr.location,
                        rhs.type_of(),
                        lhs.type_of()
                    ));
                    return None;
                }
            };
            self.check_index_bounds(&lhs, &instr.location, errors);
            return Some(InstructionBase::SetInstruction { lhs, rhs, data });
        }

        if instr.name == "goto" {
            let Some(ast::Expression::Identifier(target_name, _)) = instr.operands.first() else {
                errors.push(format!("{}: goto requires a subcircuit name", instr.location));
                return None;
            };
            return Some(InstructionBase::GotoInstruction {
                target: OptLink::unresolved(target_name.clone()),
                data,
            });
        }

        if instr.name == "error_model" && self.dialect.has_error_model() {
            let operand_values: Result<Vec<Value>, String> =
                instr.operands.iter().map(|e| evaluator::evaluate(e, scopes)).collect();
            let operand_values = match operand_values {
                Ok(v) => v.into_iter().map(|v| self.expand_whole_register_ref(v)).collect(),
                Err(e) => {
                    errors.push(e);
                    return None;
                }
            };
            match scopes.resolve_error_model(&instr.name, &operand_values) {
                Ok((tag, promoted)) => {
                    self.error_model = Some(ErrorModel {
                        name: tag.canonical_name.clone(),
                        operands: promoted,
                        location: instr.location.clone(),
                    });
                }
                Err(e) => errors.push(format!("{}: {e}", instr.location)),
            }
            return None;
        }

        let operand_values: Result<Vec<Value>, String> =
            instr.operands.iter().map(|e| evaluator::evaluate(e, scopes)).collect();
        let operand_values = match operand_values {
            Ok(v) => v.into_iter().map(|v| self.expand_whole_register_ref(v)).collect(),
            Err(e) => {
                errors.push(e);
                return None;
            }
        };
        match scopes.resolve_instruction(&instr.name, &operand_values) {
            Ok((tag, promoted)) => {
                for v in &promoted {
                    self.check_index_bounds(v, &instr.location, errors);
                }
                Some(InstructionBase::Instruction {
                    name: tag.canonical_name.clone(),
                    operands: promoted,
                    data,
                })
            }
            Err(e) => {
                errors.push(format!("{}: {e}", instr.location));
                None
            }
        }
    }

    fn analyze_annotations(
        &mut self,
        annotations: &[ast::AnnotationData],
        scopes: &mut ScopeStack,
        errors: &mut Vec<String>,
    ) -> Vec<AnnotationData> {
        annotations
            .iter()
            .filter_map(|a| {
                let operands: Result<Vec<Value>, String> =
                    a.operands.iter().map(|e| evaluator::evaluate(e, scopes)).collect();
                match operands {
                    Ok(values) => Some(annotation_from_values(a.name.clone(), values)),
                    Err(e) => {
                        errors.push(e);
                        None
                    }
                }
            })
            .collect()
    }

    /// A bare, unindexed `q`/`b` operand evaluates to a reference with no
    /// indices at all; per the data model every `QubitRef`/`BitRef` carries
    /// a nonempty set of indices, so the empty case is expanded here to the
    /// whole register (`0..num_qubits`) rather than left to silently
    /// type-check as a zero-operand reference.
    fn expand_whole_register_ref(&self, value: Value) -> Value {
        match value {
            Value::QubitRef { indices } if indices.is_empty() => {
                Value::QubitRef { indices: (0..self.num_qubits).collect() }
            }
            Value::BitRef { indices } if indices.is_empty() => {
                Value::BitRef { indices: (0..self.num_qubits).collect() }
            }
            other => other,
        }
    }

    /// Invariant 7: every qubit/bit index referenced lies in `[0, num_qubits)`.
    fn check_index_bounds(&self, value: &Value, location: &ast::SourceLocation, errors: &mut Vec<String>) {
        let indices: &[i64] = match value {
            Value::QubitRef { indices } | Value::BitRef { indices } => indices,
            _ => return,
        };
        for &i in indices {
            if i < 0 || i >= self.num_qubits {
                errors.push(format!(
                    "{location}: index {i} out of range for {} qubits",
                    self.num_qubits
                ));
            }
        }
    }
}

/// Invariant 9: within one bundle, no two instructions may share an
/// overlapping qubit operand. Emitted as a diagnostic, not treated as fatal
/// (the bundle is still built with every instruction present).
fn check_bundle_overlap(bases: &[InstructionBase], location: &ast::SourceLocation, errors: &mut Vec<String>) {
    let mut seen: HashMap<i64, usize> = HashMap::new();
    for (i, base) in bases.iter().enumerate() {
        let InstructionBase::Instruction { operands, .. } = base else { continue };
        for operand in operands {
            if let Value::QubitRef { indices } = operand {
                for &idx in indices {
                    if let Some(_other) = seen.insert(idx, i) {
                        errors.push(format!(
                            "{location}: qubit {idx} is referenced by more than one instruction in the same bundle"
                        ));
                    }
                }
            }
        }
    }
}

fn type_from_name(name: &str) -> Option<Type> {
    Some(match name {
        "qubit" => Type::qubit(true),
        "bit" => Type::bit(true),
        "int" => Type::new(crate::types::TypeKind::Int, true),
        "bool" => Type::new(crate::types::TypeKind::Bool, true),
        "real" => Type::new(crate::types::TypeKind::Real, true),
        "complex" => Type::new(crate::types::TypeKind::Complex, true),
        "axis" => Type::new(crate::types::TypeKind::Axis, true),
        "string" => Type::new(crate::types::TypeKind::String, true),
        "json" => Type::new(crate::types::TypeKind::Json, true),
        _ => return None,
    })
}

/// Post-pass: every `goto` collected an unresolved subcircuit name during
/// the main walk; look each one up against the final subcircuit list now
/// that it's complete, recursing into every nested block.
fn resolve_gotos(subcircuits: &mut Arena<Subcircuit>, errors: &mut Vec<String>) {
    let name_to_id: HashMap<String, NodeId<Subcircuit>> =
        subcircuits.ids().map(|id| (subcircuits.get(id).name.clone(), id)).collect();
    for id in subcircuits.ids().collect::<Vec<_>>() {
        let body = &mut subcircuits.get_mut(id).body;
        resolve_gotos_in_block(body, &name_to_id, errors);
    }
}

fn resolve_gotos_in_block(block: &mut Block, name_to_id: &HashMap<String, NodeId<Subcircuit>>, errors: &mut Vec<String>) {
    for stmt in &mut block.statements {
        match stmt {
            Statement::BundleExt(bases, location) => {
                for base in bases.iter_mut() {
                    if let InstructionBase::GotoInstruction { target, .. } = base {
                        if let Some(deferred) = target.deferred_name().map(str::to_string) {
                            match name_to_id.get(&deferred) {
                                Some(id) => target.resolve(*id),
                                None => errors.push(format!(
                                    "{location}: goto target '{deferred}' does not name a known subcircuit"
                                )),
                            }
                        }
                    }
                }
            }
            Statement::IfElse { branches, else_branch, .. } => {
                for (_, body) in branches.iter_mut() {
                    resolve_gotos_in_block(body, name_to_id, errors);
                }
                if let Some(body) = else_branch {
                    resolve_gotos_in_block(body, name_to_id, errors);
                }
            }
            Statement::ForLoop { body, .. }
            | Statement::ForeachLoop { body, .. }
            | Statement::WhileLoop { body, .. }
            | Statement::RepeatUntilLoop { body, .. } => resolve_gotos_in_block(body, name_to_id, errors),
            Statement::Break(_) | Statement::Continue(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceLocation;

    fn loc() -> SourceLocation {
        SourceLocation::new("t.cq", 1, 0)
    }

    fn simple_program() -> ast::Program {
        ast::Program {
            version: "1.2".to_string(),
            num_qubits: Some(ast::Expression::IntLiteral(3, loc())),
            statements: vec![
                ast::Statement::Subcircuit { name: "main".to_string(), iterations: None, location: loc() },
                ast::Statement::Bundle(
                    vec![ast::Instruction {
                        name: "x".to_string(),
                        condition: None,
                        operands: vec![ast::Expression::Index {
                            target: Box::new(ast::Expression::Identifier("q".to_string(), loc())),
                            indices: vec![ast::IndexEntry::Single(ast::Expression::IntLiteral(0, loc()))],
                            location: loc(),
                        }],
                        annotations: vec![],
                        location: loc(),
                    }],
                    loc(),
                ),
            ],
            location: loc(),
        }
    }

    #[test]
    fn analyzes_minimal_program_without_errors() {
        let mut analyzer = Analyzer::with_defaults(Dialect::V3, Version::new(vec![1, 2]).unwrap());
        let result = analyzer.analyze(&simple_program());
        assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
        let program = result.program.unwrap();
        assert_eq!(program.num_qubits, 3);
        assert_eq!(program.subcircuits.len(), 1);
    }

    #[test]
    fn version_above_api_version_is_an_error() {
        let mut analyzer = Analyzer::with_defaults(Dialect::V3, Version::new(vec![1, 0]).unwrap());
        let mut program = simple_program();
        program.version = "9.0".to_string();
        let result = analyzer.analyze(&program);
        assert!(!result.errors.is_empty());
    }

    #[test]
    fn goto_to_unknown_subcircuit_is_diagnosed() {
        let mut analyzer = Analyzer::with_defaults(Dialect::V3, Version::new(vec![1, 2]).unwrap());
        let mut program = simple_program();
        program.statements.push(ast::Statement::Bundle(
            vec![ast::Instruction {
                name: "goto".to_string(),
                condition: None,
                operands: vec![ast::Expression::Identifier("nowhere".to_string(), loc())],
                annotations: vec![],
                location: loc(),
            }],
            loc(),
        ));
        let result = analyzer.analyze(&program);
        assert!(result.errors.iter().any(|e| e.contains("nowhere")));
    }

    #[test]
    fn break_outside_loop_is_diagnosed() {
        let mut analyzer = Analyzer::with_defaults(Dialect::V3, Version::new(vec![1, 2]).unwrap());
        let mut program = simple_program();
        program.statements.push(ast::Statement::Break(loc()));
        let result = analyzer.analyze(&program);
        assert!(result.errors.iter().any(|e| e.contains("break")));
    }

    #[test]
    fn bare_unindexed_register_operand_expands_to_the_whole_register() {
        let mut analyzer = Analyzer::with_defaults(Dialect::V3, Version::new(vec![1, 2]).unwrap());
        let mut program = simple_program();
        program.statements.push(ast::Statement::Bundle(
            vec![ast::Instruction {
                name: "x".to_string(),
                condition: None,
                operands: vec![ast::Expression::Identifier("q".to_string(), loc())],
                annotations: vec![],
                location: loc(),
            }],
            loc(),
        ));
        let result = analyzer.analyze(&program);
        assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
        let program = result.program.unwrap();
        let main = program.subcircuits.iter().find(|sc| sc.name == "main").unwrap();
        let Statement::BundleExt(bases, _) = &main.body.statements[1] else {
            panic!("expected the second statement to be a bundle");
        };
        let InstructionBase::Instruction { operands, .. } = &bases[0] else {
            panic!("expected an Instruction");
        };
        match &operands[0] {
            Value::QubitRef { indices } => assert_eq!(indices, &vec![0, 1, 2]),
            other => panic!("expected a QubitRef, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_subcircuit_name_is_diagnosed() {
        let mut analyzer = Analyzer::with_defaults(Dialect::V3, Version::new(vec![1, 2]).unwrap());
        let mut program = simple_program();
        program.statements.push(ast::Statement::Subcircuit { name: "main".to_string(), iterations: None, location: loc() });
        let result = analyzer.analyze(&program);
        assert!(result.errors.iter().any(|e| e.contains("duplicate subcircuit")));
    }
}
