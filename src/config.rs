//! Analyzer configuration
//!
//! `AnalyzerConfig` is the builder a host crate uses to extend the analyzer
//! with extra constants, functions, and instructions beyond the defaults
//! `crate::builtins` registers
//! (`with_constant`/`with_function`/`with_instruction`). The declarative
//! parts of a configuration (dialect, API version, extra instruction
//! signatures) can additionally round-trip through TOML via `serde`; function
//! bodies are Rust code and are always registered in-process, never
//! deserialized.

use crate::types::{from_spec, Type};
use crate::values::Value;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which cQASM dialect an `Analyzer` targets. The two differ in whether an
/// error model statement exists at all (v1.x only) and in how registers are
/// sized (v1.x: `qubits N`; v3.x: explicit `Variables` declarations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    V1,
    V3,
}

impl Dialect {
    pub fn has_error_model(self) -> bool {
        matches!(self, Dialect::V1)
    }
}

/// One extra function signature plus implementation registered by a host
/// crate. Not `Deserialize`: a function body cannot come from a config
/// file, only from Rust code linked into the host.
#[derive(Clone)]
pub struct ExtraFunction {
    pub name: String,
    pub param_types: Vec<Type>,
    pub implementation: crate::symbols::FunctionImpl,
}

/// One extra instruction signature registered by a host crate. Unlike a
/// function, an instruction carries no executable body here (resolution
/// only needs the canonical name and parameter shape), so this part *can*
/// round-trip through TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraInstruction {
    pub name: String,
    /// Type-spec string consumed by `types::from_spec`.
    pub param_spec: String,
}

/// One extra named constant.
#[derive(Clone)]
pub struct ExtraConstant {
    pub name: String,
    pub value: Value,
}

/// The declarative subset of an `AnalyzerConfig`, suitable for loading from
/// a project's TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub dialect: Dialect,
    #[serde(default = "default_api_version")]
    pub api_version_major: i64,
    #[serde(default)]
    pub api_version_minor: i64,
    #[serde(default)]
    pub extra_instructions: Vec<ExtraInstruction>,
}

fn default_api_version() -> i64 {
    1
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file {}: {e}", path.display()))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("invalid config: {e}"))
    }
}

/// The full analyzer configuration, including any host-registered function
/// implementations. Build one with [`AnalyzerConfig::new`], extend it with
/// `with_constant`/`with_function`/`with_instruction`, then pass it to
/// `Analyzer::with_config`.
#[derive(Clone)]
pub struct AnalyzerConfig {
    pub dialect: Dialect,
    pub api_version: crate::primitives::Version,
    pub extra_constants: Vec<ExtraConstant>,
    pub extra_functions: Vec<ExtraFunction>,
    pub extra_instructions: Vec<ExtraInstruction>,
}

impl AnalyzerConfig {
    pub fn new(dialect: Dialect, api_version: crate::primitives::Version) -> Self {
        AnalyzerConfig {
            dialect,
            api_version,
            extra_constants: Vec::new(),
            extra_functions: Vec::new(),
            extra_instructions: Vec::new(),
        }
    }

    pub fn with_constant(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra_constants.push(ExtraConstant { name: name.into(), value });
        self
    }

    pub fn with_function(
        mut self,
        name: impl Into<String>,
        param_spec: &str,
        implementation: crate::symbols::FunctionImpl,
    ) -> Self {
        self.extra_functions.push(ExtraFunction {
            name: name.into(),
            param_types: from_spec(param_spec),
            implementation,
        });
        self
    }

    pub fn with_instruction(mut self, name: impl Into<String>, param_spec: &str) -> Self {
        self.extra_instructions.push(ExtraInstruction { name: name.into(), param_spec: param_spec.to_string() });
        self
    }

    /// Merges the declarative parts of a loaded [`ConfigFile`] into this
    /// configuration; function implementations must still be added with
    /// [`Self::with_function`] afterwards.
    pub fn merge_file(mut self, file: ConfigFile) -> Self {
        self.dialect = file.dialect;
        self.api_version = crate::primitives::Version::new(vec![file.api_version_major, file.api_version_minor])
            .unwrap_or_else(|_| self.api_version);
        self.extra_instructions.extend(file.extra_instructions);
        self
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig::new(Dialect::V3, crate::primitives::Version::new(vec![1, 2]).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_gates_error_model() {
        assert!(Dialect::V1.has_error_model());
        assert!(!Dialect::V3.has_error_model());
    }

    #[test]
    fn config_file_round_trips_through_toml() {
        let text = r#"
            dialect = "v1"
            api_version_major = 1
            api_version_minor = 2

            [[extra_instructions]]
            name = "my_gate"
            param_spec = "q"
        "#;
        let cfg = ConfigFile::from_toml_str(text).unwrap();
        assert_eq!(cfg.dialect, Dialect::V1);
        assert_eq!(cfg.extra_instructions.len(), 1);
        assert_eq!(cfg.extra_instructions[0].name, "my_gate");
    }

    #[test]
    fn builder_accumulates_extras() {
        let cfg = AnalyzerConfig::default()
            .with_constant("tau", Value::ConstReal(6.283185307))
            .with_instruction("my_gate", "q");
        assert_eq!(cfg.extra_constants.len(), 1);
        assert_eq!(cfg.extra_instructions.len(), 1);
    }
}
