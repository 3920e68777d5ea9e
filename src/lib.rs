//! Semantic analyzer for cQASM
//!
//! Turns cQASM source text (v1.x or v3.x dialect) into a fully resolved
//! [`semantic::Program`]: every name looked up, every overload resolved,
//! every constant expression folded, every `goto` linked to its target
//! subcircuit. The pipeline is `lexer` -> `parser` -> `analyzer`, with
//! `analyzer` driving `symbols`/`evaluator`/`overload` to do the actual
//! semantic work and `builtins` supplying the default functions,
//! instructions, and constants every program starts with.
//!
//! ```rust,ignore
//! use cqasm::{Analyzer, Dialect};
//! use cqasm::primitives::Version;
//!
//! let mut analyzer = Analyzer::with_defaults(Dialect::V1, Version::new(vec![1, 2]).unwrap());
//! let result = analyzer.analyze_string("version 1.0;\nqubits 2;\n.main\nx q[0];\n", "demo.cq");
//! assert!(result.is_ok());
//! ```

pub mod analyzer;
pub mod ast;
pub mod builtins;
pub mod config;
pub mod diagnostics;
pub mod evaluator;
pub mod lexer;
pub mod overload;
pub mod parser;
pub mod primitives;
pub mod semantic;
pub mod serialize;
pub mod symbols;
pub mod tree;
pub mod types;
pub mod values;

pub use analyzer::{AnalysisResult, Analyzer};
pub use config::{AnalyzerConfig, ConfigFile, Dialect, ExtraConstant, ExtraFunction, ExtraInstruction};
pub use diagnostics::{Diagnostic, ErrorKind, Severity};
pub use primitives::Version;
pub use semantic::Program;
