//! cQASM semantic analyzer CLI
//!
//! Thin driver around `cqasm::Analyzer`: parse and analyze a file, report
//! diagnostics, and optionally dump the resulting tree.

use clap::{CommandFactory, Parser as ClapParser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use cqasm::{Analyzer, AnalyzerConfig, Dialect};
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser)]
#[command(name = "cqasmc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Semantic analyzer for cQASM programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
enum DialectArg {
    V1,
    V3,
}

impl From<DialectArg> for Dialect {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::V1 => Dialect::V1,
            DialectArg::V3 => Dialect::V3,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a cQASM source file and report diagnostics
    Check {
        /// Input cQASM source file
        input: PathBuf,

        /// Analyzer API version to check the program's declared version against
        #[arg(long, default_value = "1.2")]
        api_version: String,

        /// Dialect to analyze under
        #[arg(long, value_enum, default_value = "v3")]
        dialect: DialectArg,

        /// Print the analyzed semantic tree as JSON (includes diagnostics)
        #[arg(long)]
        dump_json: bool,

        /// Print the analyzed semantic tree in the readable `dump_tree` format
        #[arg(long)]
        dump_tree: bool,

        /// Load extra instruction/dialect configuration from a TOML file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { input, api_version, dialect, dump_json, dump_tree, config } => {
            run_check(&input, &api_version, dialect.into(), dump_json, dump_tree, config.as_deref());
        }
        Commands::Completions { shell } => run_completions(shell),
    }
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "cqasmc", &mut io::stdout());
}

fn run_check(
    input: &std::path::Path,
    api_version: &str,
    dialect: Dialect,
    dump_json: bool,
    dump_tree: bool,
    config_path: Option<&std::path::Path>,
) {
    let api_version = match cqasm::analyzer::parse_version(api_version) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: invalid --api-version '{}': {}", api_version, e);
            process::exit(2);
        }
    };

    let mut analyzer = Analyzer::with_defaults(dialect, api_version.clone());
    if let Some(path) = config_path {
        let file = match cqasm::ConfigFile::load(path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path.display(), e);
                process::exit(2);
            }
        };
        let cfg = AnalyzerConfig::new(dialect, api_version).merge_file(file);
        analyzer = analyzer.with_config(cfg);
    }

    let result = match analyzer.analyze_file(input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    if dump_json {
        let report = cqasm::serialize::AnalysisReport { errors: &result.errors, program: result.program.as_ref() };
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing report: {}", e),
        }
    } else if dump_tree {
        if let Some(program) = &result.program {
            println!("{}", program.dump_tree());
        }
    }

    for error in &result.errors {
        eprintln!("{}", error);
    }

    if !result.is_ok() {
        process::exit(1);
    }
    println!("{}: OK", input.display());
}
