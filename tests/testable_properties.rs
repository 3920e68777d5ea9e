//! End-to-end coverage of the analyzer's observable properties, driven
//! through the public crate API (`Analyzer::analyze_string`) rather than
//! hand-built AST fixtures, so a change anywhere in the lexer/parser/
//! analyzer pipeline that breaks one of these shows up here.

use cqasm::config::Dialect;
use cqasm::primitives::Version;
use cqasm::semantic::{InstructionBase, Statement};
use cqasm::values::Value;
use cqasm::Analyzer;

fn v(major: i64, minor: i64) -> Version {
    Version::new(vec![major, minor]).unwrap()
}

fn analyzer(dialect: Dialect) -> Analyzer {
    Analyzer::with_defaults(dialect, v(1, 2))
}

#[test]
fn parses_and_analyzes_a_minimal_program() {
    let mut a = analyzer(Dialect::V3);
    let result = a.analyze_string("version 1.2;\nqubits 3;\n.main\nx q[0];\n", "s1.cq");
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let program = result.program.unwrap();
    assert_eq!(program.version, v(1, 2));
    assert_eq!(program.num_qubits, 3);
    assert_eq!(program.subcircuits.len(), 1);
}

#[test]
fn overload_resolution_prefers_the_most_recently_registered_match() {
    fn times_two(args: &[Value]) -> Result<Value, String> {
        match &args[0] {
            Value::ConstInt(n) => Ok(Value::ConstInt(n * 2)),
            _ => Err("double: expected int".to_string()),
        }
    }
    fn times_three(args: &[Value]) -> Result<Value, String> {
        match &args[0] {
            Value::ConstInt(n) => Ok(Value::ConstInt(n * 3)),
            _ => Err("double: expected int".to_string()),
        }
    }
    let config = cqasm::config::AnalyzerConfig::new(Dialect::V3, v(1, 2))
        .with_function("double", "i", times_two)
        .with_function("double", "i", times_three);
    let mut a = Analyzer::new(Dialect::V3, v(1, 2)).with_config(config);
    let result = a.analyze_string("version 1.2;\nmap r = double(5);\n", "s2.cq");
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let program = result.program.unwrap();
    assert_eq!(program.mappings[0].value, Value::ConstInt(15), "later registration should win");
}

#[test]
fn goto_links_to_a_later_subcircuit_successfully() {
    let mut a = analyzer(Dialect::V3);
    let source = "version 1.2;\nqubits 1;\n.first\ngoto second;\n.second\nx q[0];\n";
    let result = a.analyze_string(source, "s3.cq");
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let program = result.program.unwrap();
    let first = program.subcircuits.iter().find(|sc| sc.name == "first").unwrap();
    let Statement::BundleExt(bases, _) = &first.body.statements[0] else {
        panic!("expected a bundle as the first statement of 'first'");
    };
    assert!(matches!(bases[0], InstructionBase::GotoInstruction { .. }));
}

#[test]
fn goto_to_an_unknown_subcircuit_is_a_diagnosed_error() {
    let mut a = analyzer(Dialect::V3);
    let source = "version 1.2;\nqubits 1;\n.main\ngoto nowhere;\n";
    let result = a.analyze_string(source, "s4.cq");
    assert!(!result.is_ok());
    assert!(result.errors.iter().any(|e| e.contains("nowhere")));
}

#[test]
fn bundle_with_overlapping_qubit_operands_is_diagnosed() {
    let mut a = analyzer(Dialect::V3);
    let source = "version 1.2;\nqubits 2;\n.main\nx q[0] | y q[0];\n";
    let result = a.analyze_string(source, "s5.cq");
    assert!(result.errors.iter().any(|e| e.contains("referenced by more than one instruction")));
    // Non-fatal: the bundle is still built with both instructions present.
    let program = result.program.unwrap();
    let main = program.subcircuits.iter().find(|sc| sc.name == "main").unwrap();
    let Statement::BundleExt(bases, _) = &main.body.statements[0] else {
        panic!("expected a bundle");
    };
    assert_eq!(bases.len(), 2);
}

#[test]
fn break_outside_a_loop_is_diagnosed_and_the_node_is_dropped() {
    let mut a = analyzer(Dialect::V3);
    let source = "version 1.2;\nqubits 1;\n.main\nbreak;\n";
    let result = a.analyze_string(source, "s6.cq");
    assert!(result.errors.iter().any(|e| e.contains("break outside a loop")));
    let program = result.program.unwrap();
    let main = program.subcircuits.iter().find(|sc| sc.name == "main").unwrap();
    assert!(main.body.statements.is_empty(), "illegal break must not survive into the tree");
}

#[test]
fn goto_before_version_1_2_is_rejected_as_a_dialect_error() {
    let mut a = analyzer(Dialect::V3);
    let source = "version 1.0;\nqubits 1;\n.first\ngoto second;\n.second\nx q[0];\n";
    let result = a.analyze_string(source, "s6b.cq");
    assert!(result.errors.iter().any(|e| e.contains("goto") && e.contains("1.2")));
    let program = result.program.unwrap();
    let first = program.subcircuits.iter().find(|sc| sc.name == "first").unwrap();
    assert!(first.body.statements.is_empty(), "illegal goto must not survive into the tree");
}

#[test]
fn set_before_version_1_2_is_rejected_as_a_dialect_error() {
    let mut a = analyzer(Dialect::V3);
    let source = "version 1.0;\nqubits 1;\nint i;\n.main\nset i, 1;\n";
    let result = a.analyze_string(source, "s6c.cq");
    assert!(result.errors.iter().any(|e| e.contains("set") && e.contains("1.2")));
}

#[test]
fn structured_control_flow_before_version_1_2_is_rejected_as_a_dialect_error() {
    let mut a = analyzer(Dialect::V3);
    let source = "version 1.0;\nqubits 1;\n.main\nif (1 == 1) {\nx q[0];\n}\n";
    let result = a.analyze_string(source, "s6d.cq");
    assert!(result.errors.iter().any(|e| e.contains("structured control flow") && e.contains("1.2")));
    let program = result.program.unwrap();
    let main = program.subcircuits.iter().find(|sc| sc.name == "main").unwrap();
    assert!(main.body.statements.is_empty(), "illegal if/else must not survive into the tree");
}

#[test]
fn structured_control_flow_at_version_1_2_is_accepted() {
    let mut a = analyzer(Dialect::V3);
    let source = "version 1.2;\nqubits 1;\n.main\nif (1 == 1) {\nx q[0];\n}\n";
    let result = a.analyze_string(source, "s6e.cq");
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let program = result.program.unwrap();
    let main = program.subcircuits.iter().find(|sc| sc.name == "main").unwrap();
    assert!(matches!(main.body.statements[0], Statement::IfElse { .. }));
}

#[test]
fn arithmetic_promotes_int_to_complex_and_folds_to_a_constant() {
    let mut a = analyzer(Dialect::V3);
    let result = a.analyze_string("version 1.2;\nmap c = complex(1, 0) + 2;\n", "s7.cq");
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let program = result.program.unwrap();
    match program.mappings[0].value {
        Value::ConstComplex(c) => {
            assert!((c.re - 3.0).abs() < 1e-9);
            assert!(c.im.abs() < 1e-9);
        }
        ref other => panic!("expected ConstComplex, got {other:?}"),
    }
}

#[test]
fn foreach_loop_body_is_inside_loop_scope_and_carries_its_bounds() {
    let mut a = analyzer(Dialect::V3);
    let source = "version 1.2;\nqubits 1;\nint i;\n.main\nforeach (i = 1 to 3) {\nbreak;\n}\n";
    let result = a.analyze_string(source, "s8.cq");
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let program = result.program.unwrap();
    let main = program.subcircuits.iter().find(|sc| sc.name == "main").unwrap();
    match &main.body.statements[0] {
        Statement::ForeachLoop { variable, from, to, body, .. } => {
            assert_eq!(variable, "i");
            assert_eq!(*from, 1);
            assert_eq!(*to, 3);
            assert!(matches!(body.statements[0], Statement::Break(_)));
        }
        other => panic!("expected ForeachLoop, got {other:?}"),
    }
}

#[test]
fn undeclared_foreach_variable_is_diagnosed() {
    let mut a = analyzer(Dialect::V3);
    let source = "version 1.2;\nqubits 1;\n.main\nforeach (i = 1 to 3) {\nx q[0];\n}\n";
    let result = a.analyze_string(source, "s8b.cq");
    assert!(result.errors.iter().any(|e| e.contains("is not declared")));
}

#[test]
fn api_version_older_than_declared_program_version_is_rejected() {
    let mut a = Analyzer::with_defaults(Dialect::V3, v(1, 0));
    let result = a.analyze_string("version 9.0;\nqubits 1;\n.main\nx q[0];\n", "s9.cq");
    assert!(!result.is_ok());
    assert!(result.errors.iter().any(|e| e.contains("9")));
}

#[test]
fn unwrap_program_collapses_errors_into_a_single_message() {
    let mut a = analyzer(Dialect::V3);
    let result = a.analyze_string("version 1.2;\nqubits 1;\n.main\ngoto nowhere;\n", "s10.cq");
    let err = result.unwrap_program().unwrap_err();
    assert!(err.contains("error"));
}

#[test]
fn dump_json_round_trips_through_analysis_report() {
    let mut a = analyzer(Dialect::V3);
    let result = a.analyze_string("version 1.2;\nqubits 1;\n.main\nx q[0];\n", "s11.cq");
    let report = cqasm::serialize::AnalysisReport { errors: &result.errors, program: result.program.as_ref() };
    let json = report.to_json().unwrap();
    assert!(json.contains("\"errors\""));
    assert!(json.contains("\"program\""));
}
