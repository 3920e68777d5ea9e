//! On-disk representations of an analyzed program
//!
//! cQASM tooling downstream of this analyzer (simulators, visualizers)
//! wants the semantic tree without re-running analysis itself. CBOR is the
//! canonical binary form (compact, self-describing, and every type in
//! `crate::semantic`/`crate::values`/`crate::tree` already derives
//! `Serialize`/`Deserialize` for it); JSON is the debugging/interchange
//! form used by the `--dump-json` CLI flag.

use crate::semantic::Program;
use serde::Serialize;

pub fn to_cbor(program: &Program) -> Result<Vec<u8>, String> {
    serde_cbor::to_vec(program).map_err(|e| format!("CBOR encode failed: {e}"))
}

pub fn from_cbor(bytes: &[u8]) -> Result<Program, String> {
    serde_cbor::from_slice(bytes).map_err(|e| format!("CBOR decode failed: {e}"))
}

pub fn to_json(program: &Program) -> Result<String, String> {
    serde_json::to_string_pretty(program).map_err(|e| format!("JSON encode failed: {e}"))
}

/// The shape written by `cqasmc check --dump-json`: the analyzed program
/// (if analysis produced one) alongside the accumulated diagnostic strings,
/// mirroring `crate::analyzer::AnalysisResult` without exposing its fields
/// directly as the wire format.
#[derive(Serialize)]
pub struct AnalysisReport<'a> {
    pub errors: &'a [String],
    pub program: Option<&'a Program>,
}

impl<'a> AnalysisReport<'a> {
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("JSON encode failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Version;
    use crate::tree::Arena;

    fn sample_program() -> Program {
        Program {
            version: Version::new(vec![1, 2]).unwrap(),
            num_qubits: 2,
            error_model: None,
            subcircuits: Arena::new(),
            mappings: vec![],
            variables: vec![],
            api_version: Version::new(vec![1, 2]).unwrap(),
        }
    }

    #[test]
    fn cbor_round_trips_a_program() {
        let program = sample_program();
        let bytes = to_cbor(&program).unwrap();
        let back = from_cbor(&bytes).unwrap();
        assert_eq!(back.num_qubits, 2);
    }

    #[test]
    fn json_report_includes_errors_and_program() {
        let program = sample_program();
        let errors = vec!["something went wrong".to_string()];
        let report = AnalysisReport { errors: &errors, program: Some(&program) };
        let json = report.to_json().unwrap();
        assert!(json.contains("something went wrong"));
        assert!(json.contains("num_qubits"));
    }

    #[test]
    fn from_cbor_rejects_garbage() {
        assert!(from_cbor(&[0xff, 0x00, 0x01]).is_err());
    }
}
