//! Errores del core.
//!
//! `CoreEngineError` viaja dentro de los eventos `StepFailed`, por eso es
//! `Clone + Serialize`. Cada variante conoce el código de salida de proceso
//! que le corresponde (ver `exit_code`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::TIMEOUT_EXIT_CODE;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreEngineError {
    #[error("flow already completed")] FlowCompleted,
    #[error("flow has failed previously (stop-on-failure invariant)")] FlowHasFailed,
    #[error("first step must be source kind")] FirstStepMustBeSource,
    #[error("missing artifact: {0}")] MissingArtifact(String),
    #[error("stage '{stage}' exited with code {exit_code}")]
    StageExecution { stage: String, exit_code: i32, stderr: String },
    #[error("stage '{stage}' timed out after {seconds}s")]
    StageTimeout { stage: String, seconds: u64 },
    #[error("unexpected output from '{stage}': expected {expected} fields, found {found}")]
    OutputParse { stage: String, expected: usize, found: usize, raw: String },
    #[error("io error: {0}")] Io(String),
    #[error("internal: {0}")] Internal(String),
}

impl CoreEngineError {
    /// Código de salida del proceso asociado al error.
    ///
    /// Un fallo de etapa propaga el código de la herramienta externa; códigos
    /// fuera de `1..=255` (p.ej. proceso terminado por señal) se reducen a 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreEngineError::StageExecution { exit_code, .. } if (1..=255).contains(exit_code) => *exit_code,
            CoreEngineError::StageTimeout { .. } => TIMEOUT_EXIT_CODE,
            _ => 1,
        }
    }

    /// Identificador de la etapa que originó el error, si aplica.
    pub fn stage(&self) -> Option<&str> {
        match self {
            CoreEngineError::StageExecution { stage, .. }
            | CoreEngineError::StageTimeout { stage, .. }
            | CoreEngineError::OutputParse { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_execution_propagates_tool_exit_code() {
        let e = CoreEngineError::StageExecution { stage: "bet".into(), exit_code: 3, stderr: "boom".into() };
        assert_eq!(e.exit_code(), 3);
        assert_eq!(e.stage(), Some("bet"));
    }

    #[test]
    fn out_of_range_exit_codes_collapse_to_one() {
        let e = CoreEngineError::StageExecution { stage: "fast".into(), exit_code: -1, stderr: String::new() };
        assert_eq!(e.exit_code(), 1);
        let e = CoreEngineError::StageExecution { stage: "fast".into(), exit_code: 300, stderr: String::new() };
        assert_eq!(e.exit_code(), 1);
    }

    #[test]
    fn parse_and_timeout_codes() {
        let parse = CoreEngineError::OutputParse { stage: "whole_brain_stats".into(), expected: 7, found: 6, raw: "1 2 3 4 5 6".into() };
        assert_eq!(parse.exit_code(), 1);
        let timeout = CoreEngineError::StageTimeout { stage: "flirt".into(), seconds: 10 };
        assert_eq!(timeout.exit_code(), 124);
        assert_eq!(CoreEngineError::MissingArtifact("x".into()).exit_code(), 1);
    }
}
