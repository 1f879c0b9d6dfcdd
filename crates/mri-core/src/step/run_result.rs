use serde_json::Value;

use crate::{errors::CoreEngineError, model::Artifact};

/// Resultado abstracto de ejecutar un step.
pub enum StepRunResult {
    Success { outputs: Vec<Artifact> },
    SuccessWithSignals { outputs: Vec<Artifact>, signals: Vec<StepSignal> },
    Failure { error: CoreEngineError },
}

/// Hito ligero emitido por un step; no altera el estado del flujo.
#[derive(Debug, Clone)]
pub struct StepSignal {
    pub signal: String,
    pub data: Value,
}

impl StepSignal {
    pub fn new(signal: impl Into<String>, data: Value) -> Self {
        Self { signal: signal.into(), data }
    }
}

impl StepRunResult {
    /// Adapta un `Result` de la lógica del step.
    pub fn from_result(res: Result<Vec<Artifact>, CoreEngineError>) -> Self {
        match res {
            Ok(outputs) => StepRunResult::Success { outputs },
            Err(error) => StepRunResult::Failure { error },
        }
    }

    /// Igual que `from_result`, anexando señales cuando existen.
    pub fn from_result_with_signals(res: Result<(Vec<Artifact>, Vec<StepSignal>), CoreEngineError>) -> Self {
        match res {
            Ok((outputs, signals)) if signals.is_empty() => StepRunResult::Success { outputs },
            Ok((outputs, signals)) => StepRunResult::SuccessWithSignals { outputs, signals },
            Err(error) => StepRunResult::Failure { error },
        }
    }
}
