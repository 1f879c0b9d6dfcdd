//! Tipos de evento del flujo y estructura `FlowEvent`.
//!
//! - Cada ejecución del `FlowEngine` emite eventos a un `EventStore`
//!   append-only.
//! - El `FlowRepository` reconstruye el estado (replay) a partir de ellos.
//! - `FlowEventKind` es el contrato observable del motor.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreEngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FlowEventKind {
    /// Primer evento de un `flow_id`: fija `definition_hash` y cantidad de steps.
    FlowInitialized { definition_hash: String, step_count: usize },
    /// Un step comenzó su ejecución. No implica éxito.
    StepStarted { step_index: usize, step_id: String },
    /// Un step terminó correctamente; `outputs` son los roles producidos.
    StepFinished {
        step_index: usize,
        step_id: String,
        outputs: Vec<String>,
        fingerprint: String,
    },
    /// Un step terminó con error terminal (stop-on-failure).
    StepFailed {
        step_index: usize,
        step_id: String,
        error: CoreEngineError,
        fingerprint: String,
    },
    /// Hito ligero (p.ej. resultado vacío tolerado).
    StepSignal {
        step_index: usize,
        step_id: String,
        signal: String,
        data: serde_json::Value,
    },
    /// Cierre con fingerprint agregado de los steps exitosos.
    FlowCompleted { flow_fingerprint: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEvent {
    pub seq: u64,
    pub flow_id: Uuid,
    pub kind: FlowEventKind,
    pub ts: DateTime<Utc>, // no entra en fingerprint
}
