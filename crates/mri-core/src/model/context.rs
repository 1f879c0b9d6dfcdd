use serde_json::Value;

use super::ArtifactTable;

/// Contexto de ejecución entregado a `StepDefinition::run`.
pub struct ExecutionContext<'a> {
    pub artifacts: &'a ArtifactTable, // outputs de todos los steps previos
    pub params: Value,                // parámetros canónicos del step
}
