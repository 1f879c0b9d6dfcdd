use serde_json::Value;

use super::run_result::StepRunResult;
use crate::model::ExecutionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind { Source, Transform, Sink }

/// Trait que define un Step.
pub trait StepDefinition {
    /// Identificador estable y único dentro del Flow.
    fn id(&self) -> &str;

    /// Nombre opcional amigable (para logs).
    fn name(&self) -> &str { self.id() }

    /// Parámetros deterministas del step; entran en el fingerprint.
    fn base_params(&self) -> Value;

    /// Ejecuta el step. Sólo debe leer artifacts a través de `ctx`.
    fn run(&self, ctx: &ExecutionContext) -> StepRunResult;

    fn kind(&self) -> StepKind;
}
