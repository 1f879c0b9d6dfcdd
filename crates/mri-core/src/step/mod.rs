//! Definiciones relacionadas a Steps.
//!
//! Un Step es una unidad del flujo lineal: lee artifacts de pasos previos
//! desde la `ArtifactTable`, ejecuta su trabajo (normalmente una o varias
//! invocaciones externas) y produce 0..n artifacts nuevos. Este módulo define:
//! - `StepDefinition`: interfaz neutral usada por el engine.
//! - `StepRunResult` y señales (`StepSignal`).
//! - `StepStatus`: estado de un step dentro de la instancia reconstruida.

pub mod definition;
mod run_result;
mod status;

pub use definition::{StepDefinition, StepKind};
pub use run_result::{StepRunResult, StepSignal};
pub use status::StepStatus;
