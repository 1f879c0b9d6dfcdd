//! Steps concretos del pipeline MRI.
//!
//! Cada step envuelve una o más invocaciones externas a través del
//! `StageRunner` compartido y publica sus resultados como artifacts tipados.
//! Los errores de toolkit y de parseo se traducen a `CoreEngineError` aquí,
//! en un único lugar.

pub mod extraction;
pub mod normalize;
pub mod registration;
pub mod report;
pub mod segmentation;
pub mod statistics;

use std::sync::Arc;

use mri_core::{Artifact, ArtifactSpec, ArtifactTable, CoreEngineError, StepDefinition};
use mri_domain::DomainError;
use mri_toolkit::{CommandInvoker, CommandLine, StageRunner, ToolkitError};

use crate::artifacts::VolumeArtifact;
use crate::context::RunContext;

pub use extraction::BrainExtractionStep;
pub use normalize::NormalizeFormatStep;
pub use registration::RegistrationStep;
pub use report::ReportStep;
pub use segmentation::{HippocampiExtractionStep, SubcorticalSegmentationStep, TissueSegmentationStep};
pub use statistics::{HippocampiStatsStep, TissueStatsStep, WholeBrainStatsStep};

pub mod ids {
    pub const NORMALIZE_FORMAT: &str = "normalize_format";
    pub const BRAIN_EXTRACTION: &str = "brain_extraction";
    pub const WHOLE_BRAIN_STATS: &str = "whole_brain_stats";
    pub const TISSUE_SEGMENTATION: &str = "tissue_segmentation";
    pub const TISSUE_STATS: &str = "tissue_stats";
    pub const REGISTRATION: &str = "registration";
    pub const SUBCORTICAL_SEGMENTATION: &str = "subcortical_segmentation";
    pub const HIPPOCAMPI_EXTRACTION: &str = "hippocampi_extraction";
    pub const HIPPOCAMPI_STATS: &str = "hippocampi_stats";
    pub const REPORT: &str = "report";

    /// Orden de ejecución.
    pub const ALL: [&str; 10] = [NORMALIZE_FORMAT,
                                 BRAIN_EXTRACTION,
                                 WHOLE_BRAIN_STATS,
                                 TISSUE_SEGMENTATION,
                                 TISSUE_STATS,
                                 REGISTRATION,
                                 SUBCORTICAL_SEGMENTATION,
                                 HIPPOCAMPI_EXTRACTION,
                                 HIPPOCAMPI_STATS,
                                 REPORT];
}

/// Dependencias compartidas por todos los steps de una corrida.
#[derive(Debug)]
pub struct StepEnv {
    pub ctx: RunContext,
    pub runner: StageRunner,
}

impl StepEnv {
    pub fn new(ctx: RunContext, invoker: Arc<dyn CommandInvoker>) -> Arc<Self> {
        Arc::new(Self { ctx, runner: StageRunner::new(invoker) })
    }

    pub(crate) fn run_tool(&self, stage: &str, command: &CommandLine) -> Result<String, CoreEngineError> {
        self.runner.run(stage, command).map_err(|e| tool_error(stage, e))
    }
}

/// Steps posteriores al source, en orden, listos para
/// `EngineBuilder::add_boxed`.
pub fn downstream_steps(env: &Arc<StepEnv>) -> Vec<Box<dyn StepDefinition>> {
    vec![Box::new(BrainExtractionStep::new(env.clone())),
         Box::new(WholeBrainStatsStep::new(env.clone())),
         Box::new(TissueSegmentationStep::new(env.clone())),
         Box::new(TissueStatsStep::new(env.clone())),
         Box::new(RegistrationStep::new(env.clone())),
         Box::new(SubcorticalSegmentationStep::new(env.clone())),
         Box::new(HippocampiExtractionStep::new(env.clone())),
         Box::new(HippocampiStatsStep::new(env.clone())),
         Box::new(ReportStep::new(env.clone()))]
}

/// Un fallo de spawn distinto de "no encontrado" se reporta como lo haría un
/// shell (126).
pub(crate) fn tool_error(stage: &str, e: ToolkitError) -> CoreEngineError {
    match e {
        ToolkitError::NonZeroExit { exit_code, stderr, .. } => {
            CoreEngineError::StageExecution { stage: stage.to_string(), exit_code, stderr }
        }
        ToolkitError::Timeout { seconds, .. } => CoreEngineError::StageTimeout { stage: stage.to_string(), seconds },
        ToolkitError::Spawn { source, .. } => {
            CoreEngineError::StageExecution { stage: stage.to_string(), exit_code: 126, stderr: source.to_string() }
        }
        e @ ToolkitError::Io { .. } => CoreEngineError::Io(e.to_string()),
    }
}

pub(crate) fn parse_error(stage: &str, expected: usize, raw: &str, e: DomainError) -> CoreEngineError {
    match e {
        DomainError::FieldCount { expected, found, raw } => {
            CoreEngineError::OutputParse { stage: stage.to_string(), expected, found, raw }
        }
        DomainError::NotNumeric(_) => CoreEngineError::OutputParse { stage: stage.to_string(),
                                                                     expected,
                                                                     found: raw.split_whitespace().count(),
                                                                     raw: raw.to_string() },
        e @ DomainError::Io { .. } => CoreEngineError::Io(e.to_string()),
    }
}

pub(crate) fn encode<T: ArtifactSpec>(spec: T, role: &str) -> Result<Artifact, CoreEngineError> {
    spec.into_artifact(role).map_err(|e| CoreEngineError::Internal(format!("encoding '{role}': {e}")))
}

pub(crate) fn volume_path(artifacts: &ArtifactTable, role: &str) -> Result<String, CoreEngineError> {
    Ok(artifacts.decode::<VolumeArtifact>(role)?.path)
}
