//! NormalizeFormatStep (Source)
//!
//! Convierte entradas Analyze (`.img`) a NIfTI comprimido con
//! `fslchfiletype`. El archivo convertido debe existir antes de continuar.
//! Cualquier otra entrada pasa sin cambios.

use log::{debug, info};
use serde_json::{json, Value};
use std::sync::Arc;

use mri_core::{Artifact, CoreEngineError, ExecutionContext, StepDefinition, StepKind, StepRunResult, StepSignal};
use mri_toolkit::CommandLine;

use super::{encode, ids, volume_path, StepEnv};
use crate::artifacts::{roles, VolumeArtifact};

const ANALYZE_SUFFIX: &str = ".img";
const NIFTI_GZ_SUFFIX: &str = ".nii.gz";

/// `scan.img` -> `Some("scan.nii.gz")`; otras extensiones -> `None`.
pub fn converted_name(input: &str) -> Option<String> {
    input.strip_suffix(ANALYZE_SUFFIX).map(|stem| format!("{stem}{NIFTI_GZ_SUFFIX}"))
}

#[derive(Debug, Clone)]
pub struct NormalizeFormatStep {
    env: Arc<StepEnv>,
}

impl NormalizeFormatStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<(Vec<Artifact>, Vec<StepSignal>), CoreEngineError> {
        let input = volume_path(ctx.artifacts, roles::INPUT_VOLUME)?;
        let Some(converted) = converted_name(&input) else {
            debug!("{input} needs no conversion");
            return Ok((vec![encode(VolumeArtifact::at(input), roles::NORMALIZED_VOLUME)?], vec![]));
        };

        info!("Converting {input} to {converted}");
        self.env.run_tool(self.id(), &CommandLine::convert_to_nifti_gz(&input, &converted))?;
        if !self.env.ctx.resolve(&converted).exists() {
            return Err(CoreEngineError::MissingArtifact(converted));
        }
        let signal = StepSignal::new("format_converted", json!({ "from": input, "to": converted }));
        Ok((vec![encode(VolumeArtifact::at(converted), roles::NORMALIZED_VOLUME)?], vec![signal]))
    }
}

impl StepDefinition for NormalizeFormatStep {
    fn id(&self) -> &str {
        ids::NORMALIZE_FORMAT
    }

    fn base_params(&self) -> Value {
        json!({ "target_format": "NIFTI_GZ" })
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        StepRunResult::from_result_with_signals(self.execute(ctx))
    }

    fn kind(&self) -> StepKind {
        StepKind::Source
    }
}
