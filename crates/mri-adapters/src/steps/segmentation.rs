//! Segmentaciones: tejidos (`fast`), subcortical (`run_first_all`) y
//! extracción de máscaras por etiqueta (`fslmaths`).

use log::debug;
use serde_json::{json, Value};
use std::sync::Arc;

use mri_core::{Artifact, CoreEngineError, ExecutionContext, StepDefinition, StepKind, StepRunResult};
use mri_toolkit::CommandLine;

use super::{encode, ids, volume_path, StepEnv};
use crate::artifacts::{roles, VolumeArtifact};
use crate::context::{Hemisphere, TissueClass};

#[derive(Debug, Clone)]
pub struct TissueSegmentationStep {
    env: Arc<StepEnv>,
}

impl TissueSegmentationStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Artifact>, CoreEngineError> {
        let brain = volume_path(ctx.artifacts, roles::BRAIN_VOLUME)?;
        let names = &self.env.ctx.names;
        self.env.run_tool(self.id(), &CommandLine::tissue_segmentation(&brain, &names.fast_prefix))?;
        TissueClass::ALL.iter()
                        .map(|&class| encode(VolumeArtifact::at(names.tissue_map(class)), roles::tissue_map(class)))
                        .collect()
    }
}

impl StepDefinition for TissueSegmentationStep {
    fn id(&self) -> &str {
        ids::TISSUE_SEGMENTATION
    }

    fn base_params(&self) -> Value {
        json!({ "image_type": 1, "classes": 3, "bias_smoothing": 0.1, "prefix": self.env.ctx.names.fast_prefix })
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        StepRunResult::from_result(self.execute(ctx))
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }
}

/// Segmentación subcortical sobre el volumen en espacio MNI.
#[derive(Debug, Clone)]
pub struct SubcorticalSegmentationStep {
    env: Arc<StepEnv>,
}

impl SubcorticalSegmentationStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Artifact>, CoreEngineError> {
        let mni = volume_path(ctx.artifacts, roles::MNI_VOLUME)?;
        let names = &self.env.ctx.names;
        self.env.run_tool(self.id(), &CommandLine::subcortical_segmentation(&mni, &names.first_prefix))?;
        Ok(vec![encode(VolumeArtifact::at(names.first_segmentation()), roles::FIRST_SEGMENTATION)?])
    }
}

impl StepDefinition for SubcorticalSegmentationStep {
    fn id(&self) -> &str {
        ids::SUBCORTICAL_SEGMENTATION
    }

    fn base_params(&self) -> Value {
        json!({ "prefix": self.env.ctx.names.first_prefix })
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        StepRunResult::from_result(self.execute(ctx))
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }
}

/// Una máscara por hipocampo: umbral inferior y superior iguales a la
/// etiqueta. Izquierdo primero.
#[derive(Debug, Clone)]
pub struct HippocampiExtractionStep {
    env: Arc<StepEnv>,
}

impl HippocampiExtractionStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Artifact>, CoreEngineError> {
        let seg = volume_path(ctx.artifacts, roles::FIRST_SEGMENTATION)?;
        let run_ctx = &self.env.ctx;
        let mut outputs = Vec::with_capacity(Hemisphere::BOTH.len());
        for side in Hemisphere::BOTH {
            let label = run_ctx.labels.label(side);
            let mask = run_ctx.names.hippocampus_mask(side);
            debug!("extracting {} (label {label})", side.structure());
            self.env.run_tool(self.id(), &CommandLine::label_mask(&seg, label, mask))?;
            outputs.push(encode(VolumeArtifact::at(mask), roles::hippocampus_mask(side))?);
        }
        Ok(outputs)
    }
}

impl StepDefinition for HippocampiExtractionStep {
    fn id(&self) -> &str {
        ids::HIPPOCAMPI_EXTRACTION
    }

    fn base_params(&self) -> Value {
        let labels = self.env.ctx.labels;
        json!({ "left_label": labels.left, "right_label": labels.right })
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        StepRunResult::from_result(self.execute(ctx))
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }
}
