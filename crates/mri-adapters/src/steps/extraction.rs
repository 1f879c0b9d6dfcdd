use serde_json::{json, Value};
use std::sync::Arc;

use mri_core::{Artifact, CoreEngineError, ExecutionContext, StepDefinition, StepKind, StepRunResult};
use mri_toolkit::CommandLine;

use super::{encode, ids, volume_path, StepEnv};
use crate::artifacts::{roles, VolumeArtifact};

/// `bet` sobre el volumen normalizado.
#[derive(Debug, Clone)]
pub struct BrainExtractionStep {
    env: Arc<StepEnv>,
}

impl BrainExtractionStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Artifact>, CoreEngineError> {
        let input = volume_path(ctx.artifacts, roles::NORMALIZED_VOLUME)?;
        let output = &self.env.ctx.names.brain_extracted;
        self.env.run_tool(self.id(), &CommandLine::brain_extraction(&input, output))?;
        Ok(vec![encode(VolumeArtifact::at(output.as_str()), roles::BRAIN_VOLUME)?])
    }
}

impl StepDefinition for BrainExtractionStep {
    fn id(&self) -> &str {
        ids::BRAIN_EXTRACTION
    }

    fn base_params(&self) -> Value {
        json!({ "fractional_threshold": 0.5, "gradient": 0, "output": self.env.ctx.names.brain_extracted })
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        StepRunResult::from_result(self.execute(ctx))
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }
}
