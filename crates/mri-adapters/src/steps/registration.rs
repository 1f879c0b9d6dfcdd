use serde_json::{json, Value};
use std::sync::Arc;

use mri_core::{Artifact, CoreEngineError, ExecutionContext, StepDefinition, StepKind, StepRunResult};
use mri_toolkit::CommandLine;

use super::{encode, ids, volume_path, StepEnv};
use crate::artifacts::{roles, VolumeArtifact};

/// Registro lineal (`flirt`) del cerebro extraído al template MNI152 1 mm.
/// Publica el volumen registrado y la matriz afín.
#[derive(Debug, Clone)]
pub struct RegistrationStep {
    env: Arc<StepEnv>,
}

impl RegistrationStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Artifact>, CoreEngineError> {
        let brain = volume_path(ctx.artifacts, roles::BRAIN_VOLUME)?;
        let names = &self.env.ctx.names;
        let template = self.env.ctx.template_path();
        self.env.run_tool(self.id(),
                          &CommandLine::registration(&brain, &template, &names.mni_matrix, &names.mni_volume))?;
        Ok(vec![encode(VolumeArtifact::at(names.mni_volume.as_str()), roles::MNI_VOLUME)?,
                encode(VolumeArtifact::at(names.mni_matrix.as_str()), roles::MNI_MATRIX)?])
    }
}

impl StepDefinition for RegistrationStep {
    fn id(&self) -> &str {
        ids::REGISTRATION
    }

    fn base_params(&self) -> Value {
        json!({ "template": self.env.ctx.template_path(),
                "matrix": self.env.ctx.names.mni_matrix,
                "output": self.env.ctx.names.mni_volume })
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        StepRunResult::from_result(self.execute(ctx))
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }
}
