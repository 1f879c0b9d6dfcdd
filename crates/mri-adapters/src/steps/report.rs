//! ReportStep (Sink)
//!
//! Reúne los seis registros y persiste el reporte en el directorio de
//! trabajo. Es el único step con efecto en disco propio.

use log::{info, warn};
use serde_json::{json, Value};
use std::sync::Arc;

use mri_core::{Artifact, CoreEngineError, ExecutionContext, StepDefinition, StepKind, StepRunResult};
use mri_domain::assemble;

use super::{encode, ids, volume_path, StepEnv};
use crate::artifacts::{roles, FullStatsArtifact, ReportArtifact, VolumeStatsArtifact};
use crate::context::{Hemisphere, TissueClass};

#[derive(Debug, Clone)]
pub struct ReportStep {
    env: Arc<StepEnv>,
}

impl ReportStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Artifact>, CoreEngineError> {
        let t = ctx.artifacts;
        let input = volume_path(t, roles::INPUT_VOLUME)?;
        let whole = t.decode::<FullStatsArtifact>(roles::WHOLE_BRAIN_STATS)?.stats;
        let tissue = |c| t.decode::<VolumeStatsArtifact>(roles::tissue_stats(c)).map(|a| a.stats);
        let hippo = |s| t.decode::<VolumeStatsArtifact>(roles::hippocampus_stats(s)).map(|a| a.stats);

        let report = assemble(&input,
                              &whole,
                              &tissue(TissueClass::Csf)?,
                              &tissue(TissueClass::GrayMatter)?,
                              &tissue(TissueClass::WhiteMatter)?,
                              &hippo(Hemisphere::Left)?,
                              &hippo(Hemisphere::Right)?);

        let path = self.env.ctx.report_path();
        if path.exists() {
            warn!("overwriting existing report {}", path.display());
        }
        report.persist(&path).map_err(|e| CoreEngineError::Io(e.to_string()))?;
        info!("report written to {}", path.display());

        let art = ReportArtifact { path: self.env.ctx.names.report.clone(), report, schema_version: 1 };
        Ok(vec![encode(art, roles::REPORT)?])
    }
}

impl StepDefinition for ReportStep {
    fn id(&self) -> &str {
        ids::REPORT
    }

    fn base_params(&self) -> Value {
        json!({ "file": self.env.ctx.names.report })
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        StepRunResult::from_result(self.execute(ctx))
    }

    fn kind(&self) -> StepKind {
        StepKind::Sink
    }
}
