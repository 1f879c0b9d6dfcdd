//! Steps de estadísticas (`fslstats`).
//!
//! Cerebro completo y tejidos exigen la aridad exacta; una salida distinta
//! aborta el flujo. Los hipocampos toleran una máscara vacía: el registro
//! queda en cero y el step emite la señal `empty_structure`.

use log::warn;
use serde_json::{json, Value};
use std::sync::Arc;

use mri_core::{Artifact, CoreEngineError, ExecutionContext, StepDefinition, StepKind, StepRunResult, StepSignal};
use mri_domain::{parse_full, parse_volume, parse_volume_tolerant, Arity, Parsed};
use mri_toolkit::CommandLine;

use super::{encode, ids, parse_error, volume_path, StepEnv};
use crate::artifacts::{roles, FullStatsArtifact, VolumeStatsArtifact};
use crate::context::{Hemisphere, TissueClass};

pub const EMPTY_STRUCTURE_SIGNAL: &str = "empty_structure";

#[derive(Debug, Clone)]
pub struct WholeBrainStatsStep {
    env: Arc<StepEnv>,
}

impl WholeBrainStatsStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Artifact>, CoreEngineError> {
        let brain = volume_path(ctx.artifacts, roles::BRAIN_VOLUME)?;
        let raw = self.env.run_tool(self.id(), &CommandLine::full_statistics(&brain))?;
        let stats = parse_full(&raw).map_err(|e| parse_error(self.id(), Arity::Full.fields(), &raw, e))?;
        Ok(vec![encode(FullStatsArtifact { stats, schema_version: 1 }, roles::WHOLE_BRAIN_STATS)?])
    }
}

impl StepDefinition for WholeBrainStatsStep {
    fn id(&self) -> &str {
        ids::WHOLE_BRAIN_STATS
    }

    fn base_params(&self) -> Value {
        json!({ "flags": ["-R", "-M", "-V", "-P", "50", "-S"] })
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        StepRunResult::from_result(self.execute(ctx))
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }
}

/// Volumen de cada mapa de tejido, en orden CSF, GM, WM.
#[derive(Debug, Clone)]
pub struct TissueStatsStep {
    env: Arc<StepEnv>,
}

impl TissueStatsStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<Vec<Artifact>, CoreEngineError> {
        let mut outputs = Vec::with_capacity(TissueClass::ALL.len());
        for class in TissueClass::ALL {
            let map = volume_path(ctx.artifacts, roles::tissue_map(class))?;
            let raw = self.env.run_tool(self.id(), &CommandLine::volume_statistics(&map))?;
            let stats = parse_volume(&raw).map_err(|e| parse_error(self.id(), Arity::VolumeOnly.fields(), &raw, e))?;
            let art = VolumeStatsArtifact { stats, tolerated: false, schema_version: 1 };
            outputs.push(encode(art, roles::tissue_stats(class))?);
        }
        Ok(outputs)
    }
}

impl StepDefinition for TissueStatsStep {
    fn id(&self) -> &str {
        ids::TISSUE_STATS
    }

    fn base_params(&self) -> Value {
        json!({ "flags": ["-V"], "classes": ["csf", "gray_matter", "white_matter"] })
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        StepRunResult::from_result(self.execute(ctx))
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }
}

/// Volumen de ambas máscaras de hipocampo. Las dos consultas corren antes de
/// parsear cualquiera de ellas.
#[derive(Debug, Clone)]
pub struct HippocampiStatsStep {
    env: Arc<StepEnv>,
}

impl HippocampiStatsStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<(Vec<Artifact>, Vec<StepSignal>), CoreEngineError> {
        let mut raws = Vec::with_capacity(Hemisphere::BOTH.len());
        for side in Hemisphere::BOTH {
            let mask = volume_path(ctx.artifacts, roles::hippocampus_mask(side))?;
            raws.push((side, self.env.run_tool(self.id(), &CommandLine::volume_statistics(&mask))?));
        }

        let mut outputs = Vec::with_capacity(raws.len());
        let mut signals = Vec::new();
        for (side, raw) in raws {
            let parsed = parse_volume_tolerant(&raw).map_err(|e| {
                                                        parse_error(self.id(), Arity::VolumeOnly.fields(), &raw, e)
                                                    })?;
            let tolerated = parsed.is_defaulted();
            if let Parsed::Defaulted { found, .. } = &parsed {
                warn!("{} mask looks empty ({found} field(s) from fslstats); reporting 0", side.structure());
                signals.push(StepSignal::new(EMPTY_STRUCTURE_SIGNAL,
                                             json!({ "structure": side.structure(),
                                                     "label": self.env.ctx.labels.label(side),
                                                     "found_fields": found,
                                                     "raw": raw })));
            }
            let art = VolumeStatsArtifact { stats: parsed.into_inner(), tolerated, schema_version: 1 };
            outputs.push(encode(art, roles::hippocampus_stats(side))?);
        }
        Ok((outputs, signals))
    }
}

impl StepDefinition for HippocampiStatsStep {
    fn id(&self) -> &str {
        ids::HIPPOCAMPI_STATS
    }

    fn base_params(&self) -> Value {
        json!({ "flags": ["-V"], "tolerate_empty": true })
    }

    fn run(&self, ctx: &ExecutionContext) -> StepRunResult {
        StepRunResult::from_result_with_signals(self.execute(ctx))
    }

    fn kind(&self) -> StepKind {
        StepKind::Transform
    }
}
