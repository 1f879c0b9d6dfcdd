//! Pipeline MRI completo sobre el motor lineal.
//!
//! El estado observable (`PipelineState`) no se guarda: se deriva del
//! replay de eventos del engine. Un step fallido deja el flujo en `Aborted`
//! y el engine se niega a avanzar.

use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use mri_core::{ArtifactSpec, CoreEngineError, FlowEngine, FlowEventKind, FlowInstance, InMemoryEventStore,
               InMemoryFlowRepository};
use mri_domain::MriReport;
use mri_toolkit::{CommandInvoker, SystemCommandInvoker};

use crate::artifacts::{roles, ReportArtifact, VolumeArtifact};
use crate::context::RunContext;
use crate::steps::statistics::EMPTY_STRUCTURE_SIGNAL;
use crate::steps::{downstream_steps, NormalizeFormatStep, StepEnv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Init,
    FormatNormalized,
    BrainExtracted,
    WholeBrainStatsComputed,
    Segmented,
    TissueStatsComputed,
    Registered,
    SubcorticalSegmented,
    HippocampiExtracted,
    HippocampiStatsComputed,
    ReportWritten,
    Done,
    Aborted,
}

impl PipelineState {
    /// Estado alcanzado al terminar cada step, por índice.
    const AFTER_STEP: [PipelineState; 10] = [PipelineState::FormatNormalized,
                                             PipelineState::BrainExtracted,
                                             PipelineState::WholeBrainStatsComputed,
                                             PipelineState::Segmented,
                                             PipelineState::TissueStatsComputed,
                                             PipelineState::Registered,
                                             PipelineState::SubcorticalSegmented,
                                             PipelineState::HippocampiExtracted,
                                             PipelineState::HippocampiStatsComputed,
                                             PipelineState::ReportWritten];

    pub fn from_instance(instance: &FlowInstance) -> Self {
        if instance.failed {
            return PipelineState::Aborted;
        }
        if instance.completed {
            return PipelineState::Done;
        }
        match instance.last_finished() {
            None => PipelineState::Init,
            Some(i) => Self::AFTER_STEP.get(i).copied().unwrap_or(PipelineState::ReportWritten),
        }
    }
}

/// Resultado de una corrida exitosa.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report_path: PathBuf,
    pub report: MriReport,
    /// Estructuras cuya máscara resultó vacía y se reportaron en cero.
    pub empty_structures: Vec<String>,
    pub flow_fingerprint: Option<String>,
}

pub type MriEngine = FlowEngine<InMemoryEventStore, InMemoryFlowRepository>;

pub struct MriPipeline {
    engine: MriEngine,
    ctx: RunContext,
}

impl MriPipeline {
    pub fn new(ctx: RunContext, invoker: Arc<dyn CommandInvoker>) -> Self {
        let env = StepEnv::new(ctx.clone(), invoker);
        let builder = FlowEngine::new().first_step(NormalizeFormatStep::new(env.clone()));
        let engine = downstream_steps(&env).into_iter()
                                           .fold(builder, |b, step| b.add_boxed(step))
                                           .build();
        Self { engine, ctx }
    }

    /// Pipeline con procesos reales en `ctx.working_dir` y el timeout de `ctx`.
    pub fn with_system_invoker(ctx: RunContext) -> Self {
        let invoker = SystemCommandInvoker::new().with_working_dir(&ctx.working_dir)
                                                 .with_timeout(ctx.timeout);
        Self::new(ctx, Arc::new(invoker))
    }

    pub fn engine(&self) -> &MriEngine {
        &self.engine
    }

    /// Corre todas las etapas sobre `input_file` (ruta tal como la dio el
    /// usuario). Una instancia corre una sola vez.
    pub fn run(&mut self, input_file: &str) -> Result<PipelineOutcome, CoreEngineError> {
        if self.state() != PipelineState::Init {
            return Err(CoreEngineError::Internal("pipeline already ran".into()));
        }
        let input = VolumeArtifact::at(input_file).into_artifact(roles::INPUT_VOLUME)
                                                  .map_err(|e| CoreEngineError::Internal(e.to_string()))?;
        self.engine.store_artifact(input);

        info!("analyzing {input_file} in {}", self.ctx.working_dir.display());
        self.engine.run()?;

        let report = self.engine.artifacts().decode::<ReportArtifact>(roles::REPORT)?;
        Ok(PipelineOutcome { report_path: self.ctx.resolve(&report.path),
                             report: report.report,
                             empty_structures: self.empty_structures(),
                             flow_fingerprint: self.engine.flow_fingerprint() })
    }

    pub fn state(&self) -> PipelineState {
        self.engine.instance().map(|i| PipelineState::from_instance(&i)).unwrap_or(PipelineState::Init)
    }

    /// Error que abortó el flujo, si lo hubo.
    pub fn failure(&self) -> Option<CoreEngineError> {
        self.engine.events()?.into_iter().find_map(|e| match e.kind {
                                             FlowEventKind::StepFailed { error, .. } => Some(error),
                                             _ => None,
                                         })
    }

    pub fn empty_structures(&self) -> Vec<String> {
        self.engine
            .events()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|e| match e.kind {
                FlowEventKind::StepSignal { signal, data, .. } if signal == EMPTY_STRUCTURE_SIGNAL => {
                    data.get("structure").and_then(|s| s.as_str()).map(str::to_string)
                }
                _ => None,
            })
            .collect()
    }
}

impl std::fmt::Debug for MriPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MriPipeline")
         .field("working_dir", &self.ctx.working_dir)
         .field("state", &self.state())
         .finish()
    }
}
