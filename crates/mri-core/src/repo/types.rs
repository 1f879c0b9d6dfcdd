//! Tipos de repositorio: estado reconstruido (FlowInstance) y definición
//! (FlowDefinition).
//!
//! El repositorio aplica un replay lineal: consume eventos en orden y
//! reconstruye un `FlowInstance`. Sólo guarda roles de outputs, no artifacts.
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::event::{FlowEvent, FlowEventKind};
use crate::step::{StepDefinition, StepStatus};

pub struct FlowInstance {
    pub id: Uuid,
    pub steps: Vec<StepSlot>,
    pub cursor: usize,
    pub completed: bool,
    /// Algún step terminó en `Failed`; el flujo es terminal.
    pub failed: bool,
}

impl FlowInstance {
    /// Índice del último step terminado con éxito.
    pub fn last_finished(&self) -> Option<usize> {
        self.steps.iter().rposition(|s| s.status == StepStatus::FinishedOk)
    }
}

/// Estado de un step en la instancia.
pub struct StepSlot {
    pub step_id: String,
    pub status: StepStatus,
    pub fingerprint: Option<String>,
    pub outputs: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Reconstruye (`replay`) el estado de un flow a partir de eventos.
pub trait FlowRepository {
    fn load(&self, flow_id: Uuid, events: &[FlowEvent], definition: &FlowDefinition) -> FlowInstance;
}

/// Definición inmutable del Flow.
pub struct FlowDefinition {
    pub steps: Vec<Box<dyn StepDefinition>>,
    pub definition_hash: String,
}

impl FlowDefinition {
    pub fn new(steps: Vec<Box<dyn StepDefinition>>, definition_hash: String) -> Self {
        Self { steps, definition_hash }
    }
    pub fn len(&self) -> usize { self.steps.len() }
    pub fn is_empty(&self) -> bool { self.steps.is_empty() }
    pub fn step_ids(&self) -> Vec<&str> { self.steps.iter().map(|s| s.id()).collect() }
}

impl std::fmt::Debug for FlowDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowDefinition")
         .field("steps", &self.step_ids())
         .field("definition_hash", &self.definition_hash)
         .finish()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFlowRepository;

impl InMemoryFlowRepository {
    pub fn new() -> Self { Self }
}

impl FlowRepository for InMemoryFlowRepository {
    fn load(&self, flow_id: Uuid, events: &[FlowEvent], definition: &FlowDefinition) -> FlowInstance {
        let mut steps: Vec<StepSlot> = definition.steps
                                                 .iter()
                                                 .map(|s| StepSlot { step_id: s.id().to_string(),
                                                                     status: StepStatus::Pending,
                                                                     fingerprint: None,
                                                                     outputs: vec![],
                                                                     started_at: None,
                                                                     finished_at: None })
                                                 .collect();
        let mut completed = false;
        let mut failed = false;
        for ev in events {
            match &ev.kind {
                FlowEventKind::FlowInitialized { .. } | FlowEventKind::StepSignal { .. } => {}
                FlowEventKind::StepStarted { step_index, .. } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        slot.status = StepStatus::Running;
                        slot.started_at = Some(ev.ts);
                    }
                }
                FlowEventKind::StepFinished { step_index,
                                              fingerprint,
                                              outputs,
                                              .. } => {
                    if let Some(slot) = steps.get_mut(*step_index) {
                        slot.status = StepStatus::FinishedOk;
                        slot.fingerprint = Some(fingerprint.clone());
                        slot.outputs = outputs.clone();
                        slot.finished_at = Some(ev.ts);
                    }
                }
                FlowEventKind::StepFailed { step_index, fingerprint, .. } => {
                    failed = true;
                    if let Some(slot) = steps.get_mut(*step_index) {
                        slot.status = StepStatus::Failed;
                        slot.fingerprint = Some(fingerprint.clone());
                        slot.finished_at = Some(ev.ts);
                    }
                }
                FlowEventKind::FlowCompleted { .. } => completed = true,
            }
        }
        let cursor = steps.iter()
                          .position(|s| s.status == StepStatus::Pending)
                          .unwrap_or(steps.len());
        FlowInstance { id: flow_id,
                       steps,
                       cursor,
                       completed,
                       failed }
    }
}

/// Construye la definición; el hash deriva de los ids de los steps, en orden.
pub fn build_flow_definition_auto(steps: Vec<Box<dyn StepDefinition>>) -> FlowDefinition {
    use crate::hashing::hash_value;
    let ids: Vec<&str> = steps.iter().map(|s| s.id()).collect();
    let definition_hash = hash_value(&serde_json::json!(ids));
    FlowDefinition::new(steps, definition_hash)
}
