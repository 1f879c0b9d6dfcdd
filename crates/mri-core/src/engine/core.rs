//! Core FlowEngine implementation

use log::{debug, info, warn};
use serde_json::json;
use uuid::Uuid;

use crate::engine::EngineBuilderInit;
use crate::errors::CoreEngineError;
use crate::event::{EventStore, FlowEvent, FlowEventKind};
use crate::hashing::hash_value;
use crate::model::{Artifact, ArtifactTable, ExecutionContext};
use crate::repo::{FlowDefinition, FlowInstance, FlowRepository};
use crate::step::{StepRunResult, StepSignal};
use crate::StepDefinition;

/// Motor de ejecución de flujos lineales.
///
/// Ejecuta los pasos de una `FlowDefinition` en orden estricto, guarda sus
/// outputs en una `ArtifactTable` y registra cada transición como evento.
/// Tras un `StepFailed` el flujo queda terminal: ningún paso posterior se
/// ejecuta (`FlowHasFailed`).
#[derive(Debug)]
pub struct FlowEngine<E, R>
    where E: EventStore,
          R: FlowRepository
{
    event_store: E,
    repository: R,
    artifact_store: ArtifactTable,
    default_flow_id: Option<Uuid>,
    default_definition: Option<FlowDefinition>,
}

impl<E, R> FlowEngine<E, R>
    where E: EventStore,
          R: FlowRepository
{
    pub fn new_with_stores(event_store: E, repository: R) -> Self {
        Self { event_store,
               repository,
               artifact_store: ArtifactTable::new(),
               default_flow_id: None,
               default_definition: None }
    }

    /// Tabla de artifacts producida hasta el momento.
    pub fn artifacts(&self) -> &ArtifactTable { &self.artifact_store }

    pub fn event_store(&self) -> &E { &self.event_store }

    /// Siembra un artifact antes de ejecutar (p.ej. el volumen de entrada).
    pub fn store_artifact(&mut self, mut artifact: Artifact) {
        artifact.hash = hash_value(&artifact.payload);
        self.artifact_store.insert(artifact);
    }

    fn load_or_init(&mut self, flow_id: Uuid, definition: &FlowDefinition) -> Vec<FlowEvent> {
        let mut events = self.event_store.list(flow_id);
        let has_init = events.iter().any(|e| matches!(e.kind, FlowEventKind::FlowInitialized { .. }));
        if !has_init {
            let ev = self.event_store
                         .append_kind(flow_id,
                                      FlowEventKind::FlowInitialized { definition_hash: definition.definition_hash.clone(),
                                                                       step_count: definition.len() });
            debug!("flow {flow_id} initialized ({} steps)", definition.len());
            events.push(ev);
        }
        self.default_flow_id = Some(flow_id);
        events
    }

    /// Define/genera un `flow_id` por defecto si no existe aún y lo retorna.
    pub fn ensure_default_flow_id(&mut self) -> Uuid {
        *self.default_flow_id.get_or_insert_with(Uuid::new_v4)
    }

    pub fn default_flow_id(&self) -> Option<Uuid> { self.default_flow_id }

    pub fn set_default_definition(&mut self, definition: FlowDefinition) {
        self.default_definition = Some(definition);
    }

    pub fn default_definition(&self) -> Option<&FlowDefinition> { self.default_definition.as_ref() }

    /// Ejecuta el flujo completo y retorna su ID.
    pub fn run(&mut self) -> Result<Uuid, CoreEngineError> {
        self.run_to_completion()
    }

    /// Avanza un paso en el flujo por defecto.
    pub fn step(&mut self) -> Result<(), CoreEngineError> {
        let flow_id = self.ensure_default_flow_id();
        let def = self.default_definition
                      .take()
                      .ok_or_else(|| CoreEngineError::Internal("no default definition configured".into()))?;
        let result = self.next_with(flow_id, &def);
        self.default_definition = Some(def);
        result
    }

    pub fn run_to_completion(&mut self) -> Result<Uuid, CoreEngineError> {
        let flow_id = self.ensure_default_flow_id();
        let def = self.default_definition
                      .take()
                      .ok_or_else(|| CoreEngineError::Internal("no default definition configured".into()))?;
        let result = self.run_flow_to_completion(flow_id, &def);
        self.default_definition = Some(def);
        result
    }

    pub fn run_flow_to_completion(&mut self, flow_id: Uuid, definition: &FlowDefinition) -> Result<Uuid, CoreEngineError> {
        loop {
            match self.next_with(flow_id, definition) {
                Ok(()) => continue,
                Err(CoreEngineError::FlowCompleted) => return Ok(flow_id),
                Err(e) => return Err(e),
            }
        }
    }

    /// Ejecuta el siguiente paso pendiente de `flow_id`.
    pub fn next_with(&mut self, flow_id: Uuid, definition: &FlowDefinition) -> Result<(), CoreEngineError> {
        let events = self.load_or_init(flow_id, definition);
        let instance = self.repository.load(flow_id, &events, definition);

        if instance.failed {
            return Err(CoreEngineError::FlowHasFailed);
        }
        if instance.completed || instance.cursor >= definition.len() {
            return Err(CoreEngineError::FlowCompleted);
        }

        let cursor = instance.cursor;
        let step_def = definition.steps[cursor].as_ref();

        self.event_store.append_kind(flow_id,
                                     FlowEventKind::StepStarted { step_index: cursor,
                                                                  step_id: step_def.id().to_string() });
        info!("[{}/{}] {}", cursor + 1, definition.len(), step_def.name());

        let run_res = {
            let ctx = ExecutionContext { artifacts: &self.artifact_store,
                                         params: step_def.base_params() };
            step_def.run(&ctx)
        };

        match run_res {
            StepRunResult::Success { outputs } => self.handle_step_success(flow_id, cursor, step_def, outputs, vec![], definition),
            StepRunResult::SuccessWithSignals { outputs, signals } => {
                self.handle_step_success(flow_id, cursor, step_def, outputs, signals, definition)
            }
            StepRunResult::Failure { error } => self.handle_step_failure(flow_id, cursor, step_def, error, definition),
        }
    }

    fn hash_and_store_outputs(&mut self, outputs: Vec<Artifact>) -> Vec<String> {
        let mut roles = Vec::with_capacity(outputs.len());
        for mut o in outputs {
            o.hash = hash_value(&o.payload);
            let role = o.role.clone();
            if self.artifact_store.insert(o).is_some() {
                warn!("artifact role '{role}' overwritten");
            }
            roles.push(role);
        }
        roles
    }

    fn handle_step_success(&mut self,
                           flow_id: Uuid,
                           cursor: usize,
                           step_def: &dyn StepDefinition,
                           outputs: Vec<Artifact>,
                           signals: Vec<StepSignal>,
                           definition: &FlowDefinition)
                           -> Result<(), CoreEngineError> {
        let roles = self.hash_and_store_outputs(outputs);

        for s in signals {
            self.event_store.append_kind(flow_id,
                                         FlowEventKind::StepSignal { step_index: cursor,
                                                                     step_id: step_def.id().to_string(),
                                                                     signal: s.signal,
                                                                     data: s.data });
        }

        let fp = self.calculate_step_fingerprint(cursor, step_def, &roles, definition);
        debug!("step '{}' finished, outputs={:?}", step_def.id(), roles);
        self.event_store.append_kind(flow_id,
                                     FlowEventKind::StepFinished { step_index: cursor,
                                                                   step_id: step_def.id().to_string(),
                                                                   outputs: roles,
                                                                   fingerprint: fp });

        if cursor + 1 == definition.len() {
            self.complete_flow(flow_id, definition);
        }
        Ok(())
    }

    fn handle_step_failure(&mut self,
                           flow_id: Uuid,
                           cursor: usize,
                           step_def: &dyn StepDefinition,
                           error: CoreEngineError,
                           definition: &FlowDefinition)
                           -> Result<(), CoreEngineError> {
        let fp = hash_value(&json!({
            "engine_version": crate::constants::ENGINE_VERSION,
            "definition_hash": definition.definition_hash,
            "step_index": cursor,
            "params": step_def.base_params()
        }));
        warn!("step '{}' failed: {error}", step_def.id());
        self.event_store.append_kind(flow_id,
                                     FlowEventKind::StepFailed { step_index: cursor,
                                                                 step_id: step_def.id().to_string(),
                                                                 error: error.clone(),
                                                                 fingerprint: fp });
        Err(error)
    }

    fn calculate_step_fingerprint(&self,
                                  cursor: usize,
                                  step_def: &dyn StepDefinition,
                                  roles: &[String],
                                  definition: &FlowDefinition)
                                  -> String {
        let output_hashes: Vec<&str> = roles.iter()
                                            .filter_map(|r| self.artifact_store.get(r))
                                            .map(|a| a.hash.as_str())
                                            .collect();
        hash_value(&json!({
            "engine_version": crate::constants::ENGINE_VERSION,
            "definition_hash": definition.definition_hash,
            "step_index": cursor,
            "output_hashes": output_hashes,
            "params": step_def.base_params()
        }))
    }

    fn complete_flow(&mut self, flow_id: Uuid, definition: &FlowDefinition) {
        let step_fps: Vec<String> = self.event_store
                                        .list(flow_id)
                                        .iter()
                                        .filter_map(|e| match &e.kind {
                                            FlowEventKind::StepFinished { fingerprint, .. } => Some(fingerprint.clone()),
                                            _ => None,
                                        })
                                        .collect();
        let flow_fp = hash_value(&json!({
                                     "engine_version": crate::constants::ENGINE_VERSION,
                                     "definition_hash": definition.definition_hash,
                                     "step_fingerprints": step_fps
                                 }));
        self.event_store.append_kind(flow_id, FlowEventKind::FlowCompleted { flow_fingerprint: flow_fp });
    }

    /// Eventos del flujo por defecto.
    pub fn events(&self) -> Option<Vec<FlowEvent>> {
        self.default_flow_id.map(|fid| self.event_store.list(fid))
    }

    /// Estado reconstruido del flujo por defecto.
    pub fn instance(&self) -> Option<FlowInstance> {
        let flow_id = self.default_flow_id?;
        let def = self.default_definition.as_ref()?;
        let events = self.event_store.list(flow_id);
        Some(self.repository.load(flow_id, &events, def))
    }

    /// Variante compacta de eventos para el flujo por defecto
    pub fn event_variants(&self) -> Option<Vec<&'static str>> {
        self.events().map(|events| {
                         events.iter()
                               .map(|e| match e.kind {
                                   FlowEventKind::FlowInitialized { .. } => "I",
                                   FlowEventKind::StepStarted { .. } => "S",
                                   FlowEventKind::StepFinished { .. } => "F",
                                   FlowEventKind::StepFailed { .. } => "X",
                                   FlowEventKind::StepSignal { .. } => "G",
                                   FlowEventKind::FlowCompleted { .. } => "C",
                               })
                               .collect()
                     })
    }

    /// Fingerprint del flujo por defecto si completó.
    pub fn flow_fingerprint(&self) -> Option<String> {
        let evs = self.events()?;
        evs.iter().rev().find_map(|e| match &e.kind {
                            FlowEventKind::FlowCompleted { flow_fingerprint } => Some(flow_fingerprint.clone()),
                            _ => None,
                        })
    }
}

impl FlowEngine<crate::event::InMemoryEventStore, crate::repo::InMemoryFlowRepository> {
    /// Crea un nuevo engine con stores en memoria
    #[inline]
    pub fn new() -> EngineBuilderInit<crate::event::InMemoryEventStore, crate::repo::InMemoryFlowRepository> {
        EngineBuilderInit { event_store: crate::event::InMemoryEventStore::default(),
                            repository: crate::repo::InMemoryFlowRepository::new() }
    }
}

impl Default for FlowEngine<crate::event::InMemoryEventStore, crate::repo::InMemoryFlowRepository> {
    fn default() -> Self {
        Self::new_with_stores(crate::event::InMemoryEventStore::default(),
                              crate::repo::InMemoryFlowRepository::new())
    }
}
