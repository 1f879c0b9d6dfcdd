//! mri-core: motor lineal para pipelines de etapas.
//!
//! El motor es neutral: no sabe nada de imágenes ni de herramientas externas.
//! Ejecuta una lista ordenada de `StepDefinition`, publica sus outputs en una
//! `ArtifactTable` indexada por rol y registra cada transición como
//! `FlowEvent`. Un fallo detiene el flujo de forma definitiva.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod repo;
pub mod step;

pub use engine::{EngineBuilder, EngineBuilderInit, FlowEngine};
pub use errors::CoreEngineError;
pub use event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
pub use model::{Artifact, ArtifactKind, ArtifactSpec, ArtifactTable, ExecutionContext};
pub use repo::{build_flow_definition_auto, FlowDefinition, FlowInstance, FlowRepository,
               InMemoryFlowRepository};
pub use step::{StepDefinition, StepKind, StepRunResult, StepSignal, StepStatus};
