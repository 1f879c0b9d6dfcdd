//! Repositorio: replay de eventos y definición de flujos.

mod types;

pub use types::{build_flow_definition_auto, FlowDefinition, FlowInstance, FlowRepository,
                InMemoryFlowRepository, StepSlot};
