//! Builder para `FlowEngine`.
//!
//! Obliga a declarar primero el paso fuente y luego encadenar el resto en
//! orden de ejecución:
//!
//! ```ignore
//! let engine = FlowEngine::new()
//!     .first_step(SourceStep)
//!     .add_step(TransformStep)
//!     .add_step(SinkStep)
//!     .build();
//! ```

use crate::engine::FlowEngine;
use crate::event::EventStore;
use crate::repo::FlowRepository;
use crate::step::{StepDefinition, StepKind};

/// Estado inicial del builder: sólo las stores.
#[derive(Debug)]
pub struct EngineBuilderInit<E: EventStore, R: FlowRepository> {
    pub event_store: E,
    pub repository: R,
}

impl<E: EventStore, R: FlowRepository> EngineBuilderInit<E, R> {
    /// Define el primer paso del flujo.
    ///
    /// Conceptualmente debe ser de tipo `Source`; se verifica con
    /// `debug_assert!` (en release la aserción queda desactivada).
    #[inline]
    pub fn first_step<S>(self, step: S) -> EngineBuilder<E, R>
        where S: StepDefinition + 'static
    {
        debug_assert!(matches!(step.kind(), StepKind::Source), "El primer paso debe ser de tipo Source");
        EngineBuilder { event_store: self.event_store,
                        repository: self.repository,
                        steps: vec![Box::new(step)] }
    }
}

/// Builder principal que acumula pasos.
pub struct EngineBuilder<E: EventStore, R: FlowRepository> {
    event_store: E,
    repository: R,
    steps: Vec<Box<dyn StepDefinition>>,
}

impl<E: EventStore, R: FlowRepository> EngineBuilder<E, R> {
    #[inline]
    pub fn add_step<N>(mut self, next: N) -> Self
        where N: StepDefinition + 'static
    {
        self.steps.push(Box::new(next));
        self
    }

    /// Añade un paso ya encajado (útil cuando la lista se arma dinámicamente).
    #[inline]
    pub fn add_boxed(mut self, next: Box<dyn StepDefinition>) -> Self {
        self.steps.push(next);
        self
    }

    /// Construye el `FlowEngine` y fija la definición por defecto.
    #[inline]
    pub fn build(self) -> FlowEngine<E, R> {
        let mut engine = FlowEngine::new_with_stores(self.event_store, self.repository);
        let definition = crate::repo::build_flow_definition_auto(self.steps);
        engine.set_default_definition(definition);
        engine
    }
}
