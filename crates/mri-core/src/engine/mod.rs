//! Engine: FlowEngine y su builder.

pub mod builder;
pub mod core;

pub use builder::{EngineBuilder, EngineBuilderInit};
pub use core::FlowEngine;
