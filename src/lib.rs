//! mriflow
//!
//! Orquesta un análisis volumétrico de una resonancia cerebral invocando las
//! herramientas de FSL y escribe un reporte de texto con layout fijo.
//!
//! - `config`: `AppConfig` desde variables de entorno.
//! - `cli`: argumentos, mensajes y códigos de salida.

pub mod cli;
pub mod config;

pub use config::{AppConfig, ConfigError};
