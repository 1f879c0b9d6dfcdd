//! mri-toolkit: ejecución de herramientas externas (FSL) detrás de un trait.
//!
//! - `CommandLine`: programa + argumentos, con constructores para cada
//!   herramienta usada por el pipeline.
//! - `CommandInvoker`: ejecuta una línea y devuelve stdout/stderr/código.
//! - `StageRunner`: registra la línea, ejecuta y clasifica el resultado.
//! - `SystemCommandInvoker` (procesos reales) y `ScriptedInvoker` (tests).

pub mod command;
pub mod error;
pub mod invoker;
pub mod mock;
pub mod runner;
pub mod system;

pub use command::CommandLine;
pub use error::ToolkitError;
pub use invoker::{CommandInvoker, CommandOutput, NOT_FOUND_EXIT_CODE};
pub use mock::{CannedResponse, ScriptedInvoker};
pub use runner::StageRunner;
pub use system::SystemCommandInvoker;
