use serde::{Deserialize, Serialize};

use crate::{CommandLine, ToolkitError};

/// Código que devuelve un shell cuando el programa no está en `PATH`.
pub const NOT_FOUND_EXIT_CODE: i32 = 127;

/// Salida capturada de una invocación.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self { stdout: stdout.into(), stderr: String::new(), exit_code: 0 }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self { stdout: String::new(), stderr: stderr.into(), exit_code }
    }
}

/// Ejecuta una línea de comando de forma sincrónica.
///
/// Un código de salida distinto de cero NO es error a este nivel; lo
/// clasifica `StageRunner`. Sólo timeouts y fallas de IO son `Err`.
pub trait CommandInvoker: Send + Sync {
    fn execute(&self, command: &CommandLine) -> Result<CommandOutput, ToolkitError>;
}
