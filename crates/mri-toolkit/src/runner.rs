use log::{debug, info};
use std::sync::Arc;

use crate::{CommandInvoker, CommandLine, ToolkitError};

/// Ejecuta etapas a través de un `CommandInvoker` inyectado.
#[derive(Clone)]
pub struct StageRunner {
    invoker: Arc<dyn CommandInvoker>,
}

impl StageRunner {
    pub fn new(invoker: Arc<dyn CommandInvoker>) -> Self {
        Self { invoker }
    }

    /// Corre `command` y devuelve stdout sin espacios al borde.
    /// Exit distinto de 0 => `ToolkitError::NonZeroExit`.
    pub fn run(&self, stage: &str, command: &CommandLine) -> Result<String, ToolkitError> {
        info!("Running command: {command}");
        let out = self.invoker.execute(command)?;
        if out.exit_code != 0 {
            return Err(ToolkitError::NonZeroExit { command: command.to_string(),
                                                   exit_code: out.exit_code,
                                                   stderr: out.stderr });
        }
        let stdout = out.stdout.trim().to_string();
        debug!("[{stage}] stdout: {stdout:?}");
        Ok(stdout)
    }
}

impl std::fmt::Debug for StageRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRunner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CannedResponse, ScriptedInvoker};

    #[test]
    fn returns_trimmed_stdout_on_success() {
        let inv = Arc::new(ScriptedInvoker::new().on_program("fslstats", CannedResponse::stdout("  10 8.0 \n")));
        let runner = StageRunner::new(inv.clone());
        let out = runner.run("tissue_stats", &CommandLine::volume_statistics("x.nii.gz")).unwrap();
        assert_eq!(out, "10 8.0");
        assert_eq!(inv.calls().len(), 1);
    }

    #[test]
    fn non_zero_exit_carries_code_and_stderr() {
        let inv = Arc::new(ScriptedInvoker::new().on_program("bet", CannedResponse::fail(3, "bad header")));
        let runner = StageRunner::new(inv);
        match runner.run("brain_extraction", &CommandLine::brain_extraction("a", "b")) {
            Err(ToolkitError::NonZeroExit { exit_code, stderr, command }) => {
                assert_eq!(exit_code, 3);
                assert_eq!(stderr, "bad header");
                assert!(command.starts_with("bet a b"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
