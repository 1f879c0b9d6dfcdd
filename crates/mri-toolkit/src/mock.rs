//! Invoker con respuestas predefinidas para tests.
//!
//! Las reglas se evalúan en orden de registro; gana la primera que coincide.
//! Sin coincidencia se usa la respuesta por defecto (exit 0, stdout vacío).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::{CommandInvoker, CommandLine, CommandOutput, ToolkitError};

#[derive(Debug, Clone, Default)]
pub struct CannedResponse {
    pub output: CommandOutput,
    /// Archivos a crear antes de responder (efecto lateral simulado).
    pub touch: Vec<PathBuf>,
    /// Si está presente, la invocación falla como si hubiera vencido el límite.
    pub timed_out_after: Option<u64>,
}

impl CannedResponse {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn stdout(text: impl Into<String>) -> Self {
        Self { output: CommandOutput::success(text), ..Self::default() }
    }

    pub fn fail(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self { output: CommandOutput::failure(exit_code, stderr), ..Self::default() }
    }

    pub fn timeout(seconds: u64) -> Self {
        Self { timed_out_after: Some(seconds), ..Self::default() }
    }

    pub fn touching(mut self, path: impl Into<PathBuf>) -> Self {
        self.touch.push(path.into());
        self
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Program(String),
    ProgramWithArg(String, String),
}

impl Matcher {
    fn matches(&self, c: &CommandLine) -> bool {
        match self {
            Matcher::Program(p) => c.program == *p,
            Matcher::ProgramWithArg(p, a) => c.program == *p && c.args.iter().any(|x| x == a),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedInvoker {
    rules: Vec<(Matcher, CannedResponse)>,
    fallback: CannedResponse,
    base_dir: Option<PathBuf>,
    calls: Mutex<Vec<CommandLine>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directorio contra el que se resuelven las rutas relativas de `touch`.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn on_program(mut self, program: &str, response: CannedResponse) -> Self {
        self.rules.push((Matcher::Program(program.to_string()), response));
        self
    }

    /// Coincide cuando `program` recibe `arg` en cualquier posición.
    pub fn on_arg(mut self, program: &str, arg: &str, response: CannedResponse) -> Self {
        self.rules.push((Matcher::ProgramWithArg(program.to_string(), arg.to_string()), response));
        self
    }

    pub fn with_fallback(mut self, response: CannedResponse) -> Self {
        self.fallback = response;
        self
    }

    /// Copia de las invocaciones registradas, en orden.
    pub fn calls(&self) -> Vec<CommandLine> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(p),
            None => p.to_path_buf(),
        }
    }
}

impl CommandInvoker for ScriptedInvoker {
    fn execute(&self, command: &CommandLine) -> Result<CommandOutput, ToolkitError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(command.clone());
        let response = self.rules
                           .iter()
                           .find(|(m, _)| m.matches(command))
                           .map(|(_, r)| r)
                           .unwrap_or(&self.fallback);
        if let Some(seconds) = response.timed_out_after {
            return Err(ToolkitError::Timeout { command: command.to_string(), seconds });
        }
        for path in &response.touch {
            let target = self.resolve(path);
            fs::write(&target, b"").map_err(|source| ToolkitError::Io { command: command.to_string(), source })?;
        }
        Ok(response.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_rule_wins() {
        let inv = ScriptedInvoker::new().on_arg("fslstats", "left.nii.gz", CannedResponse::stdout("0"))
                                        .on_program("fslstats", CannedResponse::stdout("500 400.0"));
        let left = inv.execute(&CommandLine::volume_statistics("left.nii.gz")).unwrap();
        let right = inv.execute(&CommandLine::volume_statistics("right.nii.gz")).unwrap();
        assert_eq!(left.stdout, "0");
        assert_eq!(right.stdout, "500 400.0");
        assert_eq!(inv.programs(), vec!["fslstats", "fslstats"]);
    }

    #[test]
    fn unmatched_commands_use_fallback() {
        let inv = ScriptedInvoker::new();
        let out = inv.execute(&CommandLine::new("bet")).unwrap();
        assert_eq!(out, CommandOutput::default());
    }

    #[test]
    fn touch_creates_files_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let inv = ScriptedInvoker::new().in_dir(dir.path())
                                        .on_program("fslchfiletype", CannedResponse::ok().touching("scan.nii.gz"));
        inv.execute(&CommandLine::convert_to_nifti_gz("scan.img", "scan.nii.gz")).unwrap();
        assert!(dir.path().join("scan.nii.gz").exists());
    }

    #[test]
    fn timeout_response_is_reported_as_error_and_recorded() {
        let inv = ScriptedInvoker::new().on_program("flirt", CannedResponse::timeout(30));
        match inv.execute(&CommandLine::new("flirt").arg("-in")) {
            Err(ToolkitError::Timeout { command, seconds }) => {
                assert_eq!(seconds, 30);
                assert!(command.starts_with("flirt"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(inv.programs(), vec!["flirt"]);
    }
}
