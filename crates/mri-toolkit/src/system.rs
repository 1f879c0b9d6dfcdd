//! Invoker sobre procesos reales del sistema operativo.
//!
//! stdout y stderr se drenan en hilos auxiliares para que una salida grande
//! no bloquee el pipe mientras se espera al hijo. Con timeout configurado se
//! hace polling con `try_wait` hasta el deadline; al vencer se mata el grupo
//! de procesos entero (en unix cada herramienta arranca en su propio grupo),
//! así los nietos que heredan los pipes tampoco sobreviven al límite.

use log::{debug, warn};
use std::io::{self, ErrorKind, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::{CommandInvoker, CommandLine, CommandOutput, ToolkitError, NOT_FOUND_EXIT_CODE};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Espera máxima por los lectores tras matar el grupo.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default)]
pub struct SystemCommandInvoker {
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl SystemCommandInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// `None` o duración cero = sin límite.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    fn prepare(&self, command: &CommandLine) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }

    fn expire(&self, child: &mut Child, rendered: String, readers: [&Drained; 2]) -> ToolkitError {
        let seconds = self.timeout.map(|t| t.as_secs()).unwrap_or_default();
        warn!("`{rendered}` timed out after {seconds}s, killing process group");
        kill_tree(child);
        for rx in readers {
            let _ = rx.recv_timeout(DRAIN_GRACE);
        }
        ToolkitError::Timeout { command: rendered, seconds }
    }
}

type Drained = Receiver<io::Result<String>>;

fn drain<R: Read + Send + 'static>(source: Option<R>) -> Drained {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = match source {
            Some(mut r) => r.read_to_end(&mut buf).map(|_| String::from_utf8_lossy(&buf).into_owned()),
            None => Ok(String::new()),
        };
        let _ = tx.send(result);
    });
    rx
}

/// `Ok(None)` si vence el deadline antes de que el lector cierre el pipe.
fn collect(rx: &Drained, deadline: Option<Instant>) -> io::Result<Option<String>> {
    let received = match deadline {
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        Some(d) => rx.recv_timeout(d.saturating_duration_since(Instant::now())),
    };
    match received {
        Ok(result) => result.map(Some),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Err(io::Error::other("output reader thread exited without a result")),
    }
}

/// SIGKILL al grupo del hijo y luego al hijo; se recoge el estado para no dejar zombies.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        // process_group(0): el pgid coincide con el pid del hijo
        let pgid = child.id() as libc::pid_t;
        unsafe { libc::killpg(pgid, libc::SIGKILL) };
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// `Ok(None)` si se alcanzó el deadline sin que el hijo terminara.
fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

impl CommandInvoker for SystemCommandInvoker {
    fn execute(&self, command: &CommandLine) -> Result<CommandOutput, ToolkitError> {
        let rendered = command.to_string();
        let mut child = match self.prepare(command).spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("{}: command not found", command.program);
                return Ok(CommandOutput::failure(NOT_FOUND_EXIT_CODE,
                                                 format!("{}: command not found", command.program)));
            }
            Err(source) => return Err(ToolkitError::Spawn { command: rendered, source }),
        };
        debug!("spawned pid {} for `{rendered}`", child.id());

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let deadline = self.timeout.map(|limit| Instant::now() + limit);

        let finished = match deadline {
            None => child.wait().map(Some),
            Some(d) => wait_until(&mut child, d),
        };
        let status = match finished {
            Ok(Some(status)) => status,
            Ok(None) => return Err(self.expire(&mut child, rendered, [&stdout, &stderr])),
            Err(source) => {
                kill_tree(&mut child);
                return Err(ToolkitError::Io { command: rendered, source });
            }
        };

        // un nieto puede mantener los pipes abiertos tras la salida del hijo
        let mut captured = [String::new(), String::new()];
        for (slot, rx) in captured.iter_mut().zip([&stdout, &stderr]) {
            match collect(rx, deadline) {
                Ok(Some(text)) => *slot = text,
                Ok(None) => return Err(self.expire(&mut child, rendered, [&stdout, &stderr])),
                Err(source) => return Err(ToolkitError::Io { command: rendered, source }),
            }
        }
        let [stdout_text, stderr_text] = captured;

        Ok(CommandOutput { stdout: stdout_text,
                           stderr: stderr_text,
                           exit_code: status.code().unwrap_or(-1) })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandLine {
        CommandLine::new("sh").args(["-c", script])
    }

    #[test]
    fn captures_stdout_stderr_and_exit_code() {
        let out = SystemCommandInvoker::new().execute(&sh("echo 10 8.0; echo oops >&2; exit 3")).unwrap();
        assert_eq!(out.stdout.trim(), "10 8.0");
        assert_eq!(out.stderr.trim(), "oops");
        assert_eq!(out.exit_code, 3);
    }

    #[test]
    fn missing_program_behaves_like_shell() {
        let out = SystemCommandInvoker::new().execute(&CommandLine::new("mriflow-no-such-tool-xyz")).unwrap();
        assert_eq!(out.exit_code, NOT_FOUND_EXIT_CODE);
        assert!(out.stderr.contains("command not found"));
    }

    #[test]
    fn runs_in_configured_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "x").unwrap();
        let out = SystemCommandInvoker::new().with_working_dir(dir.path())
                                             .execute(&sh("ls"))
                                             .unwrap();
        assert!(out.stdout.contains("marker.txt"));
    }

    fn assert_times_out_quickly(script: &str) {
        let inv = SystemCommandInvoker::new().with_timeout(Some(Duration::from_secs(1)));
        let started = Instant::now();
        match inv.execute(&sh(script)) {
            Err(ToolkitError::Timeout { seconds, .. }) => assert_eq!(seconds, 1),
            other => panic!("unexpected: {other:?}"),
        }
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_secs(4), "took {elapsed:?}");
    }

    #[test]
    fn timeout_kills_shell_and_its_foreground_child() {
        // `sh` no hace exec del último comando aquí: `sleep` es nieto y hereda los pipes
        assert_times_out_quickly("sleep 10; echo done");
    }

    #[test]
    fn timeout_kills_background_grandchildren() {
        assert_times_out_quickly("sleep 10 & sleep 10; echo done");
    }

    #[test]
    fn output_held_open_by_grandchild_is_bounded_by_timeout() {
        // el hijo sale enseguida pero un nieto en segundo plano retiene stdout
        assert_times_out_quickly("sleep 10 & echo started");
    }

    #[test]
    fn reader_errors_are_surfaced() {
        let (tx, rx) = mpsc::channel();
        tx.send(Err(io::Error::new(ErrorKind::BrokenPipe, "pipe closed"))).unwrap();
        assert_eq!(collect(&rx, None).unwrap_err().kind(), ErrorKind::BrokenPipe);

        let (tx, rx) = mpsc::channel::<io::Result<String>>();
        drop(tx);
        assert!(collect(&rx, None).is_err());
        assert!(collect(&rx, Some(Instant::now() + Duration::from_millis(10))).is_err());
    }

    #[test]
    fn reader_still_open_at_deadline_yields_none() {
        let (_tx, rx) = mpsc::channel::<io::Result<String>>();
        let deadline = Instant::now() + Duration::from_millis(20);
        assert!(collect(&rx, Some(deadline)).unwrap().is_none());
    }

    #[test]
    fn fast_command_within_timeout_returns_output() {
        let inv = SystemCommandInvoker::new().with_timeout(Some(Duration::from_secs(5)));
        let out = inv.execute(&sh("echo ok; echo warn >&2; exit 2")).unwrap();
        assert_eq!(out.stdout.trim(), "ok");
        assert_eq!(out.stderr.trim(), "warn");
        assert_eq!(out.exit_code, 2);
    }

    #[test]
    fn zero_timeout_means_unbounded() {
        let inv = SystemCommandInvoker::new().with_timeout(Some(Duration::ZERO));
        assert_eq!(inv.execute(&sh("exit 0")).unwrap().exit_code, 0);
    }
}
