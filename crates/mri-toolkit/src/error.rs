use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("command `{command}` exited with code {exit_code}")]
    NonZeroExit { command: String, exit_code: i32, stderr: String },
    #[error("command `{command}` exceeded {seconds}s and was killed")]
    Timeout { command: String, seconds: u64 },
    #[error("failed to spawn `{command}`: {source}")]
    Spawn { command: String, source: std::io::Error },
    #[error("io error while running `{command}`: {source}")]
    Io { command: String, source: std::io::Error },
}
