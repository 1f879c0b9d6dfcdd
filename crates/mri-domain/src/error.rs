use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("expected {expected} fields, found {found}: {raw:?}")]
    FieldCount { expected: usize, found: usize, raw: String },
    #[error("not a number: {0:?}")]
    NotNumeric(String),
    #[error("io error on {path}: {source}")]
    Io { path: String, source: std::io::Error },
}
