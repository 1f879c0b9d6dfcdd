//! Modelos neutrales (Artifact, ArtifactTable, ExecutionContext,...)

pub mod artifact;
pub mod context;
pub mod macros;
pub mod table;
pub mod typed_artifact;

pub use artifact::{Artifact, ArtifactKind};
pub use context::ExecutionContext;
pub use table::ArtifactTable;
pub use typed_artifact::{ArtifactCodecError, ArtifactSpec};
