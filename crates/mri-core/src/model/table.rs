//! Tabla de artifacts indexada por rol.
//!
//! Conserva el orden de inserción (orden de ejecución de los steps). Un rol
//! repetido reemplaza al anterior en su posición original.

use indexmap::IndexMap;

use super::{Artifact, ArtifactSpec};
use crate::errors::CoreEngineError;

#[derive(Debug, Clone, Default)]
pub struct ArtifactTable {
    inner: IndexMap<String, Artifact>,
}

impl ArtifactTable {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, artifact: Artifact) -> Option<Artifact> {
        self.inner.insert(artifact.role.clone(), artifact)
    }

    pub fn get(&self, role: &str) -> Option<&Artifact> { self.inner.get(role) }

    /// Igual que `get` pero un rol ausente es `MissingArtifact`.
    pub fn require(&self, role: &str) -> Result<&Artifact, CoreEngineError> {
        self.inner.get(role).ok_or_else(|| CoreEngineError::MissingArtifact(role.to_string()))
    }

    /// Decodifica el artifact del rol como `T`.
    pub fn decode<T: ArtifactSpec>(&self, role: &str) -> Result<T, CoreEngineError> {
        let raw = self.require(role)?;
        T::from_artifact(raw).map_err(|e| CoreEngineError::Internal(format!("artifact '{role}': {e}")))
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> { self.inner.keys().map(String::as_str) }
}
