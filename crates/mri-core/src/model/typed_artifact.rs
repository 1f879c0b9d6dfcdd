//! Tipado fuerte opcional para `Artifact` manteniendo el núcleo agnóstico.
//! Se basa en generics y serde; no introduce semántica de dominio.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{Artifact, ArtifactKind};

#[derive(Debug, Error)]
pub enum ArtifactCodecError {
    #[error("kind mismatch: expected {expected:?}, found {found:?}")]
    KindMismatch { expected: ArtifactKind, found: ArtifactKind },
    #[error("schema version mismatch: expected {expected}, found {found:?}")]
    VersionMismatch { expected: u32, found: Option<u32> },
    #[error("serde: {0}")]
    Serde(String),
}

/// Especificación de un artifact tipado.
pub trait ArtifactSpec: Sized + Serialize + DeserializeOwned + Clone {
    const KIND: ArtifactKind;
    /// Incrementar en cambios incompatibles del payload.
    const SCHEMA_VERSION: u32 = 1;

    /// Serializa a `Artifact` sin hash (lo añade el engine).
    fn into_artifact(self, role: &str) -> Result<Artifact, ArtifactCodecError> {
        let mut value = serde_json::to_value(&self).map_err(|e| ArtifactCodecError::Serde(e.to_string()))?;
        if let Value::Object(map) = &mut value {
            map.entry("schema_version".to_string()).or_insert(Value::from(Self::SCHEMA_VERSION));
        }
        Ok(Artifact::new_unhashed(role, Self::KIND, value, None))
    }

    /// Decodifica verificando kind y versión.
    fn from_artifact(a: &Artifact) -> Result<Self, ArtifactCodecError> {
        if a.kind != Self::KIND {
            return Err(ArtifactCodecError::KindMismatch { expected: Self::KIND, found: a.kind });
        }
        let found = a.payload
                     .get("schema_version")
                     .and_then(|v| v.as_u64())
                     .and_then(|v| u32::try_from(v).ok());
        if found != Some(Self::SCHEMA_VERSION) {
            return Err(ArtifactCodecError::VersionMismatch { expected: Self::SCHEMA_VERSION, found });
        }
        serde_json::from_value(a.payload.clone()).map_err(|e| ArtifactCodecError::Serde(e.to_string()))
    }
}
