//! Artifact neutral del flujo.
//!
//! Un `Artifact` es la unidad de datos intercambiada entre steps:
//! - `role` es el nombre estable con el que los steps posteriores lo buscan
//!   en la `ArtifactTable` ("brain_volume", "csf_stats", ...).
//! - `payload` es JSON genérico; el motor no interpreta su semántica. Para
//!   volúmenes sólo contiene la ruta: el archivo pertenece a la herramienta
//!   externa que lo creó.
//! - `hash` lo calcula el engine sobre el JSON canonicalizado.
//! - `metadata` permite anotar información auxiliar que no entra al hash.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tipos de artifact que circulan por el pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Ruta a un volumen (o matriz) creado como efecto lateral de una herramienta.
    FilePath,
    /// Registro numérico parseado desde la salida de una herramienta.
    Statistics,
    /// Reporte final persistido.
    Report,
    /// JSON genérico sin semántica.
    GenericJson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub role: String,
    pub kind: ArtifactKind,
    pub hash: String,            // asignado por el engine
    pub payload: Value,
    pub metadata: Option<Value>, // no entra al hash
}

impl Artifact {
    /// Constructor sin hash; preferir `ArtifactSpec::into_artifact`.
    pub fn new_unhashed(role: impl Into<String>, kind: ArtifactKind, payload: Value, metadata: Option<Value>) -> Self {
        Self { role: role.into(),
               kind,
               hash: String::new(),
               payload,
               metadata }
    }
}
