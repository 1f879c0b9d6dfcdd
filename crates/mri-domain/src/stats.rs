//! Registros estadísticos parseados desde la salida de `fslstats`.
//!
//! Los campos conservan el token literal de la herramienta: el reporte los
//! reproduce tal cual ("400.0" sigue siendo "400.0").

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// Token numérico: texto literal + valor parseado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericField {
    pub raw: String,
    pub value: f64,
}

impl NumericField {
    pub fn parse(token: &str) -> Result<Self, DomainError> {
        let value = token.parse::<f64>().map_err(|_| DomainError::NotNumeric(token.to_string()))?;
        Ok(Self { raw: token.to_string(), value })
    }

    pub fn zero() -> Self {
        Self { raw: "0".to_string(), value: 0.0 }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// `fslstats -R -M -V -P 50 -S`: min, max, media, vóxeles, volumen, mediana, desviación.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullStatistics {
    pub min: NumericField,
    pub max: NumericField,
    pub mean: NumericField,
    pub voxels: NumericField,
    pub volume: NumericField,
    pub median: NumericField,
    pub std_dev: NumericField,
}

/// `fslstats -V`: vóxeles y volumen (mm³).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeStatistics {
    pub voxels: NumericField,
    pub volume: NumericField,
}

impl VolumeStatistics {
    /// Registro por defecto para una máscara vacía.
    pub fn zero() -> Self {
        Self { voxels: NumericField::zero(), volume: NumericField::zero() }
    }
}
