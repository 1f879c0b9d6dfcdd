//! Parser de salidas numéricas de aridad fija.
//!
//! La salida se divide por espacios en blanco; la cantidad de tokens debe
//! coincidir exactamente con la aridad esperada. Sólo `parse_volume_tolerant`
//! admite desvíos, y los convierte en un registro en cero.

use log::{debug, warn};

use crate::stats::{FullStatistics, NumericField, VolumeStatistics};
use crate::DomainError;

/// Aridades conocidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// min, max, mean, voxels, volume, median, std
    Full,
    /// voxels, volume
    VolumeOnly,
}

impl Arity {
    pub const fn fields(self) -> usize {
        match self {
            Arity::Full => 7,
            Arity::VolumeOnly => 2,
        }
    }
}

/// Resultado de un parseo tolerante.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Exact(T),
    /// Salida vacía o incompleta reemplazada por el valor por defecto.
    Defaulted { value: T, found: usize },
}

impl<T> Parsed<T> {
    pub fn into_inner(self) -> T {
        match self {
            Parsed::Exact(v) | Parsed::Defaulted { value: v, .. } => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Parsed::Defaulted { .. })
    }
}

/// Divide `raw` y exige exactamente `expected` tokens numéricos.
pub fn parse_fields(raw: &str, expected: usize) -> Result<Vec<NumericField>, DomainError> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() != expected {
        return Err(DomainError::FieldCount { expected,
                                             found: tokens.len(),
                                             raw: raw.trim().to_string() });
    }
    tokens.into_iter().map(NumericField::parse).collect()
}

pub fn parse_full(raw: &str) -> Result<FullStatistics, DomainError> {
    let [min, max, mean, voxels, volume, median, std_dev] = fixed::<{ Arity::Full.fields() }>(raw)?;
    let stats = FullStatistics { min, max, mean, voxels, volume, median, std_dev };
    debug!("full statistics parsed: {stats:?}");
    Ok(stats)
}

pub fn parse_volume(raw: &str) -> Result<VolumeStatistics, DomainError> {
    let [voxels, volume] = fixed::<{ Arity::VolumeOnly.fields() }>(raw)?;
    Ok(VolumeStatistics { voxels, volume })
}

fn fixed<const N: usize>(raw: &str) -> Result<[NumericField; N], DomainError> {
    parse_fields(raw, N)?.try_into().map_err(|v: Vec<NumericField>| DomainError::FieldCount { expected: N,
                                                                                             found: v.len(),
                                                                                             raw: raw.trim().to_string() })
}

/// Igual que `parse_volume`, pero una cantidad de tokens distinta de 2
/// (máscara vacía) produce `VolumeStatistics::zero()` en lugar de error.
/// Un token no numérico sigue siendo error.
pub fn parse_volume_tolerant(raw: &str) -> Result<Parsed<VolumeStatistics>, DomainError> {
    match parse_volume(raw) {
        Ok(v) => Ok(Parsed::Exact(v)),
        Err(DomainError::FieldCount { found, raw, .. }) => {
            warn!("volume statistics with {found} field(s) ({raw:?}); defaulting to zero");
            Ok(Parsed::Defaulted { value: VolumeStatistics::zero(), found })
        }
        Err(e) => Err(e),
    }
}
