//! Constantes del motor core.
//!
//! `ENGINE_VERSION` forma parte del input de los fingerprints: cambiarla
//! invalida los fingerprints de steps y flujos aunque la definición y los
//! datos no cambien.

/// Versión lógica del motor. Mantener estable mientras no haya cambios
/// incompatibles en el orden de eventos o en el cálculo de fingerprints.
pub const ENGINE_VERSION: &str = "M1.0";

/// Código de salida reservado para una etapa que excede su timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;
