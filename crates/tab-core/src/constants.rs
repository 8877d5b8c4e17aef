//! Constantes del motor de render.
//!
//! `ENGINE_VERSION` forma parte del input de cada fingerprint de step: un
//! cambio de versión invalida todos los resultados cacheados aunque los
//! parámetros y los datos no cambien.

/// Versión lógica del motor. Mantener estable mientras no haya cambios
/// incompatibles en la resolución de parámetros.
pub const ENGINE_VERSION: &str = "R1.0";

/// Marcador de fingerprint para un tab referenciado que no existe.
pub const TAB_ABSENT: &str = "absent";

/// Marcador de fingerprint para un tab que aún no terminó en esta pasada.
pub const TAB_PENDING: &str = "pending";

/// Marcador de fingerprint para un tab `ok` sin steps.
pub const TAB_EMPTY: &str = "empty";
