//! Inicialización de logs para el binario.
//!
//! Las librerías registran con `log`; el subscriber de `tracing-subscriber`
//! reenvía esos registros (puente `tracing-log`) a stderr.
use tracing_subscriber::EnvFilter;

use crate::errors::CoreError;

/// Instala el subscriber global con el filtro dado (p.ej. `info` o
/// `tab_core=debug`). Falla si el filtro no es válido o si ya había uno.
pub fn init(filter: &str) -> Result<(), CoreError> {
    let filter = EnvFilter::try_new(filter).map_err(|e| CoreError::Config(format!("invalid log filter '{filter}': {e}")))?;
    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_writer(std::io::stderr)
                             .try_init()
                             .map_err(|e| CoreError::Internal(e.to_string()))
}
