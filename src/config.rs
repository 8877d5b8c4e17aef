//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`CONFIG`).
//!
//! Variables:
//! - `TABFLOW_MAX_RENDER_ATTEMPTS`: pasadas máximas ante estado obsoleto
//!   (por defecto 3, mínimo 1).
//! - `TABFLOW_LOCK_TIMEOUT_MS`: espera máxima por el lock de un workflow (sin
//!   valor = sin límite).
//! - `TABFLOW_LOG`: filtro de logs (por defecto `info`).
use std::env;
use std::time::Duration;

use log::warn;
use once_cell::sync::Lazy;
use tab_core::engine::RenderSettings;

use crate::errors::CoreError;

pub const MAX_RENDER_ATTEMPTS_VAR: &str = "TABFLOW_MAX_RENDER_ATTEMPTS";
pub const LOCK_TIMEOUT_VAR: &str = "TABFLOW_LOCK_TIMEOUT_MS";
pub const LOG_VAR: &str = "TABFLOW_LOG";

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Parámetros del driver de render.
    pub render: RenderSettings,
    /// Filtro para el subscriber de logs (sintaxis `EnvFilter`).
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { render: RenderSettings::default(),
               log_filter: "info".to_string() }
    }
}

impl AppConfig {
    /// Lee `.env` (si existe) y las variables de entorno.
    pub fn from_env() -> Result<Self, CoreError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda;
    /// valores vacíos cuentan como ausentes.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
        where F: Fn(&str) -> Option<String>
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = AppConfig::default();

        if let Some(raw) = get(MAX_RENDER_ATTEMPTS_VAR) {
            let attempts: u32 = raw.parse()
                                   .map_err(|_| CoreError::Config(format!("{MAX_RENDER_ATTEMPTS_VAR} must be a positive integer, got '{raw}'")))?;
            if attempts == 0 {
                return Err(CoreError::Config(format!("{MAX_RENDER_ATTEMPTS_VAR} must be at least 1")));
            }
            cfg.render.max_attempts = attempts;
        }
        if let Some(raw) = get(LOCK_TIMEOUT_VAR) {
            let ms: u64 = raw.parse()
                             .map_err(|_| CoreError::Config(format!("{LOCK_TIMEOUT_VAR} must be milliseconds, got '{raw}'")))?;
            cfg.render.lock_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(filter) = get(LOG_VAR) {
            cfg.log_filter = filter;
        }
        Ok(cfg)
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez. Si el
/// entorno es inválido se usan los valores por defecto.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    AppConfig::from_env().unwrap_or_else(|e| {
                             warn!("{e}; using default configuration");
                             AppConfig::default()
                         })
});
