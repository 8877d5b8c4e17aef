use std::time::Duration;

/// Parámetros de ejecución del driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    /// Pasadas como máximo ante `StaleExecution` (incluye la primera).
    pub max_attempts: u32,
    /// Espera máxima por el lock del workflow; `None` = sin límite.
    pub lock_timeout: Option<Duration>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { max_attempts: 3,
               lock_timeout: None }
    }
}
