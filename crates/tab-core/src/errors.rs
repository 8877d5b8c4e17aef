//! Errores del motor de render.
//!
//! Dos niveles:
//! - `RenderError`: fallos al resolver los parámetros de un step. Salvo
//!   `StaleExecution`/`Storage`, son locales al step.
//! - `CoreEngineError`: fallos de una pasada completa, devueltos por el driver.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum RenderError {
    /// El tab referenciado todavía no tiene shape en esta pasada. Puede ser un
    /// ciclo real o una referencia hacia adelante: no se distinguen.
    #[error("tab '{0}' has not been rendered yet (tab cycle)")]
    TabCycle(String),
    /// El tab referenciado terminó en `error` o `unreachable`.
    #[error("tab '{0}' output is unreachable")]
    TabOutputUnreachable(String),
    /// El estado del workflow cambió durante la pasada; hay que descartarla.
    #[error("stale execution: {0}")]
    StaleExecution(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl RenderError {
    /// `true` si el error invalida la pasada entera (no sólo el step).
    pub fn is_pass_fatal(&self) -> bool {
        matches!(self, RenderError::StaleExecution(_) | RenderError::Storage(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreEngineError {
    #[error("workflow {0} not found")]
    WorkflowNotFound(Uuid),
    #[error("render pass still stale after {attempts} attempts")]
    StaleExecution { attempts: u32 },
    #[error("storage: {0}")]
    Storage(String),
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("internal: {0}")]
    Internal(String),
}
