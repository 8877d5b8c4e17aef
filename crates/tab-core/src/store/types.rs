use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{ColumnShape, ResultShape, ResultStatus};

/// Resultado persistido del render de un step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRenderResult {
    /// Fingerprint de los insumos que produjeron este resultado.
    pub fingerprint: String,
    pub status: ResultStatus,
    pub columns: Vec<ColumnShape>,
    #[serde(default)]
    pub message: Option<String>,
    /// Tabla serializada (ver `codec`). Vacío si `status != Ok`.
    pub table: Vec<u8>,
}

impl CachedRenderResult {
    pub fn status_is_ok(&self) -> bool {
        self.status == ResultStatus::Ok
    }

    pub fn shape(&self) -> ResultShape {
        ResultShape::with_status(self.status, self.columns.clone())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("workflow {0} not found")]
    WorkflowNotFound(Uuid),
    #[error("timed out waiting for lock on workflow {0}")]
    LockTimeout(Uuid),
    #[error("workflow revision changed: expected {expected}, found {found}")]
    RevisionMismatch { expected: u64, found: u64 },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
