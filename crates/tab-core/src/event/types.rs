//! Tipos de evento de render y estructura `RenderEvent`.
//!
//! Cada pasada del `RenderDriver` emite eventos a un `EventStore`. Una pasada
//! abortada deja su rastro (`PassStarted` ... `PassAborted`) pero nunca un
//! `PassCompleted`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ResultStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderEventKind {
    /// Inicio de una pasada con el lock ya tomado.
    PassStarted { attempt: u32, revision: u64, tab_count: usize },
    TabStarted { tab_slug: String },
    /// Step terminado con `ok`. `cached = true` si se reutilizó el resultado.
    StepRendered {
        tab_slug: String,
        step_slug: String,
        fingerprint: String,
        cached: bool,
    },
    /// Step terminado en `error` o `unreachable`.
    StepFailed {
        tab_slug: String,
        step_slug: String,
        status: ResultStatus,
        message: Option<String>,
    },
    TabFinished { tab_slug: String, status: ResultStatus },
    /// La pasada se descartó (estado obsoleto); no se confirmó nada.
    PassAborted { attempt: u32, reason: String },
    PassCompleted { attempt: u32, committed_steps: usize },
}

impl RenderEventKind {
    /// Abreviatura de una letra, útil para asserts compactos en tests.
    pub fn letter(&self) -> char {
        match self {
            RenderEventKind::PassStarted { .. } => 'P',
            RenderEventKind::TabStarted { .. } => 'T',
            RenderEventKind::StepRendered { .. } => 'S',
            RenderEventKind::StepFailed { .. } => 'F',
            RenderEventKind::TabFinished { .. } => 't',
            RenderEventKind::PassAborted { .. } => 'A',
            RenderEventKind::PassCompleted { .. } => 'C',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub workflow_id: Uuid,
    pub kind: RenderEventKind,
    pub ts: DateTime<Utc>,
}
