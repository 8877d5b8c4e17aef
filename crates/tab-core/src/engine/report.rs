use indexmap::IndexMap;
use serde::Serialize;
use uuid::Uuid;

use super::RenderState;
use crate::model::{ResultShape, ResultStatus, TabShapes};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub slug: String,
    pub module: String,
    pub status: ResultStatus,
    /// `true` si se reutilizó un resultado cacheado.
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabReport {
    pub slug: String,
    pub name: String,
    pub state: RenderState,
    pub shape: ResultShape,
    pub steps: Vec<StepReport>,
}

impl TabReport {
    pub fn step(&self, slug: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.slug == slug)
    }
}

/// Resultado de una pasada confirmada.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderReport {
    pub workflow_id: Uuid,
    /// Número de la pasada que se confirmó (1 = sin reintentos).
    pub attempts: u32,
    pub tabs: IndexMap<String, TabReport>,
}

impl RenderReport {
    pub fn tab(&self, slug: &str) -> Option<&TabReport> {
        self.tabs.get(slug)
    }

    /// Registro de shapes final (todos los tabs con shape).
    pub fn tab_shapes(&self) -> TabShapes {
        self.tabs.iter().map(|(slug, t)| (slug.clone(), Some(t.shape.clone()))).collect()
    }

    pub fn step_count(&self) -> usize {
        self.tabs.values().map(|t| t.steps.len()).sum()
    }

    pub fn cached_step_count(&self) -> usize {
        self.tabs.values().flat_map(|t| t.steps.iter()).filter(|s| s.cached).count()
    }
}
