//! `WorkflowStore` en memoria (DashMap), para tests, CLI y demo.
//!
//! Las ediciones (`update_workflow`, `delete_tab`, `set_step_params`) NO
//! toman el lock del workflow: se comportan como un escritor externo, y cada
//! una incrementa la revisión para que una pasada en curso quede obsoleta.

use std::time::Duration;

use dashmap::DashMap;
use log::debug;
use serde_json::Value;
use uuid::Uuid;

use super::{CachedRenderResult, StoreError, WorkflowLockGuard, WorkflowLocks, WorkflowStore};
use crate::model::{Tab, Workflow};

#[derive(Debug, Default)]
pub struct InMemoryWorkflowStore {
    workflows: DashMap<Uuid, Workflow>,
    results: DashMap<(Uuid, String), CachedRenderResult>,
    locks: WorkflowLocks,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega (o reemplaza) un workflow. Los resultados previos se descartan.
    pub fn insert_workflow(&self, workflow: Workflow) -> Uuid {
        let id = workflow.id;
        self.results.retain(|(wf, _), _| *wf != id);
        self.workflows.insert(id, workflow);
        id
    }

    pub fn workflow(&self, workflow_id: Uuid) -> Option<Workflow> {
        self.workflows.get(&workflow_id).map(|w| w.clone())
    }

    /// Aplica una edición y sube la revisión.
    pub fn update_workflow<F>(&self, workflow_id: Uuid, edit: F) -> Result<u64, StoreError>
        where F: FnOnce(&mut Workflow)
    {
        let mut wf = self.workflows.get_mut(&workflow_id).ok_or(StoreError::WorkflowNotFound(workflow_id))?;
        edit(wf.value_mut());
        wf.revision += 1;
        debug!("workflow edited id={workflow_id} revision={}", wf.revision);
        Ok(wf.revision)
    }

    pub fn delete_tab(&self, workflow_id: Uuid, tab_slug: &str) -> Result<u64, StoreError> {
        self.update_workflow(workflow_id, |wf| wf.tabs.retain(|t| t.slug != tab_slug))
    }

    /// Reemplaza los parámetros de un step. Devuelve `Ok(None)` si el step no
    /// existe (y no toca la revisión).
    pub fn set_step_params(&self, workflow_id: Uuid, step_slug: &str, params: Value) -> Result<Option<u64>, StoreError> {
        let exists = self.workflow(workflow_id)
                         .ok_or(StoreError::WorkflowNotFound(workflow_id))?
                         .tabs
                         .iter()
                         .any(|t| t.steps.iter().any(|s| s.slug == step_slug));
        if !exists {
            return Ok(None);
        }
        self.update_workflow(workflow_id, |wf| {
                if let Some(step) = wf.step_mut(step_slug) {
                    step.params = params;
                }
            })
            .map(Some)
    }

    pub fn locks(&self) -> &WorkflowLocks {
        &self.locks
    }
}

impl WorkflowStore for InMemoryWorkflowStore {
    fn acquire_workflow_lock(&self, workflow_id: Uuid, timeout: Option<Duration>) -> Result<WorkflowLockGuard, StoreError> {
        if !self.workflows.contains_key(&workflow_id) {
            return Err(StoreError::WorkflowNotFound(workflow_id));
        }
        self.locks.acquire(workflow_id, timeout)
    }

    fn workflow_revision(&self, workflow_id: Uuid) -> Result<u64, StoreError> {
        self.workflows.get(&workflow_id).map(|w| w.revision).ok_or(StoreError::WorkflowNotFound(workflow_id))
    }

    fn get_tab_slugs(&self, workflow_id: Uuid) -> Result<Vec<String>, StoreError> {
        self.workflows.get(&workflow_id).map(|w| w.tab_slugs()).ok_or(StoreError::WorkflowNotFound(workflow_id))
    }

    fn get_tab(&self, workflow_id: Uuid, tab_slug: &str) -> Result<Option<Tab>, StoreError> {
        self.workflows
            .get(&workflow_id)
            .map(|w| w.tab(tab_slug).cloned())
            .ok_or(StoreError::WorkflowNotFound(workflow_id))
    }

    fn get_step_cached_result(&self, workflow_id: Uuid, step_slug: &str) -> Result<Option<CachedRenderResult>, StoreError> {
        Ok(self.results.get(&(workflow_id, step_slug.to_string())).map(|r| r.clone()))
    }

    fn commit_render(&self,
                     workflow_id: Uuid,
                     expected_revision: u64,
                     results: Vec<(String, CachedRenderResult)>)
                     -> Result<(), StoreError> {
        // Se mantiene la entrada del workflow durante el commit para que una
        // edición concurrente no se intercale entre el chequeo y la escritura.
        let wf = self.workflows.get(&workflow_id).ok_or(StoreError::WorkflowNotFound(workflow_id))?;
        if wf.revision != expected_revision {
            return Err(StoreError::RevisionMismatch { expected: expected_revision,
                                                      found: wf.revision });
        }
        let count = results.len();
        for (step_slug, result) in results {
            self.results.insert((workflow_id, step_slug), result);
        }
        drop(wf);
        debug!("render committed id={workflow_id} revision={expected_revision} steps={count}");
        Ok(())
    }
}
