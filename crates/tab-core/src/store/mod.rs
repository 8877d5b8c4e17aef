//! Contrato con el almacenamiento (colaborador ORM) y una implementación en
//! memoria.
//!
//! El driver sólo habla con `WorkflowStore`:
//! - lock exclusivo por workflow (`acquire_workflow_lock`), tomado durante la
//!   pasada completa;
//! - lectura de tabs y de resultados cacheados por step;
//! - commit atómico de los resultados de una pasada, condicionado a la
//!   revisión observada al comenzarla.

pub mod codec;
pub mod lock;
pub mod memory;
pub mod staged;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::model::Tab;

pub use codec::{decode_table, encode_table};
pub use lock::{WorkflowLockGuard, WorkflowLocks};
pub use memory::InMemoryWorkflowStore;
pub use staged::StagedResults;
pub use types::{CachedRenderResult, StoreError};

pub trait WorkflowStore: Send + Sync {
    /// Bloquea el workflow hasta que se suelte el guard. `timeout = None`
    /// espera indefinidamente.
    fn acquire_workflow_lock(&self, workflow_id: Uuid, timeout: Option<Duration>) -> Result<WorkflowLockGuard, StoreError>;

    fn workflow_revision(&self, workflow_id: Uuid) -> Result<u64, StoreError>;

    /// Slugs de los tabs en orden de declaración.
    fn get_tab_slugs(&self, workflow_id: Uuid) -> Result<Vec<String>, StoreError>;

    /// `Ok(None)` si el tab no existe (p.ej. fue borrado).
    fn get_tab(&self, workflow_id: Uuid, tab_slug: &str) -> Result<Option<Tab>, StoreError>;

    /// Resultado cacheado del último step del tab, si existe.
    fn get_cached_result(&self, workflow_id: Uuid, tab_slug: &str) -> Result<Option<CachedRenderResult>, StoreError> {
        let Some(tab) = self.get_tab(workflow_id, tab_slug)? else {
            return Ok(None);
        };
        match tab.last_step() {
            Some(step) => self.get_step_cached_result(workflow_id, &step.slug),
            None => Ok(None),
        }
    }

    fn get_step_cached_result(&self, workflow_id: Uuid, step_slug: &str) -> Result<Option<CachedRenderResult>, StoreError>;

    /// Persiste los resultados de una pasada. Falla con `RevisionMismatch` si
    /// el workflow cambió desde `expected_revision`; en ese caso no escribe
    /// nada.
    fn commit_render(&self,
                     workflow_id: Uuid,
                     expected_revision: u64,
                     results: Vec<(String, CachedRenderResult)>)
                     -> Result<(), StoreError>;
}

impl<T: WorkflowStore + ?Sized> WorkflowStore for Arc<T> {
    fn acquire_workflow_lock(&self, workflow_id: Uuid, timeout: Option<Duration>) -> Result<WorkflowLockGuard, StoreError> {
        (**self).acquire_workflow_lock(workflow_id, timeout)
    }

    fn workflow_revision(&self, workflow_id: Uuid) -> Result<u64, StoreError> {
        (**self).workflow_revision(workflow_id)
    }

    fn get_tab_slugs(&self, workflow_id: Uuid) -> Result<Vec<String>, StoreError> {
        (**self).get_tab_slugs(workflow_id)
    }

    fn get_tab(&self, workflow_id: Uuid, tab_slug: &str) -> Result<Option<Tab>, StoreError> {
        (**self).get_tab(workflow_id, tab_slug)
    }

    fn get_cached_result(&self, workflow_id: Uuid, tab_slug: &str) -> Result<Option<CachedRenderResult>, StoreError> {
        (**self).get_cached_result(workflow_id, tab_slug)
    }

    fn get_step_cached_result(&self, workflow_id: Uuid, step_slug: &str) -> Result<Option<CachedRenderResult>, StoreError> {
        (**self).get_step_cached_result(workflow_id, step_slug)
    }

    fn commit_render(&self,
                     workflow_id: Uuid,
                     expected_revision: u64,
                     results: Vec<(String, CachedRenderResult)>)
                     -> Result<(), StoreError> {
        (**self).commit_render(workflow_id, expected_revision, results)
    }
}
