//! Carga del output materializado de un tab referenciado.

use log::warn;
use uuid::Uuid;

use crate::errors::RenderError;
use crate::model::{ResultShape, TabOutput};
use crate::store::{decode_table, StagedResults, StoreError, WorkflowLockGuard, WorkflowStore};

/// Resuelve un slug (con shape ya validado como `ok`) a su `TabOutput`.
///
/// El llamador debe tener el lock del workflow durante toda la pasada.
pub trait TabOutputLoader {
    fn load(&self, slug: &str, validated_shape: &ResultShape) -> Result<TabOutput, RenderError>;
}

/// Cargador respaldado por un `WorkflowStore`.
///
/// Sólo se construye a partir de un `WorkflowLockGuard` vivo; los resultados
/// de la pasada en curso (`staged`) tienen prioridad sobre los del store.
pub struct StoreTabOutputLoader<'a, S: WorkflowStore + ?Sized> {
    store: &'a S,
    workflow_id: Uuid,
    staged: &'a StagedResults,
    _lock: &'a WorkflowLockGuard,
}

impl<'a, S: WorkflowStore + ?Sized> StoreTabOutputLoader<'a, S> {
    pub fn new(store: &'a S, lock: &'a WorkflowLockGuard, staged: &'a StagedResults) -> Self {
        Self { store,
               workflow_id: lock.workflow_id(),
               staged,
               _lock: lock }
    }
}

fn storage(e: StoreError) -> RenderError {
    RenderError::Storage(e.to_string())
}

impl<S: WorkflowStore + ?Sized> TabOutputLoader for StoreTabOutputLoader<'_, S> {
    fn load(&self, slug: &str, validated_shape: &ResultShape) -> Result<TabOutput, RenderError> {
        let tab = self.store
                      .get_tab(self.workflow_id, slug)
                      .map_err(storage)?
                      .ok_or_else(|| RenderError::StaleExecution(format!("tab '{slug}' was deleted during render")))?;
        // Un tab sin steps no tiene output, aunque su shape sea ok.
        let Some(last_step) = tab.last_step() else {
            return Err(RenderError::TabOutputUnreachable(slug.to_string()));
        };

        let cached = match self.staged.get(&last_step.slug) {
            Some(r) => r.clone(),
            None => self.store
                        .get_step_cached_result(self.workflow_id, &last_step.slug)
                        .map_err(storage)?
                        .ok_or_else(|| RenderError::StaleExecution(format!("tab '{slug}' has no cached result")))?,
        };
        if !cached.status_is_ok() || cached.columns != validated_shape.columns {
            warn!("cached result of tab '{slug}' does not match its validated shape");
            return Err(RenderError::StaleExecution(format!("cached result of tab '{slug}' changed")));
        }

        let table = decode_table(&cached.table).map_err(|e| {
                                                   RenderError::StaleExecution(format!("cached table of tab '{slug}' is unreadable: {e}"))
                                               })?;
        if table.columns != validated_shape.columns {
            return Err(RenderError::StaleExecution(format!("cached table of tab '{slug}' has different columns")));
        }
        Ok(TabOutput { slug: slug.to_string(),
                       name: tab.name,
                       columns: table.columns.clone(),
                       table })
    }
}
