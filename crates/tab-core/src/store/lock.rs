//! Tabla de locks exclusivos por workflow.
//!
//! Un `WorkflowLockGuard` representa la posesión del lock; soltarlo (drop)
//! libera el workflow y despierta a quien espera.

use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use log::debug;
use uuid::Uuid;

use super::StoreError;

#[derive(Debug, Default)]
struct LockTable {
    held: Mutex<HashSet<Uuid>>,
    released: Condvar,
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowLocks {
    table: Arc<LockTable>,
}

impl WorkflowLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bloquea hasta obtener el lock de `workflow_id` o agotar `timeout`.
    pub fn acquire(&self, workflow_id: Uuid, timeout: Option<Duration>) -> Result<WorkflowLockGuard, StoreError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut held = self.table.held.lock().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        while held.contains(&workflow_id) {
            held = match deadline {
                None => self.table.released.wait(held).map_err(|e| StoreError::Unavailable(e.to_string()))?,
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(StoreError::LockTimeout(workflow_id));
                    }
                    let (guard, _) = self.table
                                         .released
                                         .wait_timeout(held, deadline - now)
                                         .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                    guard
                }
            };
        }
        held.insert(workflow_id);
        debug!("workflow lock acquired id={workflow_id}");
        Ok(WorkflowLockGuard { workflow_id,
                               table: Arc::clone(&self.table) })
    }

    pub fn is_locked(&self, workflow_id: Uuid) -> bool {
        self.table.held.lock().map(|h| h.contains(&workflow_id)).unwrap_or(false)
    }
}

/// Posesión del lock de un workflow. Sólo se obtiene vía `WorkflowLocks`.
#[derive(Debug)]
pub struct WorkflowLockGuard {
    workflow_id: Uuid,
    table: Arc<LockTable>,
}

impl WorkflowLockGuard {
    pub fn workflow_id(&self) -> Uuid {
        self.workflow_id
    }
}

impl Drop for WorkflowLockGuard {
    fn drop(&mut self) {
        // un mutex envenenado sigue sirviendo para liberar
        let mut held = match self.table.held.lock() {
            Ok(h) => h,
            Err(poisoned) => poisoned.into_inner(),
        };
        held.remove(&self.workflow_id);
        drop(held);
        self.table.released.notify_all();
        debug!("workflow lock released id={}", self.workflow_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_times_out_while_held() {
        let locks = WorkflowLocks::new();
        let id = Uuid::new_v4();
        let guard = locks.acquire(id, None).expect("first acquire");
        assert!(locks.is_locked(id));
        let err = locks.acquire(id, Some(Duration::from_millis(20))).unwrap_err();
        assert_eq!(err, StoreError::LockTimeout(id));
        // otro workflow no se ve afectado
        assert!(locks.acquire(Uuid::new_v4(), Some(Duration::ZERO)).is_ok());
        drop(guard);
        assert!(!locks.is_locked(id));
        assert!(locks.acquire(id, Some(Duration::ZERO)).is_ok());
    }
}
