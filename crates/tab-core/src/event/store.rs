use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{RenderEvent, RenderEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con
    /// seq y ts).
    fn append_kind(&mut self, workflow_id: Uuid, kind: RenderEventKind) -> RenderEvent;
    /// Eventos de un workflow en orden ascendente de seq.
    fn list(&self, workflow_id: Uuid) -> Vec<RenderEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: HashMap<Uuid, Vec<RenderEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, workflow_id: Uuid, kind: RenderEventKind) -> RenderEvent {
        let events = self.inner.entry(workflow_id).or_default();
        let ev = RenderEvent { seq: events.len() as u64,
                               workflow_id,
                               kind,
                               ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, workflow_id: Uuid) -> Vec<RenderEvent> {
        self.inner.get(&workflow_id).cloned().unwrap_or_default()
    }
}
