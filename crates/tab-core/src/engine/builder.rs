//! Builder para `RenderDriver`.
//!
//! ```ignore
//! let driver = RenderDriver::builder(store)
//!     .catalog(default_catalog()?)
//!     .settings(RenderSettings { max_attempts: 5, lock_timeout: None })
//!     .build();
//! ```

use super::{RenderDriver, RenderSettings};
use crate::event::{EventStore, InMemoryEventStore};
use crate::module::ModuleCatalog;
use crate::store::WorkflowStore;

#[derive(Debug)]
pub struct RenderDriverBuilder<S: WorkflowStore> {
    store: S,
    catalog: ModuleCatalog,
    settings: RenderSettings,
}

impl<S: WorkflowStore> RenderDriverBuilder<S> {
    pub fn new(store: S) -> Self {
        Self { store,
               catalog: ModuleCatalog::new(),
               settings: RenderSettings::default() }
    }

    pub fn catalog(mut self, catalog: ModuleCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Construye el driver con un `InMemoryEventStore`.
    pub fn build(self) -> RenderDriver<S, InMemoryEventStore> {
        self.build_with_events(InMemoryEventStore::default())
    }

    pub fn build_with_events<E: EventStore>(self, events: E) -> RenderDriver<S, E> {
        RenderDriver::new(self.store, events, self.catalog, self.settings)
    }
}
