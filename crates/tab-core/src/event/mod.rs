//! Log append-only de eventos de render.

pub mod store;
pub mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{RenderEvent, RenderEventKind};
