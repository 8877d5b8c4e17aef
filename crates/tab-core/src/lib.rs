//! tab-core: motor de render de parámetros y dependencias entre tabs.
//!
//! Un workflow es una lista de tabs; cada tab es una secuencia ordenada de
//! steps. Este crate resuelve, para cada step, los parámetros concretos que
//! recibe su función de transformación:
//! - `dtype`: esquema recursivo de parámetros (`ParamDType`).
//! - `model`: shapes de resultados, tablas, `TabOutput`, workflow.
//! - `render`: `RenderContext`, `clean_value` y el cargador de outputs de tab.
//! - `engine`: `RenderDriver`, que recorre tabs/steps y mantiene el registro
//!   de shapes de la pasada.
//! - `store`: contrato con el almacenamiento (lock por workflow, resultados
//!   cacheados) y una implementación en memoria.
//! - `event`: log append-only de eventos de render.
pub mod constants;
pub mod dtype;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod module;
pub mod render;
pub mod store;

pub use dtype::ParamDType;
pub use engine::{RenderDriver, RenderReport, RenderSettings, RenderState, StepReport, TabReport};
pub use errors::{CoreEngineError, RenderError};
pub use event::{EventStore, InMemoryEventStore, RenderEvent, RenderEventKind};
pub use model::{ColumnShape, ColumnType, ResultShape, ResultStatus, Step, Tab, TabOutput, TabShapes, Table, Workflow};
pub use module::{ModuleCatalog, ModuleError, RenderExtra, RenderModule};
pub use render::{clean_value, get_param_values, RenderContext, RenderParams, RenderValue, TabOutputLoader};
pub use store::{CachedRenderResult, InMemoryWorkflowStore, StoreError, WorkflowLockGuard, WorkflowStore};
