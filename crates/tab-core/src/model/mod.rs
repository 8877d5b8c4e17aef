//! Modelos neutrales (shapes, tablas, workflow, fingerprint,...)

pub mod fingerprint;
pub mod shape;
pub mod tab_output;
pub mod table;
pub mod workflow;

pub use fingerprint::StepFingerprintInput;
pub use shape::{ColumnShape, ColumnType, ResultShape, ResultStatus, TabShapes};
pub use tab_output::TabOutput;
pub use table::Table;
pub use workflow::{Step, StepParams, Tab, Workflow};
