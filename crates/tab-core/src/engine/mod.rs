//! Driver de render: recorre tabs y steps en orden, mantiene el registro de
//! shapes de la pasada y decide cuándo reutilizar un resultado cacheado.

pub mod builder;
pub mod driver;
pub mod graph;
mod pass;
pub mod report;
pub mod settings;
pub mod state;

pub use builder::RenderDriverBuilder;
pub use driver::RenderDriver;
pub use graph::TabDependencyGraph;
pub use report::{RenderReport, StepReport, TabReport};
pub use settings::RenderSettings;
pub use state::RenderState;
