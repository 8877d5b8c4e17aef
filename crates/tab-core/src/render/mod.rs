//! Resolución de parámetros de render.
//!
//! `clean_value` recorre en paralelo el valor crudo y su `ParamDType`,
//! consultando el `RenderContext` de la pasada, y produce el valor que recibe
//! la función de transformación.

pub mod context;
pub mod loader;
pub mod resolve;
pub mod value;

pub use context::RenderContext;
pub use loader::{StoreTabOutputLoader, TabOutputLoader};
pub use resolve::{clean_value, get_param_values};
pub use value::{RenderParams, RenderValue};
