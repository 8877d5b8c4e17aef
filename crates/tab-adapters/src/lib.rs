//! tab-adapters: módulos de transformación concretos.
//!
//! El core sólo conoce `RenderModule` (esquema + `render`). Aquí viven los
//! módulos que usan los documentos de workflow:
//! - `pastecsv`: fuente (tabla desde texto CSV).
//! - `selectcolumns`, `sortcolumn`, `converttotext`, `renamecolumns`:
//!   transformaciones sobre el input del step.
//! - `jointab`, `concattabs`: combinan el input con el output de otros tabs
//!   (parámetros `Tab`).

pub mod catalog;
pub mod modules;

pub use catalog::default_catalog;
