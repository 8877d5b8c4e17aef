//! TabFlow Rust Library
//!
//! Capa de aplicación sobre `tab-core` y `tab-adapters`:
//! - `config`: configuración desde variables de entorno (.env).
//! - `errors`: errores de la aplicación.
//! - `document`: lectura y validación de documentos de workflow (JSON).
//! - `commands`: `render` y `explain`, usados por el binario `tabflow`.
//! - `logging`: inicialización del subscriber de logs.

pub mod commands;
pub mod config;
pub mod document;
pub mod errors;
pub mod logging;
