//! Catálogo de módulos: cada módulo declara su esquema de parámetros y una
//! función de transformación `(tabla, params resueltos, extra) -> tabla`.
//!
//! El core trata a los módulos como opacos; sólo usa `param_schema()` para
//! resolver parámetros y `version()` para el fingerprint.

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use uuid::Uuid;

use crate::dtype::{ParamDType, SchemaError};
use crate::model::{ColumnShape, Table};
use crate::render::RenderParams;

/// Fallo de una transformación. Se muestra al usuario tal cual.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ModuleError(pub String);

impl ModuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Datos adicionales que recibe `render()`.
#[derive(Debug, Clone)]
pub struct RenderExtra {
    pub workflow_id: Uuid,
    pub tab_slug: String,
    pub tab_name: String,
    /// Columnas del input por nombre (en orden).
    pub input_columns: IndexMap<String, ColumnShape>,
}

pub trait RenderModule: Send + Sync + Debug {
    fn id(&self) -> &str;

    /// Entra al fingerprint: subirla invalida los resultados cacheados.
    fn version(&self) -> &str {
        "1"
    }

    /// Esquema raíz (siempre un `Dict`).
    fn param_schema(&self) -> &ParamDType;

    fn render(&self, table: Table, params: &RenderParams, extra: &RenderExtra) -> Result<Table, ModuleError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("module '{module}' has an invalid parameter schema: {source}")]
    InvalidSchema {
        module: String,
        #[source]
        source: SchemaError,
    },
    #[error("module '{0}' is already registered")]
    Duplicate(String),
}

#[derive(Debug, Default, Clone)]
pub struct ModuleCatalog {
    modules: IndexMap<String, Arc<dyn RenderModule>>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un módulo tras validar su esquema raíz.
    pub fn register(&mut self, module: Arc<dyn RenderModule>) -> Result<(), CatalogError> {
        let id = module.id().to_string();
        if self.modules.contains_key(&id) {
            return Err(CatalogError::Duplicate(id));
        }
        module.param_schema()
              .check_root()
              .map_err(|source| CatalogError::InvalidSchema { module: id.clone(),
                                                              source })?;
        self.modules.insert(id, module);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn RenderModule>> {
        self.modules.get(id).cloned()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
