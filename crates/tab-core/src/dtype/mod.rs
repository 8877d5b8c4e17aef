//! `ParamDType`: descripción cerrada y recursiva de la forma de los
//! parámetros de un módulo.
//!
//! Cada módulo declara un `Dict` raíz; los valores crudos guardados en el
//! step siguen esa estructura. El resolvedor (`render::clean_value`) hace un
//! `match` exhaustivo sobre estas variantes: una variante nueva obliga a
//! actualizarlo.
//!
//! Formato serializado (el mismo que usan los documentos de workflow):
//!
//! ```json
//! { "type": "dict", "properties": {
//!     "right_tab": { "type": "tab" },
//!     "on": { "type": "multicolumn", "tab_parameter": "right_tab" } } }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamDType {
    /// Escalar (string, número, bool, null). Se entrega tal cual.
    Primitive,
    /// Slug de otro tab; se resuelve a su output materializado.
    Tab,
    /// Nombre de una columna del input, o del tab indicado por
    /// `tab_parameter` (un parámetro `Tab` de la raíz).
    Column {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tab_parameter: Option<String>,
    },
    /// Nombres de columnas separados por coma. Misma regla que `Column`.
    Multicolumn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tab_parameter: Option<String>,
    },
    List { inner: Box<ParamDType> },
    Dict { properties: IndexMap<String, ParamDType> },
    /// Mapa de claves arbitrarias con un dtype uniforme para los valores.
    Map { value: Box<ParamDType> },
}

impl ParamDType {
    pub fn column() -> Self {
        ParamDType::Column { tab_parameter: None }
    }

    pub fn column_of(tab_parameter: impl Into<String>) -> Self {
        ParamDType::Column { tab_parameter: Some(tab_parameter.into()) }
    }

    pub fn multicolumn() -> Self {
        ParamDType::Multicolumn { tab_parameter: None }
    }

    pub fn multicolumn_of(tab_parameter: impl Into<String>) -> Self {
        ParamDType::Multicolumn { tab_parameter: Some(tab_parameter.into()) }
    }

    pub fn list(inner: ParamDType) -> Self {
        ParamDType::List { inner: Box::new(inner) }
    }

    pub fn map(value: ParamDType) -> Self {
        ParamDType::Map { value: Box::new(value) }
    }

    pub fn dict<K, I>(properties: I) -> Self
        where K: Into<String>,
              I: IntoIterator<Item = (K, ParamDType)>
    {
        ParamDType::Dict { properties: properties.into_iter().map(|(k, d)| (k.into(), d)).collect() }
    }

    /// Propiedades si es un `Dict`.
    pub fn properties(&self) -> Option<&IndexMap<String, ParamDType>> {
        match self {
            ParamDType::Dict { properties } => Some(properties),
            _ => None,
        }
    }

    /// Verifica que el dtype sirva como esquema raíz de un módulo: debe ser un
    /// `Dict` y todo `tab_parameter` (a cualquier profundidad) debe nombrar una
    /// propiedad raíz de tipo `Tab`.
    pub fn check_root(&self) -> Result<(), SchemaError> {
        let properties = self.properties().ok_or(SchemaError::RootNotDict)?;
        let mut missing = None;
        self.visit_tab_parameters(&mut |name: &str| {
                if missing.is_none() && !matches!(properties.get(name), Some(ParamDType::Tab)) {
                    missing = Some(name.to_string());
                }
            });
        match missing {
            Some(parameter) => Err(SchemaError::UnknownTabParameter(parameter)),
            None => Ok(()),
        }
    }

    fn visit_tab_parameters(&self, f: &mut dyn FnMut(&str)) {
        match self {
            ParamDType::Primitive | ParamDType::Tab => {}
            ParamDType::Column { tab_parameter } | ParamDType::Multicolumn { tab_parameter } => {
                if let Some(name) = tab_parameter {
                    f(name);
                }
            }
            ParamDType::List { inner } => inner.visit_tab_parameters(f),
            ParamDType::Dict { properties } => {
                for dtype in properties.values() {
                    dtype.visit_tab_parameters(f);
                }
            }
            ParamDType::Map { value } => value.visit_tab_parameters(f),
        }
    }

    /// Slugs (no vacíos) de todos los parámetros `Tab` presentes en `value`,
    /// en orden de aparición y sin repetir.
    ///
    /// Sólo mira los valores actuales; no consulta ningún registro de shapes.
    pub fn collect_tab_slugs(&self, value: &Value) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_into(value, &mut out);
        out
    }

    fn collect_into(&self, value: &Value, out: &mut Vec<String>) {
        match self {
            ParamDType::Tab => {
                if let Some(slug) = value.as_str().filter(|s| !s.is_empty()) {
                    if !out.iter().any(|s| s == slug) {
                        out.push(slug.to_string());
                    }
                }
            }
            ParamDType::Primitive | ParamDType::Column { .. } | ParamDType::Multicolumn { .. } => {}
            ParamDType::List { inner } => {
                for item in value.as_array().into_iter().flatten() {
                    inner.collect_into(item, out);
                }
            }
            ParamDType::Dict { properties } => {
                if let Some(map) = value.as_object() {
                    for (key, dtype) in properties {
                        if let Some(v) = map.get(key) {
                            dtype.collect_into(v, out);
                        }
                    }
                }
            }
            ParamDType::Map { value: value_dtype } => {
                for v in value.as_object().into_iter().flat_map(|m| m.values()) {
                    value_dtype.collect_into(v, out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("root parameter schema must be a dict")]
    RootNotDict,
    #[error("tab_parameter '{0}' does not name a root-level tab parameter")]
    UnknownTabParameter(String),
}
