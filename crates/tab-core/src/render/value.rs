//! Valores ya resueltos que recibe una función de transformación.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::model::TabOutput;

/// Parámetros resueltos de un step: nombre -> valor (más los secretos).
pub type RenderParams = IndexMap<String, RenderValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RenderValue {
    /// Referencia a un tab que ya no existe.
    Null,
    Scalar(Value),
    Tab(TabOutput),
    List(Vec<RenderValue>),
    Dict(IndexMap<String, RenderValue>),
}

impl RenderValue {
    pub fn string(s: impl Into<String>) -> Self {
        RenderValue::Scalar(Value::String(s.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RenderValue::Null | RenderValue::Scalar(Value::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RenderValue::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RenderValue::Scalar(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_tab(&self) -> Option<&TabOutput> {
        match self {
            RenderValue::Tab(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RenderValue]> {
        match self {
            RenderValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&IndexMap<String, RenderValue>> {
        match self {
            RenderValue::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&RenderValue> {
        self.as_dict().and_then(|m| m.get(key))
    }

    /// Entradas no vacías de un valor multicolumn (`"A,B"` -> `["A", "B"]`).
    pub fn colnames(&self) -> Vec<&str> {
        self.as_str()
            .map(|s| s.split(',').filter(|c| !c.is_empty()).collect())
            .unwrap_or_default()
    }
}
