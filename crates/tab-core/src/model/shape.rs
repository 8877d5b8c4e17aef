//! Shapes de resultados: metadatos (estado + columnas) de un render, sin los
//! datos.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Datetime,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnShape {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnShape {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self { name: name.into(),
               column_type }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Error,
    Unreachable,
}

/// Estado + columnas del último render de un step o tab.
///
/// Invariante: si `status == Ok`, `columns` refleja exactamente ese render.
/// Para `Error`/`Unreachable` las columnas van vacías.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultShape {
    pub status: ResultStatus,
    pub columns: Vec<ColumnShape>,
}

impl ResultShape {
    pub fn ok(columns: Vec<ColumnShape>) -> Self {
        Self { status: ResultStatus::Ok,
               columns }
    }

    pub fn error() -> Self {
        Self { status: ResultStatus::Error,
               columns: Vec::new() }
    }

    pub fn unreachable() -> Self {
        Self { status: ResultStatus::Unreachable,
               columns: Vec::new() }
    }

    pub fn with_status(status: ResultStatus, columns: Vec<ColumnShape>) -> Self {
        match status {
            ResultStatus::Ok => Self::ok(columns),
            other => Self { status: other,
                            columns: Vec::new() },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResultStatus::Ok
    }

    /// Nombres de columnas, prestados del shape.
    pub fn column_names(&self) -> HashSet<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columnas indexadas por nombre (en orden).
    pub fn columns_by_name(&self) -> IndexMap<String, ColumnShape> {
        self.columns.iter().map(|c| (c.name.clone(), c.clone())).collect()
    }
}

/// Registro de shapes de la pasada: slug de tab -> shape, o `None` si el tab
/// todavía no terminó de renderizarse en esta pasada.
pub type TabShapes = IndexMap<String, Option<ResultShape>>;
