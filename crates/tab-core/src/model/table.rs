//! Tabla materializada: columnas + filas de valores JSON.
//!
//! El core no interpreta los datos; sólo los transporta entre steps y los
//! entrega a las funciones de transformación.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ColumnShape, ResultShape};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<ColumnShape>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<ColumnShape>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Tabla sin columnas ni filas (input del primer step de un tab).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnShape> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Valores de una columna, en orden de filas.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.get(idx).unwrap_or(&Value::Null)).collect())
    }

    /// Shape `ok` con las columnas de la tabla.
    pub fn shape(&self) -> ResultShape {
        ResultShape::ok(self.columns.clone())
    }
}
