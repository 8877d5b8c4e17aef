use serde::Serialize;

use super::{ColumnShape, Table};

/// Output materializado de un parámetro `Tab`.
///
/// Cada resolución carga su propia copia de la tabla: dos resoluciones nunca
/// comparten una tabla mutable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabOutput {
    pub slug: String,
    pub name: String,
    pub columns: Vec<ColumnShape>,
    pub table: Table,
}
