//! Implementaciones de `RenderModule` y utilidades compartidas para leer
//! parámetros resueltos.

mod concattabs;
mod converttotext;
mod jointab;
mod pastecsv;
mod renamecolumns;
mod selectcolumns;
mod sortcolumn;

pub use concattabs::ConcatTabs;
pub use converttotext::ConvertToText;
pub use jointab::JoinTab;
pub use pastecsv::PasteCsv;
pub use renamecolumns::RenameColumns;
pub use selectcolumns::SelectColumns;
pub use sortcolumn::SortColumn;

use serde_json::{Number, Value};
use tab_core::render::{RenderParams, RenderValue};

/// Parámetro string; `""` si falta o no es string.
pub(crate) fn str_param<'a>(params: &'a RenderParams, key: &str) -> &'a str {
    params.get(key).and_then(RenderValue::as_str).unwrap_or("")
}

pub(crate) fn bool_param(params: &RenderParams, key: &str, default: bool) -> bool {
    params.get(key).and_then(RenderValue::as_bool).unwrap_or(default)
}

/// Nombres de un parámetro multicolumn (`"A,B"`), sin entradas vacías.
pub(crate) fn colnames_param<'a>(params: &'a RenderParams, key: &str) -> Vec<&'a str> {
    params.get(key).map(RenderValue::colnames).unwrap_or_default()
}

/// Texto de un número: enteros sin decimales.
pub(crate) fn number_to_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Texto de una celda, `None` para celdas nulas.
pub(crate) fn cell_to_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_to_text(n)),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::Value;
    use tab_core::model::{ColumnShape, Table};
    use tab_core::module::RenderExtra;
    use tab_core::render::{RenderParams, RenderValue};
    use uuid::Uuid;

    pub fn params(entries: &[(&str, RenderValue)]) -> RenderParams {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    pub fn scalar(v: Value) -> RenderValue {
        RenderValue::Scalar(v)
    }

    pub fn extra_for(table: &Table) -> RenderExtra {
        RenderExtra { workflow_id: Uuid::nil(),
                      tab_slug: "tab-1".into(),
                      tab_name: "Tab 1".into(),
                      input_columns: table.shape().columns_by_name() }
    }

    pub fn names(table: &Table) -> Vec<&str> {
        table.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn text_table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::new(columns.iter().map(|c| ColumnShape::text(*c)).collect(), rows)
    }
}
