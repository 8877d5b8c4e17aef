//! `sortcolumn`: orden estable por una columna. Los nulos van al final en
//! ambos sentidos.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use serde_json::Value;
use tab_core::dtype::ParamDType;
use tab_core::model::Table;
use tab_core::module::{ModuleError, RenderExtra, RenderModule};
use tab_core::render::RenderParams;

use super::{bool_param, str_param};

static SCHEMA: Lazy<ParamDType> =
    Lazy::new(|| ParamDType::dict([("column", ParamDType::column()), ("is_ascending", ParamDType::Primitive)]));

#[derive(Debug, Clone, Copy, Default)]
pub struct SortColumn;

impl RenderModule for SortColumn {
    fn id(&self) -> &str {
        "sortcolumn"
    }

    fn param_schema(&self) -> &ParamDType {
        &SCHEMA
    }

    fn render(&self, mut table: Table, params: &RenderParams, _extra: &RenderExtra) -> Result<Table, ModuleError> {
        let Some(idx) = table.column_index(str_param(params, "column")) else {
            return Ok(table);
        };
        let ascending = bool_param(params, "is_ascending", true);
        table.rows.sort_by(|a, b| {
                      let (x, y) = (a.get(idx).unwrap_or(&Value::Null), b.get(idx).unwrap_or(&Value::Null));
                      match (x.is_null(), y.is_null()) {
                          (true, true) => Ordering::Equal,
                          (true, false) => Ordering::Greater,
                          (false, true) => Ordering::Less,
                          (false, false) if ascending => compare(x, y),
                          (false, false) => compare(y, x),
                      }
                  });
        Ok(table)
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x.as_f64().unwrap_or(f64::NAN).partial_cmp(&y.as_f64().unwrap_or(f64::NAN)).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
