//! `concattabs`: agrega debajo del input las filas de otros tabs.
//!
//! Las columnas son la unión en orden de aparición; una columna presente con
//! tipos distintos es un error. Las celdas faltantes quedan en `null`.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use tab_core::dtype::ParamDType;
use tab_core::model::{ColumnShape, ColumnType, Table};
use tab_core::module::{ModuleError, RenderExtra, RenderModule};
use tab_core::render::{RenderParams, RenderValue};

use super::bool_param;

/// Nombre de la columna agregada con el nombre del tab de origen.
pub const SOURCE_COLUMN: &str = "Source Tab";

static SCHEMA: Lazy<ParamDType> =
    Lazy::new(|| ParamDType::dict([("tabs", ParamDType::list(ParamDType::Tab)), ("add_source_column", ParamDType::Primitive)]));

#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatTabs;

impl RenderModule for ConcatTabs {
    fn id(&self) -> &str {
        "concattabs"
    }

    fn param_schema(&self) -> &ParamDType {
        &SCHEMA
    }

    fn render(&self, table: Table, params: &RenderParams, extra: &RenderExtra) -> Result<Table, ModuleError> {
        // tabs borrados llegan como Null y se ignoran
        let others: Vec<_> = params.get("tabs")
                                   .and_then(RenderValue::as_list)
                                   .unwrap_or(&[])
                                   .iter()
                                   .filter_map(RenderValue::as_tab)
                                   .map(|t| (t.name.as_str(), &t.table))
                                   .collect();
        if others.is_empty() {
            return Ok(table);
        }
        let sources: Vec<(&str, &Table)> = std::iter::once((extra.tab_name.as_str(), &table)).chain(others).collect();

        let mut columns: IndexMap<String, ColumnType> = IndexMap::new();
        for (name, t) in &sources {
            for c in &t.columns {
                match columns.get(&c.name) {
                    Some(existing) if *existing != c.column_type => {
                        return Err(ModuleError::new(format!("column '{}' in tab '{name}' has a different type", c.name)));
                    }
                    Some(_) => {}
                    None => {
                        columns.insert(c.name.clone(), c.column_type);
                    }
                }
            }
        }
        let add_source = bool_param(params, "add_source_column", false);
        if add_source && columns.contains_key(SOURCE_COLUMN) {
            return Err(ModuleError::new(format!("column '{SOURCE_COLUMN}' already exists")));
        }

        let mut rows = Vec::new();
        for (name, t) in &sources {
            let positions: Vec<Option<usize>> = columns.keys().map(|c| t.column_index(c)).collect();
            for row in &t.rows {
                let mut out: Vec<Value> =
                    positions.iter().map(|p| p.and_then(|i| row.get(i).cloned()).unwrap_or_default()).collect();
                if add_source {
                    out.push(Value::String(name.to_string()));
                }
                rows.push(out);
            }
        }
        let mut shapes: Vec<ColumnShape> = columns.into_iter().map(|(n, t)| ColumnShape::new(n, t)).collect();
        if add_source {
            shapes.push(ColumnShape::text(SOURCE_COLUMN));
        }
        Ok(Table::new(shapes, rows))
    }
}
