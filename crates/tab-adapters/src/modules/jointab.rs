//! `jointab`: join del input con el output de otro tab.
//!
//! - `right_tab`: tab a unir (sin elegir -> la tabla no cambia).
//! - `join_columns.on`: columnas clave (del input; deben existir también en
//!   el tab derecho).
//! - `join_columns.right`: columnas a importar, relativas al tab derecho.
//! - `type`: `"left"` (por defecto) o `"inner"`.

use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use serde_json::Value;
use tab_core::dtype::ParamDType;
use tab_core::model::Table;
use tab_core::module::{ModuleError, RenderExtra, RenderModule};
use tab_core::render::{RenderParams, RenderValue};

use super::str_param;

static SCHEMA: Lazy<ParamDType> = Lazy::new(|| {
    ParamDType::dict([("right_tab", ParamDType::Tab),
                      ("join_columns",
                       ParamDType::dict([("on", ParamDType::multicolumn()),
                                         ("right", ParamDType::multicolumn_of("right_tab"))])),
                      ("type", ParamDType::Primitive)])
});

#[derive(Debug, Clone, Copy, Default)]
pub struct JoinTab;

impl RenderModule for JoinTab {
    fn id(&self) -> &str {
        "jointab"
    }

    fn param_schema(&self) -> &ParamDType {
        &SCHEMA
    }

    fn render(&self, table: Table, params: &RenderParams, extra: &RenderExtra) -> Result<Table, ModuleError> {
        let Some(right) = params.get("right_tab").and_then(RenderValue::as_tab) else {
            return Ok(table);
        };
        let join_columns = params.get("join_columns");
        let on: Vec<&str> = join_columns.and_then(|j| j.get("on")).map(RenderValue::colnames).unwrap_or_default();
        let import: Vec<&str> = join_columns.and_then(|j| j.get("right")).map(RenderValue::colnames).unwrap_or_default();
        if on.is_empty() {
            return Err(ModuleError::new("select at least one key column"));
        }
        let inner = match str_param(params, "type") {
            "" | "left" => false,
            "inner" => true,
            other => return Err(ModuleError::new(format!("unknown join type '{other}'"))),
        };

        let right_keys = on.iter()
                           .map(|c| {
                               right.table
                                    .column_index(c)
                                    .ok_or_else(|| ModuleError::new(format!("key column '{c}' is not in tab '{}'", right.name)))
                           })
                           .collect::<Result<Vec<_>, _>>()?;
        let left_keys: Vec<usize> = on.iter().filter_map(|c| table.column_index(c)).collect();
        let import: Vec<&str> = import.into_iter().filter(|c| !on.contains(c)).collect();
        if let Some(dup) = import.iter().find(|c| table.column_index(c).is_some()) {
            return Err(ModuleError::new(format!("column '{dup}' exists in both tables")));
        }
        let import_idx: Vec<usize> = import.iter().filter_map(|c| right.table.column_index(c)).collect();

        let mut index: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        for (i, row) in right.table.rows.iter().enumerate() {
            index.entry(key_of(row, &right_keys)).or_default().push(i);
        }

        let mut columns = table.columns.clone();
        columns.extend(import_idx.iter().map(|&i| right.table.columns[i].clone()));
        let mut rows = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            match index.get(&key_of(row, &left_keys)) {
                Some(matches) => {
                    for &m in matches {
                        let mut joined = row.clone();
                        joined.extend(import_idx.iter().map(|&i| right.table.rows[m].get(i).cloned().unwrap_or_default()));
                        rows.push(joined);
                    }
                }
                None if inner => {}
                None => {
                    let mut joined = row.clone();
                    joined.extend(std::iter::repeat(Value::Null).take(import_idx.len()));
                    rows.push(joined);
                }
            }
        }
        debug!("jointab {} <- {}: {} rows", extra.tab_slug, right.slug, rows.len());
        Ok(Table::new(columns, rows))
    }
}

fn key_of(row: &[Value], indices: &[usize]) -> Vec<String> {
    indices.iter().map(|&i| row.get(i).map(Value::to_string).unwrap_or_default()).collect()
}
