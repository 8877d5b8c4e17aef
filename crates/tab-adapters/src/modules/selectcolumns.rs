//! `selectcolumns`: conserva (o descarta) las columnas elegidas.

use once_cell::sync::Lazy;
use tab_core::dtype::ParamDType;
use tab_core::model::Table;
use tab_core::module::{ModuleError, RenderExtra, RenderModule};
use tab_core::render::RenderParams;

use super::{bool_param, colnames_param};

static SCHEMA: Lazy<ParamDType> =
    Lazy::new(|| ParamDType::dict([("colnames", ParamDType::multicolumn()), ("keep", ParamDType::Primitive)]));

#[derive(Debug, Clone, Copy, Default)]
pub struct SelectColumns;

impl RenderModule for SelectColumns {
    fn id(&self) -> &str {
        "selectcolumns"
    }

    fn param_schema(&self) -> &ParamDType {
        &SCHEMA
    }

    fn render(&self, table: Table, params: &RenderParams, _extra: &RenderExtra) -> Result<Table, ModuleError> {
        let selected = colnames_param(params, "colnames");
        // sin selección no se toca la tabla
        if selected.is_empty() {
            return Ok(table);
        }
        let keep = bool_param(params, "keep", true);
        let indices: Vec<usize> = table.columns
                                       .iter()
                                       .enumerate()
                                       .filter(|(_, c)| selected.contains(&c.name.as_str()) == keep)
                                       .map(|(i, _)| i)
                                       .collect();
        let columns = indices.iter().map(|&i| table.columns[i].clone()).collect();
        let rows = table.rows
                        .iter()
                        .map(|row| indices.iter().map(|&i| row.get(i).cloned().unwrap_or_default()).collect())
                        .collect();
        Ok(Table::new(columns, rows))
    }
}
