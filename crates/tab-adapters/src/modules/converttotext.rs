//! `converttotext`: convierte columnas a texto según su tipo en el input.

use once_cell::sync::Lazy;
use tab_core::dtype::ParamDType;
use tab_core::model::{ColumnType, Table};
use tab_core::module::{ModuleError, RenderExtra, RenderModule};
use tab_core::render::RenderParams;

use super::{cell_to_text, colnames_param};

static SCHEMA: Lazy<ParamDType> = Lazy::new(|| ParamDType::dict([("colnames", ParamDType::multicolumn())]));

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertToText;

impl RenderModule for ConvertToText {
    fn id(&self) -> &str {
        "converttotext"
    }

    fn param_schema(&self) -> &ParamDType {
        &SCHEMA
    }

    fn render(&self, mut table: Table, params: &RenderParams, extra: &RenderExtra) -> Result<Table, ModuleError> {
        for name in colnames_param(params, "colnames") {
            let column = extra.input_columns
                              .get(name)
                              .ok_or_else(|| ModuleError::new(format!("column '{name}' is not in the input")))?;
            // el texto ya es texto
            if column.column_type == ColumnType::Text {
                continue;
            }
            let Some(idx) = table.column_index(name) else {
                continue;
            };
            for row in table.rows.iter_mut() {
                if let Some(cell) = row.get_mut(idx) {
                    *cell = cell_to_text(cell).map_or(serde_json::Value::Null, serde_json::Value::String);
                }
            }
            table.columns[idx].column_type = ColumnType::Text;
        }
        Ok(table)
    }
}
