//! `renamecolumns`: renombra columnas según un mapa `viejo -> nuevo`.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use tab_core::dtype::ParamDType;
use tab_core::model::Table;
use tab_core::module::{ModuleError, RenderExtra, RenderModule};
use tab_core::render::{RenderParams, RenderValue};

static SCHEMA: Lazy<ParamDType> =
    Lazy::new(|| ParamDType::dict([("renames", ParamDType::map(ParamDType::Primitive))]));

#[derive(Debug, Clone, Copy, Default)]
pub struct RenameColumns;

impl RenderModule for RenameColumns {
    fn id(&self) -> &str {
        "renamecolumns"
    }

    fn param_schema(&self) -> &ParamDType {
        &SCHEMA
    }

    fn render(&self, mut table: Table, params: &RenderParams, _extra: &RenderExtra) -> Result<Table, ModuleError> {
        let Some(renames) = params.get("renames").and_then(RenderValue::as_dict) else {
            return Ok(table);
        };
        for column in table.columns.iter_mut() {
            if let Some(new_name) = renames.get(&column.name).and_then(RenderValue::as_str) {
                if !new_name.is_empty() {
                    column.name = new_name.to_string();
                }
            }
        }
        let mut seen = HashSet::new();
        if let Some(dup) = table.columns.iter().find(|c| !seen.insert(c.name.as_str())) {
            return Err(ModuleError::new(format!("duplicate column name '{}'", dup.name)));
        }
        Ok(table)
    }
}
