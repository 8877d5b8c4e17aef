//! `pastecsv`: tabla a partir de texto CSV pegado por el usuario.
//!
//! Separador `,`, comillas dobles para celdas con comas o saltos de línea
//! (`""` escapa una comilla), vía el crate `csv`. Una columna es `number`
//! si todas sus celdas no vacías son números; las celdas vacías quedan en
//! `null`.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use serde_json::{Number, Value};
use tab_core::dtype::ParamDType;
use tab_core::model::{ColumnShape, ColumnType, Table};
use tab_core::module::{ModuleError, RenderExtra, RenderModule};
use tab_core::render::RenderParams;

use super::{bool_param, str_param};

static SCHEMA: Lazy<ParamDType> =
    Lazy::new(|| ParamDType::dict([("csv", ParamDType::Primitive), ("has_header_row", ParamDType::Primitive)]));

#[derive(Debug, Clone, Copy, Default)]
pub struct PasteCsv;

impl RenderModule for PasteCsv {
    fn id(&self) -> &str {
        "pastecsv"
    }

    fn param_schema(&self) -> &ParamDType {
        &SCHEMA
    }

    fn render(&self, _table: Table, params: &RenderParams, _extra: &RenderExtra) -> Result<Table, ModuleError> {
        let mut records = parse_csv(str_param(params, "csv"))?;
        if records.is_empty() {
            return Ok(Table::empty());
        }
        let width = records.iter().map(Vec::len).max().unwrap_or(0);
        let header = if bool_param(params, "has_header_row", true) {
            records.remove(0)
        } else {
            Vec::new()
        };
        let names = column_names(header, width)?;

        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(records.len()); width];
        for record in records {
            let mut cells = record.into_iter();
            for column in columns.iter_mut() {
                column.push(cells.next().filter(|c| !c.is_empty()));
            }
        }

        let mut shapes = Vec::with_capacity(width);
        let mut values: Vec<Vec<Value>> = Vec::with_capacity(width);
        for (name, cells) in names.into_iter().zip(columns) {
            let numbers: Option<Vec<Value>> = cells.iter().map(|c| c.as_deref().map_or(Some(Value::Null), parse_number)).collect();
            let has_data = cells.iter().any(Option::is_some);
            match numbers {
                Some(nums) if has_data => {
                    shapes.push(ColumnShape::new(name, ColumnType::Number));
                    values.push(nums);
                }
                _ => {
                    shapes.push(ColumnShape::text(name));
                    values.push(cells.into_iter().map(|c| c.map_or(Value::Null, Value::String)).collect());
                }
            }
        }
        let num_rows = values.first().map(Vec::len).unwrap_or(0);
        let rows = (0..num_rows).map(|i| values.iter().map(|col| col[i].clone()).collect()).collect();
        Ok(Table::new(shapes, rows))
    }
}

fn parse_number(cell: &str) -> Option<Value> {
    let cell = cell.trim();
    if let Ok(i) = cell.parse::<i64>() {
        return Some(Value::Number(i.into()));
    }
    cell.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
}

/// Nombres de columna: vacíos -> `Column N`; repetidos -> error.
fn column_names(header: Vec<String>, width: usize) -> Result<Vec<String>, ModuleError> {
    let mut names = IndexSet::with_capacity(width);
    for i in 0..width {
        let name = match header.get(i).map(|h| h.trim()) {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => format!("Column {}", i + 1),
        };
        if !names.insert(name.clone()) {
            return Err(ModuleError::new(format!("duplicate column name '{name}'")));
        }
    }
    Ok(names.into_iter().collect())
}

fn parse_csv(text: &str) -> Result<Vec<Vec<String>>, ModuleError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false)
                                              .flexible(true)
                                              .from_reader(text.as_bytes());
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ModuleError::new(format!("invalid csv: {e}")))?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    // líneas en blanco no son filas
    records.retain(|r| !(r.len() == 1 && r[0].is_empty()));
    Ok(records)
}
