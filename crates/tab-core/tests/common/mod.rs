//! Módulos mínimos para tests del core (el catálogo real vive en
//! tab-adapters).
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tab_core::dtype::ParamDType;
use tab_core::model::{ColumnShape, Table};
use tab_core::module::{ModuleCatalog, ModuleError, RenderExtra, RenderModule};
use tab_core::render::{RenderParams, TabOutputLoader};
use tab_core::{RenderError, ResultShape, TabOutput};

/// Tabla literal: `{"columns": ["A", ...], "rows": [[...], ...]}`.
#[derive(Debug)]
pub struct Literal {
    schema: ParamDType,
}

impl Literal {
    pub fn new() -> Self {
        Self { schema: ParamDType::dict([("columns", ParamDType::Primitive), ("rows", ParamDType::Primitive)]) }
    }
}

impl RenderModule for Literal {
    fn id(&self) -> &str {
        "literal"
    }
    fn param_schema(&self) -> &ParamDType {
        &self.schema
    }
    fn render(&self, _table: Table, params: &RenderParams, _extra: &RenderExtra) -> Result<Table, ModuleError> {
        let columns = params.get("columns")
                            .and_then(|v| match v {
                                tab_core::RenderValue::Scalar(Value::Array(items)) => Some(items.clone()),
                                _ => None,
                            })
                            .ok_or_else(|| ModuleError::new("missing columns"))?;
        let columns = columns.iter().filter_map(Value::as_str).map(ColumnShape::text).collect();
        let rows = match params.get("rows") {
            Some(tab_core::RenderValue::Scalar(Value::Array(rows))) => {
                rows.iter().map(|r| r.as_array().cloned().unwrap_or_default()).collect()
            }
            _ => Vec::new(),
        };
        Ok(Table::new(columns, rows))
    }
}

/// Pasa la tabla sin cambios y guarda los parámetros resueltos.
#[derive(Debug)]
pub struct Capture {
    id: String,
    schema: ParamDType,
    pub seen: Arc<Mutex<Vec<RenderParams>>>,
}

impl Capture {
    pub fn new(id: &str, schema: ParamDType) -> Self {
        Self { id: id.to_string(),
               schema,
               seen: Arc::default() }
    }
}

impl RenderModule for Capture {
    fn id(&self) -> &str {
        &self.id
    }
    fn param_schema(&self) -> &ParamDType {
        &self.schema
    }
    fn render(&self, table: Table, params: &RenderParams, _extra: &RenderExtra) -> Result<Table, ModuleError> {
        self.seen.lock().expect("capture lock").push(params.clone());
        Ok(table)
    }
}

#[derive(Debug)]
pub struct Fail {
    schema: ParamDType,
}

impl RenderModule for Fail {
    fn id(&self) -> &str {
        "fail"
    }
    fn param_schema(&self) -> &ParamDType {
        &self.schema
    }
    fn render(&self, _table: Table, _params: &RenderParams, _extra: &RenderExtra) -> Result<Table, ModuleError> {
        Err(ModuleError::new("boom"))
    }
}

/// Ejecuta una acción la primera vez que se renderiza (simula una edición
/// concurrente) y luego pasa la tabla.
pub struct OnRender {
    schema: ParamDType,
    action: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl std::fmt::Debug for OnRender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OnRender")
    }
}

impl OnRender {
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self { schema: ParamDType::dict([("x", ParamDType::Primitive)]),
               action: Mutex::new(Some(Box::new(action))) }
    }
}

impl RenderModule for OnRender {
    fn id(&self) -> &str {
        "onrender"
    }
    fn param_schema(&self) -> &ParamDType {
        &self.schema
    }
    fn render(&self, table: Table, _params: &RenderParams, _extra: &RenderExtra) -> Result<Table, ModuleError> {
        if let Some(action) = self.action.lock().expect("action lock").take() {
            action();
        }
        Ok(table)
    }
}

/// `reftab`: `{tab: Tab, cols: Multicolumn(tab_parameter = tab)}`.
pub fn reftab() -> Capture {
    Capture::new("reftab",
                 ParamDType::dict([("tab", ParamDType::Tab), ("cols", ParamDType::multicolumn_of("tab"))]))
}

/// Catálogo con `literal` y `fail`.
pub fn base_catalog() -> ModuleCatalog {
    let mut catalog = ModuleCatalog::new();
    catalog.register(Arc::new(Literal::new())).expect("literal");
    catalog.register(Arc::new(Fail { schema: ParamDType::dict([("x", ParamDType::Primitive)]) }))
           .expect("fail");
    catalog
}

pub fn catalog_with<M: RenderModule + 'static>(module: M) -> ModuleCatalog {
    let mut catalog = base_catalog();
    catalog.register(Arc::new(module)).expect("extra module");
    catalog
}

pub fn literal_params(columns: &[&str], rows: Value) -> Value {
    json!({ "columns": columns, "rows": rows })
}

/// Cargador de prueba: devuelve outputs fijos y cuenta las cargas.
#[derive(Default)]
pub struct MapLoader {
    pub outputs: HashMap<String, TabOutput>,
    pub loads: Mutex<Vec<String>>,
}

impl MapLoader {
    pub fn with(mut self, slug: &str, columns: &[&str]) -> Self {
        let columns: Vec<ColumnShape> = columns.iter().map(|c| ColumnShape::text(*c)).collect();
        self.outputs.insert(slug.to_string(),
                            TabOutput { slug: slug.to_string(),
                                        name: format!("Tab {slug}"),
                                        columns: columns.clone(),
                                        table: Table::new(columns, vec![]) });
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.lock().expect("loads lock").len()
    }
}

impl TabOutputLoader for MapLoader {
    fn load(&self, slug: &str, _validated_shape: &ResultShape) -> Result<TabOutput, RenderError> {
        self.loads.lock().expect("loads lock").push(slug.to_string());
        self.outputs
            .get(slug)
            .cloned()
            .ok_or_else(|| RenderError::StaleExecution(format!("no output for {slug}")))
    }
}

pub fn shape(columns: &[&str]) -> ResultShape {
    ResultShape::ok(columns.iter().map(|c| ColumnShape::text(*c)).collect())
}
