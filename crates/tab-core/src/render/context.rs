use std::collections::HashSet;

use serde_json::Value;
use uuid::Uuid;

use super::TabOutputLoader;
use crate::model::{ResultShape, TabShapes};

/// Vista de sólo lectura para renderizar un step.
///
/// Se construye de nuevo para cada step y nunca se muta. Los parámetros
/// crudos del step NO viven aquí: `clean_value` los recibe como argumento
/// explícito en cada llamada recursiva.
pub struct RenderContext<'a> {
    pub workflow_id: Uuid,
    /// Shape del output del step anterior (input de este step).
    pub input_shape: &'a ResultShape,
    /// Registro de shapes de todos los tabs en esta pasada.
    pub tab_shapes: &'a TabShapes,
    loader: &'a dyn TabOutputLoader,
}

impl<'a> RenderContext<'a> {
    pub fn new(workflow_id: Uuid,
               input_shape: &'a ResultShape,
               tab_shapes: &'a TabShapes,
               loader: &'a dyn TabOutputLoader)
               -> Self {
        Self { workflow_id,
               input_shape,
               tab_shapes,
               loader }
    }

    pub fn loader(&self) -> &'a dyn TabOutputLoader {
        self.loader
    }

    /// Nombres de columna válidos para un selector de columnas.
    ///
    /// - Sin `tab_parameter`: columnas del input del step.
    /// - Con `tab_parameter`: columnas del tab cuyo slug es el valor actual de
    ///   ese parámetro en `raw_params` (raíz). Si el valor falta, no es string,
    ///   el tab no existe, o su shape es `None` / no-ok, el conjunto es vacío.
    pub fn valid_colnames(&self, tab_parameter: Option<&str>, raw_params: &Value) -> HashSet<&'a str> {
        let Some(parameter) = tab_parameter else {
            return self.input_shape.column_names();
        };
        let Some(slug) = raw_params.get(parameter).and_then(Value::as_str) else {
            return HashSet::new();
        };
        match self.tab_shapes.get(slug) {
            Some(Some(shape)) if shape.is_ok() => shape.column_names(),
            _ => HashSet::new(),
        }
    }
}
