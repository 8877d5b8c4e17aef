//! Workflow, tabs y steps tal como los entrega el almacenamiento.
//!
//! El orden de `tabs` es el orden de declaración; el driver renderiza en ese
//! orden. Las referencias entre tabs viven en los valores de los parámetros,
//! no en esta estructura.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::dtype::ParamDType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    /// Se incrementa con cada edición; el driver lo usa para detectar cambios
    /// concurrentes al confirmar una pasada.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, tabs: Vec<Tab>) -> Self {
        Self { id: Uuid::new_v4(),
               name: name.into(),
               revision: 0,
               tabs }
    }

    pub fn tab(&self, slug: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.slug == slug)
    }

    pub fn tab_mut(&mut self, slug: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.slug == slug)
    }

    pub fn tab_slugs(&self) -> Vec<String> {
        self.tabs.iter().map(|t| t.slug.clone()).collect()
    }

    pub fn step_mut(&mut self, step_slug: &str) -> Option<&mut Step> {
        self.tabs.iter_mut().flat_map(|t| t.steps.iter_mut()).find(|s| s.slug == step_slug)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    /// Identificador inmutable, único dentro del workflow.
    pub slug: String,
    /// Nombre visible (mutable).
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Tab {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self { slug: slug.into(),
               name: name.into(),
               steps }
    }

    /// El output de un tab es el resultado de su último step.
    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Único dentro del workflow; clave de los resultados cacheados.
    pub slug: String,
    /// Id del módulo en el catálogo.
    pub module: String,
    /// Valores crudos; siguen estructuralmente el esquema del módulo.
    #[serde(default = "empty_object")]
    pub params: Value,
    /// Secretos: se pasan al módulo sin resolver.
    #[serde(default)]
    pub secrets: Map<String, Value>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl Step {
    pub fn new(slug: impl Into<String>, module: impl Into<String>, params: Value) -> Self {
        Self { slug: slug.into(),
               module: module.into(),
               params,
               secrets: Map::new() }
    }

    pub fn with_secrets(mut self, secrets: Map<String, Value>) -> Self {
        self.secrets = secrets;
        self
    }
}

/// Vista de los parámetros de un step junto al esquema de su módulo.
#[derive(Debug, Clone, Copy)]
pub struct StepParams<'a> {
    pub schema: &'a ParamDType,
    pub values: &'a Value,
    pub secrets: &'a Map<String, Value>,
}

impl<'a> StepParams<'a> {
    pub fn new(schema: &'a ParamDType, step: &'a Step) -> Self {
        Self { schema,
               values: &step.params,
               secrets: &step.secrets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_minimal_document() {
        let wf: Workflow = serde_json::from_value(json!({
            "tabs": [
                { "slug": "tab-1", "name": "Data", "steps": [
                    { "slug": "step-1", "module": "pastecsv", "params": {"csv": "A\n1"} }
                ]},
                { "slug": "tab-2" }
            ]
        })).expect("valid workflow");
        assert_eq!(wf.tab_slugs(), vec!["tab-1", "tab-2"]);
        assert_eq!(wf.revision, 0);
        assert!(wf.tab("tab-2").and_then(Tab::last_step).is_none());
        assert!(wf.tabs[0].steps[0].secrets.is_empty());
    }
}
