//! Documentos de workflow en JSON.
//!
//! El formato es la serialización de `tab_core::model::Workflow`:
//!
//! ```json
//! { "name": "ventas",
//!   "tabs": [ { "slug": "tab-1", "name": "Ventas",
//!               "steps": [ { "slug": "s1", "module": "pastecsv",
//!                            "params": { "csv": "a,b\n1,2" } } ] } ] }
//! ```
//!
//! `id` y `revision` son opcionales.
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tab_core::model::Workflow;

use crate::errors::CoreError;

/// Lee y valida un documento desde disco.
pub fn load_workflow(path: &Path) -> Result<Workflow, CoreError> {
    let raw = fs::read_to_string(path)?;
    parse_workflow(&raw).map_err(|e| match e {
                            CoreError::Document(msg) => CoreError::Document(format!("{}: {msg}", path.display())),
                            other => other,
                        })
}

pub fn parse_workflow(raw: &str) -> Result<Workflow, CoreError> {
    let workflow: Workflow = serde_json::from_str(raw)?;
    validate_workflow(&workflow)?;
    Ok(workflow)
}

/// Slugs no vacíos; tabs únicos y steps únicos en todo el workflow (los
/// resultados cacheados se indexan por slug de step).
pub fn validate_workflow(workflow: &Workflow) -> Result<(), CoreError> {
    let mut tabs = HashSet::new();
    let mut steps = HashSet::new();
    for tab in &workflow.tabs {
        if tab.slug.is_empty() {
            return Err(CoreError::Document("tab with empty slug".into()));
        }
        if !tabs.insert(tab.slug.as_str()) {
            return Err(CoreError::Document(format!("duplicate tab slug '{}'", tab.slug)));
        }
        for step in &tab.steps {
            if step.slug.is_empty() {
                return Err(CoreError::Document(format!("step with empty slug in tab '{}'", tab.slug)));
            }
            if !steps.insert(step.slug.as_str()) {
                return Err(CoreError::Document(format!("duplicate step slug '{}'", step.slug)));
            }
        }
    }
    Ok(())
}
