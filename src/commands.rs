//! Comandos del binario `tabflow`.
//!
//! Cada documento se renderiza contra su propio store en memoria; no hay
//! estado compartido entre documentos, así que `render_files` los procesa en
//! paralelo con rayon.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use tab_core::engine::{RenderDriver, RenderReport, RenderSettings, TabDependencyGraph};
use tab_core::model::{Table, Workflow};
use tab_core::module::ModuleCatalog;
use tab_core::store::InMemoryWorkflowStore;

use crate::document::load_workflow;
use crate::errors::CoreError;

/// Reporte de una pasada más la tabla final de cada tab (`None` si el tab no
/// terminó `ok`).
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    pub workflow: String,
    pub report: RenderReport,
    pub tables: IndexMap<String, Option<Table>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplainOutput {
    pub workflow: String,
    pub dependencies: IndexMap<String, Vec<String>>,
    pub forward_references: Vec<(String, String)>,
    pub missing_references: Vec<(String, String)>,
    pub cycles: Vec<Vec<String>>,
}

pub fn render_workflow(workflow: Workflow,
                       catalog: ModuleCatalog,
                       settings: RenderSettings)
                       -> Result<RenderOutput, CoreError> {
    let name = workflow.name.clone();
    let slugs = workflow.tab_slugs();
    let store = Arc::new(InMemoryWorkflowStore::new());
    let id = store.insert_workflow(workflow);
    let mut driver = RenderDriver::builder(Arc::clone(&store)).catalog(catalog)
                                                             .settings(settings)
                                                             .build();
    let report = driver.render(id)?;
    let mut tables = IndexMap::new();
    for slug in slugs {
        let table = driver.tab_table(id, &slug)?;
        tables.insert(slug, table);
    }
    info!("rendered '{name}': {} steps ({} cached)", report.step_count(), report.cached_step_count());
    Ok(RenderOutput { workflow: name,
                      report,
                      tables })
}

pub fn explain_workflow(workflow: &Workflow, catalog: &ModuleCatalog) -> ExplainOutput {
    let graph = TabDependencyGraph::build(workflow, catalog);
    let dependencies = workflow.tabs
                               .iter()
                               .map(|t| (t.slug.clone(), graph.dependencies(&t.slug).to_vec()))
                               .collect();
    let cycles = graph.cycles();
    for cycle in &cycles {
        warn!("tab cycle in '{}': {}", workflow.name, cycle.join(" -> "));
    }
    ExplainOutput { workflow: workflow.name.clone(),
                    dependencies,
                    forward_references: graph.forward_references(),
                    missing_references: graph.missing_references(),
                    cycles }
}

/// Renderiza varios documentos en paralelo; cada uno construye su catálogo
/// con `make_catalog`. El resultado conserva el orden de `paths`.
pub fn render_files<F>(paths: &[PathBuf],
                       make_catalog: F,
                       settings: RenderSettings)
                       -> Vec<(PathBuf, Result<RenderOutput, CoreError>)>
    where F: Fn() -> Result<ModuleCatalog, CoreError> + Sync
{
    paths.par_iter()
         .map(|path| {
             let result = render_file(path, &make_catalog, settings);
             (path.clone(), result)
         })
         .collect()
}

fn render_file<F>(path: &Path, make_catalog: &F, settings: RenderSettings) -> Result<RenderOutput, CoreError>
    where F: Fn() -> Result<ModuleCatalog, CoreError>
{
    let workflow = load_workflow(path)?;
    render_workflow(workflow, make_catalog()?, settings)
}

pub fn explain_file(path: &Path, catalog: &ModuleCatalog) -> Result<ExplainOutput, CoreError> {
    let workflow = load_workflow(path)?;
    Ok(explain_workflow(&workflow, catalog))
}
