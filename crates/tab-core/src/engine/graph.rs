//! Grafo de dependencias entre tabs, construido a partir de los valores
//! actuales de los parámetros `Tab`.
//!
//! Sólo para diagnóstico: el driver NO lo usa. La detección de ciclos del
//! driver sigue siendo perezosa (un tab con shape `None` al momento de
//! referenciarlo), así que una referencia hacia adelante y un ciclo real se
//! reportan igual durante el render. Este grafo permite distinguirlos.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::Workflow;
use crate::module::ModuleCatalog;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabDependencyGraph {
    /// slug -> slugs referenciados (en orden de aparición, sin repetir)
    edges: IndexMap<String, Vec<String>>,
}

impl TabDependencyGraph {
    /// Steps con módulos desconocidos se ignoran.
    pub fn build(workflow: &Workflow, catalog: &ModuleCatalog) -> Self {
        let mut edges = IndexMap::new();
        for tab in &workflow.tabs {
            let mut deps: Vec<String> = Vec::new();
            for step in &tab.steps {
                let Some(module) = catalog.get(&step.module) else {
                    continue;
                };
                for slug in module.param_schema().collect_tab_slugs(&step.params) {
                    if !deps.contains(&slug) {
                        deps.push(slug);
                    }
                }
            }
            edges.insert(tab.slug.clone(), deps);
        }
        Self { edges }
    }

    pub fn dependencies(&self, tab_slug: &str) -> &[String] {
        self.edges.get(tab_slug).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Referencias a tabs que no existen (se resuelven a `Null`).
    pub fn missing_references(&self) -> Vec<(String, String)> {
        self.edges
            .iter()
            .flat_map(|(from, deps)| deps.iter().map(move |to| (from, to)))
            .filter(|(_, to)| !self.edges.contains_key(*to))
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect()
    }

    /// Referencias a un tab que se renderiza después (o a sí mismo): el
    /// render en orden las reporta como ciclo.
    pub fn forward_references(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (pos, (from, deps)) in self.edges.iter().enumerate() {
            for to in deps {
                if let Some(to_pos) = self.edges.get_index_of(to) {
                    if to_pos >= pos {
                        out.push((from.clone(), to.clone()));
                    }
                }
            }
        }
        out
    }

    /// Componentes fuertemente conexas con ciclo real (más de un tab, o un
    /// tab que se referencia a sí mismo), vía Tarjan. Cada ciclo sale en
    /// orden de declaración.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut tarjan = Tarjan { graph: self,
                                  index: 0,
                                  indices: HashMap::new(),
                                  lowlink: HashMap::new(),
                                  stack: Vec::new(),
                                  on_stack: HashMap::new(),
                                  components: Vec::new() };
        for node in self.edges.keys() {
            if !tarjan.indices.contains_key(node.as_str()) {
                tarjan.visit(node);
            }
        }
        let mut cycles: Vec<Vec<String>> =
            tarjan.components
                  .into_iter()
                  .filter(|c| c.len() > 1 || c.first().is_some_and(|n| self.dependencies(n).contains(n)))
                  .map(|mut c| {
                      c.sort_by_key(|n| self.edges.get_index_of(n));
                      c
                  })
                  .collect();
        cycles.sort_by_key(|c| c.first().and_then(|n| self.edges.get_index_of(n)));
        cycles
    }
}

struct Tarjan<'g> {
    graph: &'g TabDependencyGraph,
    index: usize,
    indices: HashMap<&'g str, usize>,
    lowlink: HashMap<&'g str, usize>,
    stack: Vec<&'g str>,
    on_stack: HashMap<&'g str, bool>,
    components: Vec<Vec<String>>,
}

impl<'g> Tarjan<'g> {
    fn visit(&mut self, node: &'g str) {
        self.indices.insert(node, self.index);
        self.lowlink.insert(node, self.index);
        self.index += 1;
        self.stack.push(node);
        self.on_stack.insert(node, true);

        let graph = self.graph;
        for dep in graph.dependencies(node) {
            let dep = dep.as_str();
            // referencias a tabs inexistentes no forman parte del grafo
            if !graph.edges.contains_key(dep) {
                continue;
            }
            if !self.indices.contains_key(dep) {
                self.visit(dep);
                let low = self.lowlink[node].min(self.lowlink[dep]);
                self.lowlink.insert(node, low);
            } else if self.on_stack.get(dep).copied().unwrap_or(false) {
                let low = self.lowlink[node].min(self.indices[dep]);
                self.lowlink.insert(node, low);
            }
        }

        if self.lowlink[node] == self.indices[node] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.insert(member, false);
                component.push(member.to_string());
                if member == node {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}
