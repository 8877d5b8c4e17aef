//! Estado mutable de una pasada: registro de shapes, resultados en staging y
//! marcadores de fingerprint de los tabs terminados.

use std::collections::{BTreeMap, HashMap};

use crate::constants::{TAB_ABSENT, TAB_EMPTY, TAB_PENDING};
use crate::model::{ResultShape, ResultStatus, TabShapes};
use crate::store::StagedResults;

pub(crate) struct PassState {
    pub shapes: TabShapes,
    pub staged: StagedResults,
    tab_markers: HashMap<String, String>,
}

impl PassState {
    /// Todos los tabs arrancan con shape `None` (pendiente).
    pub fn new(slugs: &[String]) -> Self {
        Self { shapes: slugs.iter().map(|s| (s.clone(), None)).collect(),
               staged: StagedResults::new(),
               tab_markers: HashMap::new() }
    }

    /// Fija el shape terminal de un tab. `last_fingerprint` es el del último
    /// step si el tab terminó `ok` con al menos un step. El marcador incluye
    /// el nombre del tab: los módulos lo ven en `TabOutput`.
    pub fn finish_tab(&mut self, slug: &str, name: &str, shape: ResultShape, last_fingerprint: Option<String>) {
        let state = match (shape.status, last_fingerprint) {
            (ResultStatus::Ok, Some(fp)) => fp,
            (ResultStatus::Ok, None) => TAB_EMPTY.to_string(),
            (ResultStatus::Error, _) => "error".to_string(),
            (ResultStatus::Unreachable, _) => "unreachable".to_string(),
        };
        self.tab_markers.insert(slug.to_string(), format!("{state}:{name}"));
        self.shapes.insert(slug.to_string(), Some(shape));
    }

    /// Marcador de un tab para el fingerprint de un step que lo referencia.
    pub fn tab_marker(&self, slug: &str) -> &str {
        match self.shapes.get(slug) {
            None => TAB_ABSENT,
            Some(None) => TAB_PENDING,
            Some(Some(_)) => self.tab_markers.get(slug).map(String::as_str).unwrap_or(TAB_PENDING),
        }
    }

    pub fn tab_markers_for(&self, slugs: &[String]) -> BTreeMap<String, String> {
        slugs.iter().map(|s| (s.clone(), self.tab_marker(s).to_string())).collect()
    }
}
