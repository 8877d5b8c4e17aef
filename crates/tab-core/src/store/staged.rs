use indexmap::IndexMap;

use super::CachedRenderResult;

/// Resultados producidos por la pasada en curso, aún sin confirmar.
///
/// El cargador de outputs los consulta antes que el store: un tab renderizado
/// en esta pasada debe verse con su resultado nuevo aunque el commit no haya
/// ocurrido.
#[derive(Debug, Default)]
pub struct StagedResults {
    by_step: IndexMap<String, CachedRenderResult>,
}

impl StagedResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, step_slug: impl Into<String>, result: CachedRenderResult) {
        self.by_step.insert(step_slug.into(), result);
    }

    pub fn get(&self, step_slug: &str) -> Option<&CachedRenderResult> {
        self.by_step.get(step_slug)
    }

    pub fn len(&self) -> usize {
        self.by_step.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_step.is_empty()
    }

    pub fn into_vec(self) -> Vec<(String, CachedRenderResult)> {
        self.by_step.into_iter().collect()
    }
}
