use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::hashing::hash_value;

/// Insumos del fingerprint de un step. NO es el fingerprint final sino el
/// modelo previo a canonicalizar.
///
/// Dos renders con el mismo fingerprint producen el mismo resultado, así que
/// el driver puede reutilizar un resultado cacheado cuyo fingerprint coincide.
pub struct StepFingerprintInput<'a> {
    pub engine_version: &'a str,
    pub module_id: &'a str,
    pub module_version: &'a str,
    pub params: &'a Value,
    /// Hash de los secretos (claves y valores); los secretos en sí nunca se
    /// guardan.
    pub secrets_hash: String,
    /// Nombre del tab del step: los módulos lo reciben en `RenderExtra`.
    pub tab_name: &'a str,
    pub input_fingerprint: Option<&'a str>,
    /// slug -> marcador del output del tab (fingerprint + nombre, o
    /// absent/pending)
    pub tab_fingerprints: BTreeMap<String, String>,
}

impl StepFingerprintInput<'_> {
    pub fn fingerprint(&self) -> String {
        hash_value(&json!({
            "engine_version": self.engine_version,
            "module_id": self.module_id,
            "module_version": self.module_version,
            "params": self.params,
            "secrets": self.secrets_hash,
            "tab_name": self.tab_name,
            "input_fingerprint": self.input_fingerprint,
            "tab_fingerprints": self.tab_fingerprints,
        }))
    }
}
