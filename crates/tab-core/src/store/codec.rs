//! Serialización de tablas en el cache (JSON).

use crate::model::Table;

pub fn encode_table(table: &Table) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(table)
}

pub fn decode_table(bytes: &[u8]) -> Result<Table, serde_json::Error> {
    serde_json::from_slice(bytes)
}
