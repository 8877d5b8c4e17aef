use tab_core::module::CatalogError;
use tab_core::CoreEngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error interno: {0}")]
    Internal(String),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Documento inválido: {0}")]
    Document(String),
    #[error("Error de render: {0}")]
    Render(#[from] CoreEngineError),
    #[error("Catálogo inválido: {0}")]
    Catalog(#[from] CatalogError),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Document(e.to_string())
    }
}
