use std::sync::Arc;

use tab_core::module::{CatalogError, ModuleCatalog};

use crate::modules::{ConcatTabs, ConvertToText, JoinTab, PasteCsv, RenameColumns, SelectColumns, SortColumn};

/// Catálogo con todos los módulos de este crate.
pub fn default_catalog() -> Result<ModuleCatalog, CatalogError> {
    let mut catalog = ModuleCatalog::new();
    catalog.register(Arc::new(PasteCsv))?;
    catalog.register(Arc::new(SelectColumns))?;
    catalog.register(Arc::new(SortColumn))?;
    catalog.register(Arc::new(ConvertToText))?;
    catalog.register(Arc::new(RenameColumns))?;
    catalog.register(Arc::new(JoinTab))?;
    catalog.register(Arc::new(ConcatTabs))?;
    Ok(catalog)
}
