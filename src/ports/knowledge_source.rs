//! Knowledge Base Source Port - Where the read-only catalog comes from.

use crate::domain::knowledge::{CatalogError, KnowledgeBase};

/// Port for loading a validated knowledge base.
///
/// Loading happens once at startup; the result is shared read-only.
pub trait KnowledgeBaseSource: Send + Sync {
    /// Load and validate the catalog.
    ///
    /// # Errors
    /// Returns `CatalogError` if the catalog cannot be read or is invalid
    fn load(&self) -> Result<KnowledgeBase, CatalogError>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;
}
