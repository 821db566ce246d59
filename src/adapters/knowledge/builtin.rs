//! Built-in lumbar spine catalog, compiled into the binary.

use once_cell::sync::Lazy;

use crate::domain::knowledge::{CatalogError, KnowledgeBase};
use crate::ports::KnowledgeBaseSource;

use super::yaml_loader::parse_yaml;

const BUILTIN_CATALOG: &str = include_str!("../../../catalog/musculoskeletal.yaml");

// Parsed and validated once per process.
static PARSED: Lazy<Result<KnowledgeBase, CatalogError>> = Lazy::new(|| parse_yaml(BUILTIN_CATALOG));

/// The catalog shipped with the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl KnowledgeBaseSource for BuiltinCatalog {
    fn load(&self) -> Result<KnowledgeBase, CatalogError> {
        PARSED.clone()
    }

    fn describe(&self) -> String {
        "builtin:musculoskeletal".to_string()
    }
}
