//! Knowledge base configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Where the clinical catalog comes from
#[derive(Debug, Clone, Deserialize, Default)]
pub struct KnowledgeConfig {
    /// YAML or JSON catalog file; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
}

impl KnowledgeConfig {
    /// Configured catalog file, ignoring blank values
    pub fn catalog_file(&self) -> Option<&PathBuf> {
        self.catalog_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_builtin_catalog() {
        assert!(KnowledgeConfig::default().catalog_file().is_none());
    }

    #[test]
    fn test_blank_path_is_ignored() {
        let config = KnowledgeConfig {
            catalog_path: Some(PathBuf::new()),
        };
        assert!(config.catalog_file().is_none());
    }
}
