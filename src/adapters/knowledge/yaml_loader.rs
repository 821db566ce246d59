//! Catalog loading from YAML or JSON files on disk.

use std::path::{Path, PathBuf};

use crate::domain::knowledge::{CatalogDocument, CatalogError, KnowledgeBase};
use crate::ports::KnowledgeBaseSource;

/// A catalog file. `.json` files are read as JSON, anything else as YAML.
#[derive(Debug, Clone)]
pub struct CatalogFile {
    path: PathBuf,
}

impl CatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}

impl KnowledgeBaseSource for CatalogFile {
    fn load(&self) -> Result<KnowledgeBase, CatalogError> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| CatalogError::Io(format!("{}: {}", self.path.display(), e)))?;

        let kb = if self.is_json() {
            parse_json(&content)?
        } else {
            parse_yaml(&content)?
        };

        tracing::info!(
            path = %self.path.display(),
            conditions = kb.conditions().len(),
            questions = kb.questions().len(),
            red_flags = kb.red_flags().len(),
            "Catalog loaded"
        );
        Ok(kb)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

pub(super) fn parse_yaml(content: &str) -> Result<KnowledgeBase, CatalogError> {
    let document: CatalogDocument =
        serde_yaml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;
    KnowledgeBase::from_document(document)
}

fn parse_json(content: &str) -> Result<KnowledgeBase, CatalogError> {
    let document: CatalogDocument =
        serde_json::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))?;
    KnowledgeBase::from_document(document)
}
