//! Knowledge Base Source Adapters.
//!
//! - `BuiltinCatalog` - Lumbar spine catalog embedded in the binary
//! - `CatalogFile` - YAML or JSON catalog read from disk

mod builtin;
mod yaml_loader;

pub use builtin::BuiltinCatalog;
pub use yaml_loader::CatalogFile;
