//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `advisory` - Next-question advisors (local, HTTP, failover, mock)
//! - `knowledge` - Catalog sources (built-in, file)
//! - `storage` - Session stores (in-memory)

pub mod advisory;
pub mod knowledge;
pub mod storage;

pub use advisory::{
    FailoverQuestionAdvisor, HttpAdvisorConfig, HttpQuestionAdvisor, LocalQuestionAdvisor,
    MockQuestionAdvisor,
};
pub use knowledge::{BuiltinCatalog, CatalogFile};
pub use storage::InMemorySessionStore;
