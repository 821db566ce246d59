//! Domain layer containing the assessment logic and its reference data.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `knowledge` - Read-only clinical knowledge base
//! - `assessment` - Belief, red-flag, selection and completeness engines
//!   driven by the conversation manager

pub mod assessment;
pub mod foundation;
pub mod knowledge;
