//! Knowledge base - read-only clinical reference data.
//!
//! The engine never edits these catalogs. They are prepared elsewhere and
//! handed in through the `KnowledgeBaseSource` port.
//!
//! # Module Organization
//!
//! - `category` - Question, finding and fallback-topic categories
//! - `condition` - Conditions with priors and likelihood weights
//! - `question` - Question templates and evidence keys
//! - `red_flag` - Safety-critical patterns and urgency levels
//! - `decision_rule` - Finding combinations that boost a condition
//! - `catalog` - The validated `KnowledgeBase`

mod catalog;
mod category;
mod condition;
mod decision_rule;
mod question;
mod red_flag;

pub use catalog::{CatalogDocument, CatalogError, KnowledgeBase};
pub use category::{FindingCategory, QuestionCategory, QuestionTopic};
pub use condition::{Condition, NEUTRAL_LIKELIHOOD};
pub use decision_rule::DecisionRule;
pub use question::{
    normalize_option, qualified_key, PromptType, QuestionTemplate, ScaleBand, NEGATIVE_QUALIFIER,
    SCALE_MAX,
};
pub use red_flag::{CompiledRedFlag, RedFlagPattern, RedFlagTrigger, UrgencyLevel};
