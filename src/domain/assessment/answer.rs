//! Transport-agnostic answer values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw answer as submitted by the orchestration layer.
///
/// Deserializes from plain JSON values: `true`, `7`, `["a", "b"]`, `"text"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Bool(bool),
    Number(f64),
    Choices(Vec<String>),
    Text(String),
}

impl Answer {
    pub fn text(value: impl Into<String>) -> Self {
        Answer::Text(value.into())
    }

    pub fn choices<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Answer::Choices(values.into_iter().map(Into::into).collect())
    }

    /// Raw rendering, used when an answer cannot be interpreted.
    pub fn raw(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Bool(value) => write!(f, "{}", value),
            Answer::Number(value) => write!(f, "{}", value),
            Answer::Choices(values) => write!(f, "{}", values.join(", ")),
            Answer::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Answer::Bool(value)
    }
}

impl From<f64> for Answer {
    fn from(value: f64) -> Self {
        Answer::Number(value)
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_untagged_json_values() {
        assert_eq!(serde_json::from_str::<Answer>("true").unwrap(), Answer::Bool(true));
        assert_eq!(serde_json::from_str::<Answer>("7").unwrap(), Answer::Number(7.0));
        assert_eq!(
            serde_json::from_str::<Answer>(r#"["sitting", "bending"]"#).unwrap(),
            Answer::choices(["sitting", "bending"])
        );
        assert_eq!(
            serde_json::from_str::<Answer>(r#""it aches""#).unwrap(),
            Answer::text("it aches")
        );
    }

    #[test]
    fn displays_choices_comma_separated() {
        assert_eq!(Answer::choices(["a", "b"]).to_string(), "a, b");
    }
}
