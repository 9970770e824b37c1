//! Typed values and stored value rows

use chrono::NaiveDate;
use serde::Serialize;

use crate::fields::definition::FieldDefinition;

/// A raw value projected through its field definition's type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Absent (empty and not required)
    None,
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
    Boolean(bool),
    /// Single selected choice token
    Choice(String),
    /// Selected MultiSelect tokens, in stored order
    Choices(Vec<String>),
}

impl TypedValue {
    pub fn is_none(&self) -> bool {
        matches!(self, TypedValue::None)
    }
}

impl std::fmt::Display for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypedValue::None => Ok(()),
            TypedValue::Text(s) => write!(f, "{}", s),
            TypedValue::Integer(n) => write!(f, "{}", n),
            TypedValue::Decimal(n) => write!(f, "{}", n),
            TypedValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            TypedValue::Boolean(b) => write!(f, "{}", b),
            TypedValue::Choice(token) => write!(f, "{}", token),
            TypedValue::Choices(tokens) => write!(f, "{}", tokens.join(", ")),
        }
    }
}

/// One stored value joined with its current definition, as returned by
/// lenient reads
#[derive(Debug, Clone, Serialize)]
pub struct ValueEntry {
    /// Current definition at read time (constraints may postdate the write)
    pub definition: FieldDefinition,

    /// The string exactly as persisted
    pub raw_value: String,

    /// Best-effort typed projection; falls back to Text when the raw
    /// string no longer parses under the current type
    pub value: TypedValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        assert_eq!(TypedValue::None.to_string(), "");
        assert_eq!(TypedValue::Integer(42).to_string(), "42");
        assert_eq!(TypedValue::Boolean(true).to_string(), "true");
        assert_eq!(
            TypedValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).to_string(),
            "2024-03-01"
        );
        assert_eq!(
            TypedValue::Choices(vec!["a".to_string(), "b".to_string()]).to_string(),
            "a, b"
        );
    }

    #[test]
    fn test_serialize_untagged() {
        assert_eq!(serde_json::to_string(&TypedValue::Integer(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&TypedValue::Choice("high".to_string())).unwrap(),
            "\"high\""
        );
    }
}
