//! Field type variants and their capability table

use serde::{Deserialize, Serialize};

/// The closed set of custom field types
///
/// Which constraints apply to a definition is decided by the capability
/// methods below, never by matching on type names elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Free-form text
    Text,
    /// Whole number
    Number,
    /// Decimal number
    Decimal,
    /// Calendar date (YYYY-MM-DD)
    Date,
    /// True/false flag
    Boolean,
    /// Single selection from a choice list
    Dropdown,
    /// Multiple selections from a choice list
    MultiSelect,
    /// Single selection rendered as radio buttons
    Radio,
}

impl FieldType {
    /// All supported field types
    pub fn all() -> &'static [FieldType] {
        &[
            FieldType::Text,
            FieldType::Number,
            FieldType::Decimal,
            FieldType::Date,
            FieldType::Boolean,
            FieldType::Dropdown,
            FieldType::MultiSelect,
            FieldType::Radio,
        ]
    }

    /// Get the string representation of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Decimal => "Decimal",
            FieldType::Date => "Date",
            FieldType::Boolean => "Boolean",
            FieldType::Dropdown => "Dropdown",
            FieldType::MultiSelect => "MultiSelect",
            FieldType::Radio => "Radio",
        }
    }

    /// Whether values are selected from an operator-defined choice list
    pub fn has_choices(&self) -> bool {
        matches!(
            self,
            FieldType::Dropdown | FieldType::MultiSelect | FieldType::Radio
        )
    }

    /// Whether min/max value constraints apply
    pub fn has_numeric_range(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Decimal)
    }

    /// Whether min/max length constraints apply
    pub fn has_length(&self) -> bool {
        matches!(self, FieldType::Text)
    }

    /// Whether a validation pattern applies
    pub fn has_pattern(&self) -> bool {
        matches!(self, FieldType::Text)
    }

    /// Whether a value may carry more than one selected token
    pub fn is_multi(&self) -> bool {
        matches!(self, FieldType::MultiSelect)
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Text
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "text" => Ok(FieldType::Text),
            "number" => Ok(FieldType::Number),
            "decimal" => Ok(FieldType::Decimal),
            "date" => Ok(FieldType::Date),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "dropdown" => Ok(FieldType::Dropdown),
            "multiselect" => Ok(FieldType::MultiSelect),
            "radio" => Ok(FieldType::Radio),
            _ => Err(format!("Unknown field type: {}", s)),
        }
    }
}
