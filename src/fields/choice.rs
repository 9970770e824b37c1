//! Choice entity - one allowed option for a choice-bearing field

use serde::{Deserialize, Serialize};

use crate::core::identity::{ChoiceId, FieldId};

/// Delimiter separating tokens in a stored MultiSelect value
///
/// Choice values may not contain this character; `add_choice` and
/// document import both reject offending tokens.
pub const MULTI_SELECT_DELIMITER: char = ',';

/// One allowed option for a choice-bearing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Unique identifier
    pub id: ChoiceId,

    /// Owning field definition
    pub field_id: FieldId,

    /// Text shown to the operator
    pub display_text: String,

    /// Persisted token (defaults to display_text when unspecified)
    pub value: String,

    /// Position within the owning field's choice list
    pub sort_order: i64,
}

impl Choice {
    /// Create a new choice; value falls back to the display text
    pub fn new(
        field_id: FieldId,
        display_text: impl Into<String>,
        value: Option<String>,
        sort_order: i64,
    ) -> Self {
        let display_text = display_text.into();
        let value = value.unwrap_or_else(|| display_text.clone());
        Self {
            id: ChoiceId::new(),
            field_id,
            display_text,
            value,
            sort_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_defaults_to_display_text() {
        let field_id = FieldId::new();
        let choice = Choice::new(field_id, "High Priority", None, 1);
        assert_eq!(choice.value, "High Priority");
    }

    #[test]
    fn test_explicit_value_kept() {
        let field_id = FieldId::new();
        let choice = Choice::new(field_id, "High Priority", Some("high".to_string()), 1);
        assert_eq!(choice.value, "high");
        assert_eq!(choice.display_text, "High Priority");
    }
}
