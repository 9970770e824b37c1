//! The portable schema document - wire format for import/export

use serde::{Deserialize, Serialize};

use crate::fields::FieldType;

/// Version written to exported documents; imports of any other version
/// are rejected
pub const DOCUMENT_VERSION: u32 = 1;

/// A whole entity kind's field definitions, choices inline, no values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub entity_type: String,
    pub schema_version: u32,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// One field definition as carried by a schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub field_name: String,

    /// Falls back to the field name when absent
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_label: String,

    pub field_type: FieldType,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_read_only: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,

    /// Falls back to the field's position in the document when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceDescriptor>,
}

/// One choice as carried by a schema document
///
/// Either `value` or `displayText` may be omitted; each falls back to
/// the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceDescriptor {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_text: String,

    #[serde(default)]
    pub sort_order: i64,
}

impl FieldDescriptor {
    /// Operator-facing label, defaulting to the machine name
    pub fn label(&self) -> &str {
        if self.display_label.is_empty() {
            &self.field_name
        } else {
            &self.display_label
        }
    }
}

impl ChoiceDescriptor {
    /// The persisted token, defaulting to the display text
    pub fn token(&self) -> &str {
        if self.value.is_empty() {
            &self.display_text
        } else {
            &self.value
        }
    }

    /// The shown text, defaulting to the token
    pub fn text(&self) -> &str {
        if self.display_text.is_empty() {
            &self.value
        } else {
            &self.display_text
        }
    }
}

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_dropdown_document() {
        let json = r#"{
          "entityType": "Customer",
          "schemaVersion": 1,
          "fields": [
            {
              "fieldName": "PreferredTechnician",
              "displayLabel": "Preferred Technician",
              "fieldType": "Dropdown",
              "isRequired": false,
              "displayOrder": 3,
              "groupName": "Scheduling",
              "choices": [
                { "value": "alice", "displayText": "Alice", "sortOrder": 1 },
                { "value": "bob",   "displayText": "Bob",   "sortOrder": 2 }
              ]
            }
          ]
        }"#;

        let doc: SchemaDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.entity_type, "Customer");
        assert_eq!(doc.schema_version, 1);
        assert_eq!(doc.fields.len(), 1);

        let field = &doc.fields[0];
        assert_eq!(field.field_name, "PreferredTechnician");
        assert_eq!(field.field_type, FieldType::Dropdown);
        assert_eq!(field.display_order, Some(3));
        assert_eq!(field.group_name.as_deref(), Some("Scheduling"));
        assert!(field.is_active);
        assert_eq!(field.choices.len(), 2);
        assert_eq!(field.choices[0].token(), "alice");
    }

    #[test]
    fn test_choice_fallbacks() {
        let value_only = ChoiceDescriptor {
            value: "high".to_string(),
            display_text: String::new(),
            sort_order: 1,
        };
        assert_eq!(value_only.token(), "high");
        assert_eq!(value_only.text(), "high");

        let text_only = ChoiceDescriptor {
            value: String::new(),
            display_text: "High".to_string(),
            sort_order: 1,
        };
        assert_eq!(text_only.token(), "High");
        assert_eq!(text_only.text(), "High");
    }

    #[test]
    fn test_unknown_field_type_fails_parse() {
        let json = r#"{
          "entityType": "Customer",
          "schemaVersion": 1,
          "fields": [ { "fieldName": "X", "fieldType": "Currency" } ]
        }"#;
        assert!(serde_json::from_str::<SchemaDocument>(json).is_err());
    }
}
