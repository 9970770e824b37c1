//! Structural validation of schema documents before import
//!
//! Raw JSON is checked against an embedded JSON Schema first, then the
//! parsed document gets the checks a schema cannot express (uniqueness,
//! cross-field fallbacks). Both passes produce path-tagged issues so an
//! operator can fix the document in one round.

use jsonschema::{validator_for, Validator as JsonValidator};
use rust_embed::Embed;
use serde_json::Value as JsonValue;

use crate::fields::MULTI_SELECT_DELIMITER;
use crate::transfer::document::{SchemaDocument, DOCUMENT_VERSION};

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

const DOCUMENT_SCHEMA: &str = "schema-document.schema.json";

/// One structural problem found in a document
#[derive(Debug, Clone)]
pub struct DocumentIssue {
    /// JSON pointer-ish location ("/fields/2/fieldName")
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for DocumentIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Compiled document validator
pub struct DocumentValidator {
    compiled: JsonValidator,
}

impl DocumentValidator {
    /// Compile the embedded document schema
    ///
    /// The schema is a build asset; failure to compile it is a
    /// packaging bug, so this panics rather than returning an error.
    pub fn new() -> Self {
        let raw = EmbeddedSchemas::get(DOCUMENT_SCHEMA)
            .expect("embedded document schema missing from build");
        let schema_json: JsonValue = serde_json::from_slice(raw.data.as_ref())
            .expect("embedded document schema is not valid JSON");
        let compiled =
            validator_for(&schema_json).expect("embedded document schema does not compile");
        Self { compiled }
    }

    /// Check raw JSON against the wire-format schema
    pub fn check_json(&self, json: &JsonValue) -> Vec<DocumentIssue> {
        self.compiled
            .iter_errors(json)
            .map(|error| DocumentIssue {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect()
    }
}

impl Default for DocumentValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks the JSON Schema cannot express
pub fn check_document(doc: &SchemaDocument) -> Vec<DocumentIssue> {
    let mut issues = Vec::new();

    if doc.entity_type.trim().is_empty() {
        issues.push(DocumentIssue {
            path: "/entityType".to_string(),
            message: "entity type must not be empty".to_string(),
        });
    }

    if doc.schema_version != DOCUMENT_VERSION {
        issues.push(DocumentIssue {
            path: "/schemaVersion".to_string(),
            message: format!(
                "unsupported schema version {} (expected {})",
                doc.schema_version, DOCUMENT_VERSION
            ),
        });
    }

    let mut seen_names: Vec<&str> = Vec::new();
    for (i, field) in doc.fields.iter().enumerate() {
        let field_path = format!("/fields/{}", i);

        let name = field.field_name.trim();
        if name.is_empty() {
            issues.push(DocumentIssue {
                path: format!("{}/fieldName", field_path),
                message: "field name must not be empty".to_string(),
            });
        } else if seen_names.contains(&name) {
            issues.push(DocumentIssue {
                path: format!("{}/fieldName", field_path),
                message: format!("duplicate field name '{}' within document", name),
            });
        } else {
            seen_names.push(name);
        }

        if let Some(pattern) = field.validation_regex.as_deref() {
            if regex::Regex::new(&format!("^(?:{})$", pattern)).is_err() {
                issues.push(DocumentIssue {
                    path: format!("{}/validationRegex", field_path),
                    message: format!("pattern '{}' does not compile", pattern),
                });
            }
        }

        let mut seen_tokens: Vec<&str> = Vec::new();
        for (j, choice) in field.choices.iter().enumerate() {
            let choice_path = format!("{}/choices/{}", field_path, j);
            let token = choice.token();
            if token.trim().is_empty() {
                issues.push(DocumentIssue {
                    path: choice_path,
                    message: "choice needs a value or display text".to_string(),
                });
            } else if token.contains(MULTI_SELECT_DELIMITER) {
                issues.push(DocumentIssue {
                    path: choice_path,
                    message: format!(
                        "choice value '{}' must not contain '{}'",
                        token, MULTI_SELECT_DELIMITER
                    ),
                });
            } else if seen_tokens.contains(&token) {
                issues.push(DocumentIssue {
                    path: choice_path,
                    message: format!("duplicate choice value '{}'", token),
                });
            } else {
                seen_tokens.push(token);
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;
    use crate::transfer::document::{ChoiceDescriptor, FieldDescriptor};

    fn descriptor(name: &str, field_type: FieldType) -> FieldDescriptor {
        FieldDescriptor {
            field_name: name.to_string(),
            display_label: String::new(),
            field_type,
            is_required: false,
            is_read_only: false,
            default_value: None,
            placeholder: None,
            description: None,
            group_name: None,
            display_order: None,
            is_active: true,
            validation_regex: None,
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            choices: Vec::new(),
        }
    }

    #[test]
    fn test_schema_rejects_missing_field_name() {
        let validator = DocumentValidator::new();
        let json: serde_json::Value = serde_json::from_str(
            r#"{ "entityType": "Job", "schemaVersion": 1,
                 "fields": [ { "fieldType": "Text" } ] }"#,
        )
        .unwrap();
        let issues = validator.check_json(&json);
        assert!(!issues.is_empty());
        assert!(issues.iter().any(|i| i.path.starts_with("/fields/0")));
    }

    #[test]
    fn test_schema_rejects_unknown_field_type() {
        let validator = DocumentValidator::new();
        let json: serde_json::Value = serde_json::from_str(
            r#"{ "entityType": "Job", "schemaVersion": 1,
                 "fields": [ { "fieldName": "X", "fieldType": "Currency" } ] }"#,
        )
        .unwrap();
        assert!(!validator.check_json(&json).is_empty());
    }

    #[test]
    fn test_schema_accepts_full_document() {
        let validator = DocumentValidator::new();
        let json: serde_json::Value = serde_json::from_str(
            r#"{
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
            }"#,
        )
        .unwrap();
        assert!(validator.check_json(&json).is_empty());
    }

    #[test]
    fn test_duplicate_names_within_document() {
        let doc = SchemaDocument {
            entity_type: "Job".to_string(),
            schema_version: DOCUMENT_VERSION,
            fields: vec![
                descriptor("Age", FieldType::Number),
                descriptor("Age", FieldType::Text),
            ],
        };
        let issues = check_document(&doc);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("duplicate field name"));
    }

    #[test]
    fn test_version_mismatch_flagged() {
        let doc = SchemaDocument {
            entity_type: "Job".to_string(),
            schema_version: 7,
            fields: Vec::new(),
        };
        let issues = check_document(&doc);
        assert!(issues.iter().any(|i| i.path == "/schemaVersion"));
    }

    #[test]
    fn test_duplicate_choice_tokens_flagged() {
        let mut field = descriptor("Priority", FieldType::Dropdown);
        field.choices = vec![
            ChoiceDescriptor {
                value: "high".to_string(),
                display_text: "High".to_string(),
                sort_order: 1,
            },
            ChoiceDescriptor {
                value: "high".to_string(),
                display_text: "Very High".to_string(),
                sort_order: 2,
            },
        ];
        let doc = SchemaDocument {
            entity_type: "Job".to_string(),
            schema_version: DOCUMENT_VERSION,
            fields: vec![field],
        };
        let issues = check_document(&doc);
        assert!(issues.iter().any(|i| i.message.contains("duplicate choice")));
    }

    #[test]
    fn test_clean_document_has_no_issues() {
        let doc = SchemaDocument {
            entity_type: "Job".to_string(),
            schema_version: DOCUMENT_VERSION,
            fields: vec![descriptor("Age", FieldType::Number)],
        };
        assert!(check_document(&doc).is_empty());
    }
}
