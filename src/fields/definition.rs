//! Field definition - the schema description of one custom attribute

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::FieldId;
use crate::fields::choice::Choice;
use crate::fields::field_type::FieldType;

/// One extra attribute attachable to instances of a fixed entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Unique identifier
    pub id: FieldId,

    /// Fixed entity kind this attribute extends (e.g. "Customer")
    pub entity_kind: String,

    /// Machine key, unique within the entity kind
    pub field_name: String,

    /// Label shown to the operator
    pub display_label: String,

    /// Value type; decides which constraints below are meaningful
    pub field_type: FieldType,

    /// Whether a value must be present on save
    #[serde(default)]
    pub required: bool,

    /// Whether the rendering UI should refuse edits
    #[serde(default)]
    pub read_only: bool,

    /// Suggested initial value, string-encoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Input placeholder text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Operator-facing help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional UI grouping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,

    /// Position among the kind's fields; ties broken by field_name
    pub display_order: i64,

    /// Soft-disable flag; inactive fields stay listed and keep values
    #[serde(default = "default_active")]
    pub active: bool,

    /// Full-match pattern for text fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_regex: Option<String>,

    /// Inclusive lower bound for numeric fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,

    /// Inclusive upper bound for numeric fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,

    /// Inclusive minimum length for text fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    /// Inclusive maximum length for text fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Choice list, ordered by sort_order (empty unless choice-bearing)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

fn default_active() -> bool {
    true
}

/// The mutable attributes of a field definition, used by define and update
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    pub field_name: String,
    pub display_label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub read_only: bool,
    pub default_value: Option<String>,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub group_name: Option<String>,
    /// Assigned max+1 within the entity kind when unspecified
    pub display_order: Option<i64>,
    pub active: bool,
    pub validation_regex: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl FieldSpec {
    /// Create a spec with the attributes every definition needs
    pub fn new(
        field_name: impl Into<String>,
        display_label: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            display_label: display_label.into(),
            field_type,
            active: true,
            ..Default::default()
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    pub fn display_order(mut self, order: i64) -> Self {
        self.display_order = Some(order);
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn validation_regex(mut self, pattern: impl Into<String>) -> Self {
        self.validation_regex = Some(pattern.into());
        self
    }

    pub fn min_value(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}
