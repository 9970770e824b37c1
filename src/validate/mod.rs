//! Validation engine for candidate field values
//!
//! `validate` is a pure function of (definition, candidate). Checks run
//! in a fixed order and stop at the first failure, so a given input
//! always reports the same single violation. Constraint attributes that
//! do not apply to the definition's type are ignored even when
//! populated; changing a field's type does not retroactively clear
//! constraints entered for the old type.

use chrono::NaiveDate;
use miette::Diagnostic;
use thiserror::Error;

use crate::fields::{FieldDefinition, FieldType, TypedValue, MULTI_SELECT_DELIMITER};

/// A rejected candidate value, with the first failed check
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum Violation {
    #[error("a value is required")]
    #[diagnostic(code(fieldbook::validate::required))]
    Required,

    #[error("'{value}' is not a valid {expected}")]
    #[diagnostic(code(fieldbook::validate::type_mismatch))]
    TypeMismatch { value: String, expected: &'static str },

    #[error("{value} is outside the allowed range [{min}, {max}]")]
    #[diagnostic(code(fieldbook::validate::range))]
    Range { value: f64, min: f64, max: f64 },

    #[error("length {length} is outside the allowed range [{min}, {max}]")]
    #[diagnostic(code(fieldbook::validate::length))]
    Length {
        length: usize,
        min: usize,
        max: usize,
    },

    #[error("'{value}' does not match the required pattern '{pattern}'")]
    #[diagnostic(code(fieldbook::validate::pattern))]
    Pattern { value: String, pattern: String },

    #[error("'{token}' is not one of the allowed choices")]
    #[diagnostic(code(fieldbook::validate::invalid_choice))]
    InvalidChoice { token: String },
}

/// Validate a candidate value against a field definition
///
/// Returns the typed value that passed every applicable check, or the
/// first violation encountered. The check order is fixed:
/// required, emptiness, type coercion, numeric range, string length,
/// pattern, choice membership.
pub fn validate(definition: &FieldDefinition, candidate: &str) -> Result<TypedValue, Violation> {
    let trimmed = candidate.trim();

    // 1. Required
    if trimmed.is_empty() {
        if definition.required {
            return Err(Violation::Required);
        }
        // 2. Empty and not required
        return Ok(TypedValue::None);
    }

    // 3. Type coercion
    let typed = coerce(definition.field_type, trimmed)?;

    // 4. Numeric range
    if definition.field_type.has_numeric_range() {
        let numeric = match typed {
            TypedValue::Integer(n) => Some(n as f64),
            TypedValue::Decimal(n) => Some(n),
            _ => None,
        };
        if let Some(n) = numeric {
            let min = definition.min_value.unwrap_or(f64::NEG_INFINITY);
            let max = definition.max_value.unwrap_or(f64::INFINITY);
            if (definition.min_value.is_some() || definition.max_value.is_some())
                && !(n >= min && n <= max)
            {
                return Err(Violation::Range {
                    value: n,
                    min,
                    max,
                });
            }
        }
    }

    // 5. String length
    if definition.field_type.has_length()
        && (definition.min_length.is_some() || definition.max_length.is_some())
    {
        let length = trimmed.chars().count();
        let min = definition.min_length.unwrap_or(0);
        let max = definition.max_length.unwrap_or(usize::MAX);
        if length < min || length > max {
            return Err(Violation::Length { length, min, max });
        }
    }

    // 6. Pattern
    if definition.field_type.has_pattern() {
        if let Some(pattern) = definition.validation_regex.as_deref() {
            // A stored pattern that no longer compiles is treated like
            // any other stale constraint: skipped.
            if let Ok(re) = regex::Regex::new(&format!("^(?:{})$", pattern)) {
                if !re.is_match(trimmed) {
                    return Err(Violation::Pattern {
                        value: trimmed.to_string(),
                        pattern: pattern.to_string(),
                    });
                }
            }
        }
    }

    // 7. Choice membership
    if definition.field_type.has_choices() {
        let tokens: Vec<&str> = match &typed {
            TypedValue::Choices(tokens) => tokens.iter().map(String::as_str).collect(),
            TypedValue::Choice(token) => vec![token.as_str()],
            _ => Vec::new(),
        };
        for token in tokens {
            if !definition.choices.iter().any(|c| c.value == token) {
                return Err(Violation::InvalidChoice {
                    token: token.to_string(),
                });
            }
        }
    }

    Ok(typed)
}

/// Coerce a non-empty raw string into the definition's value type
///
/// Shared with the value store's lenient reads, which fall back to
/// `TypedValue::Text` when coercion fails instead of surfacing the
/// mismatch.
pub fn coerce(field_type: FieldType, raw: &str) -> Result<TypedValue, Violation> {
    match field_type {
        FieldType::Text => Ok(TypedValue::Text(raw.to_string())),
        FieldType::Number => raw
            .parse::<i64>()
            .map(TypedValue::Integer)
            .map_err(|_| Violation::TypeMismatch {
                value: raw.to_string(),
                expected: "whole number",
            }),
        FieldType::Decimal => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(TypedValue::Decimal(n)),
            _ => Err(Violation::TypeMismatch {
                value: raw.to_string(),
                expected: "decimal number",
            }),
        },
        FieldType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(TypedValue::Date)
            .map_err(|_| Violation::TypeMismatch {
                value: raw.to_string(),
                expected: "date (YYYY-MM-DD)",
            }),
        FieldType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" => Ok(TypedValue::Boolean(true)),
            "false" => Ok(TypedValue::Boolean(false)),
            _ => Err(Violation::TypeMismatch {
                value: raw.to_string(),
                expected: "boolean (true/false)",
            }),
        },
        FieldType::Dropdown | FieldType::Radio => Ok(TypedValue::Choice(raw.to_string())),
        FieldType::MultiSelect => {
            let tokens: Vec<String> = raw
                .split(MULTI_SELECT_DELIMITER)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
            Ok(TypedValue::Choices(tokens))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::FieldId;
    use crate::fields::{Choice, FieldSpec};
    use chrono::Utc;

    fn definition(spec: FieldSpec, choices: Vec<(&str, &str)>) -> FieldDefinition {
        let id = FieldId::new();
        let choices = choices
            .into_iter()
            .enumerate()
            .map(|(i, (text, value))| {
                Choice::new(id, text, Some(value.to_string()), i as i64 + 1)
            })
            .collect();
        FieldDefinition {
            id,
            entity_kind: "Customer".to_string(),
            field_name: spec.field_name,
            display_label: spec.display_label,
            field_type: spec.field_type,
            required: spec.required,
            read_only: spec.read_only,
            default_value: spec.default_value,
            placeholder: spec.placeholder,
            description: spec.description,
            group_name: spec.group_name,
            display_order: spec.display_order.unwrap_or(1),
            active: spec.active,
            validation_regex: spec.validation_regex,
            min_value: spec.min_value,
            max_value: spec.max_value,
            min_length: spec.min_length,
            max_length: spec.max_length,
            created: Utc::now(),
            choices,
        }
    }

    #[test]
    fn test_number_without_range() {
        let def = definition(FieldSpec::new("Age", "Age", FieldType::Number), vec![]);

        assert_eq!(
            validate(&def, "abc"),
            Err(Violation::TypeMismatch {
                value: "abc".to_string(),
                expected: "whole number",
            })
        );
        assert_eq!(validate(&def, "42"), Ok(TypedValue::Integer(42)));
    }

    #[test]
    fn test_decimal_range_inclusive() {
        let def = definition(
            FieldSpec::new("Score", "Score", FieldType::Decimal)
                .min_value(0.0)
                .max_value(100.0),
            vec![],
        );

        assert!(matches!(
            validate(&def, "150"),
            Err(Violation::Range { .. })
        ));
        assert_eq!(validate(&def, "50"), Ok(TypedValue::Decimal(50.0)));
        assert_eq!(validate(&def, "0"), Ok(TypedValue::Decimal(0.0)));
        assert_eq!(validate(&def, "100"), Ok(TypedValue::Decimal(100.0)));
    }

    #[test]
    fn test_required_precedes_type_check() {
        let def = definition(
            FieldSpec::new("Age", "Age", FieldType::Number).required(true),
            vec![],
        );
        assert_eq!(validate(&def, "  "), Err(Violation::Required));
    }

    #[test]
    fn test_empty_optional_is_none() {
        let def = definition(FieldSpec::new("Age", "Age", FieldType::Number), vec![]);
        assert_eq!(validate(&def, ""), Ok(TypedValue::None));
    }

    #[test]
    fn test_boolean_lexical_space() {
        let def = definition(FieldSpec::new("Flag", "Flag", FieldType::Boolean), vec![]);
        assert_eq!(validate(&def, "TRUE"), Ok(TypedValue::Boolean(true)));
        assert_eq!(validate(&def, "false"), Ok(TypedValue::Boolean(false)));
        assert!(matches!(
            validate(&def, "yes"),
            Err(Violation::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_date_parsing() {
        let def = definition(FieldSpec::new("Due", "Due", FieldType::Date), vec![]);
        assert_eq!(
            validate(&def, "2024-03-01"),
            Ok(TypedValue::Date(
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
            ))
        );
        assert!(matches!(
            validate(&def, "03/01/2024"),
            Err(Violation::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_length_bounds() {
        let def = definition(
            FieldSpec::new("Code", "Code", FieldType::Text)
                .min_length(2)
                .max_length(4),
            vec![],
        );
        assert!(matches!(validate(&def, "a"), Err(Violation::Length { .. })));
        assert!(matches!(
            validate(&def, "abcde"),
            Err(Violation::Length { .. })
        ));
        assert_eq!(
            validate(&def, "abc"),
            Ok(TypedValue::Text("abc".to_string()))
        );
    }

    #[test]
    fn test_pattern_full_match() {
        let def = definition(
            FieldSpec::new("Zip", "Zip", FieldType::Text).validation_regex(r"\d{5}"),
            vec![],
        );
        assert_eq!(
            validate(&def, "12345"),
            Ok(TypedValue::Text("12345".to_string()))
        );
        // A partial match is not enough
        assert!(matches!(
            validate(&def, "12345-6789"),
            Err(Violation::Pattern { .. })
        ));
    }

    #[test]
    fn test_dropdown_membership() {
        let def = definition(
            FieldSpec::new("Priority", "Priority", FieldType::Dropdown),
            vec![("Low", "Low"), ("Normal", "Normal"), ("High", "High")],
        );
        assert_eq!(
            validate(&def, "Critical"),
            Err(Violation::InvalidChoice {
                token: "Critical".to_string()
            })
        );
        assert_eq!(
            validate(&def, "High"),
            Ok(TypedValue::Choice("High".to_string()))
        );
    }

    #[test]
    fn test_multi_select_any_bad_token_fails() {
        let def = definition(
            FieldSpec::new("Tags", "Tags", FieldType::MultiSelect),
            vec![("A", "a"), ("B", "b")],
        );
        assert_eq!(
            validate(&def, "a, b"),
            Ok(TypedValue::Choices(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(
            validate(&def, "a, x"),
            Err(Violation::InvalidChoice {
                token: "x".to_string()
            })
        );
    }

    #[test]
    fn test_stale_constraints_ignored_for_other_types() {
        // Range and length constraints left behind after a type change
        // must not affect a Dropdown.
        let mut def = definition(
            FieldSpec::new("Priority", "Priority", FieldType::Dropdown),
            vec![("High", "High")],
        );
        def.min_value = Some(10.0);
        def.max_value = Some(20.0);
        def.min_length = Some(50);
        def.validation_regex = Some(r"\d+".to_string());

        assert_eq!(
            validate(&def, "High"),
            Ok(TypedValue::Choice("High".to_string()))
        );
    }

    #[test]
    fn test_invalid_stored_pattern_is_skipped() {
        let def = definition(
            FieldSpec::new("Code", "Code", FieldType::Text).validation_regex("("),
            vec![],
        );
        assert_eq!(
            validate(&def, "anything"),
            Ok(TypedValue::Text("anything".to_string()))
        );
    }

    #[test]
    fn test_decimal_rejects_non_finite() {
        let def = definition(FieldSpec::new("Score", "Score", FieldType::Decimal), vec![]);
        assert!(matches!(
            validate(&def, "NaN"),
            Err(Violation::TypeMismatch { .. })
        ));
        assert!(matches!(
            validate(&def, "inf"),
            Err(Violation::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_multi_select_empty_tokens_dropped() {
        let def = definition(
            FieldSpec::new("Tags", "Tags", FieldType::MultiSelect),
            vec![("A", "a")],
        );
        assert_eq!(
            validate(&def, "a, , a"),
            Ok(TypedValue::Choices(vec!["a".to_string(), "a".to_string()]))
        );
    }
}
