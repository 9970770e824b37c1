//! Identifier types for schema records, using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Identifier for a field definition (`FLD-<ulid>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(Ulid);

/// Identifier for a choice row (`CHC-<ulid>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChoiceId(Ulid);

macro_rules! prefixed_id {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Generate a fresh identifier
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// The string prefix for this identifier type
            pub const fn prefix() -> &'static str {
                $prefix
            }

            /// Reconstruct from an existing ULID
            pub fn from_ulid(ulid: Ulid) -> Self {
                Self(ulid)
            }

            /// The ULID component
            pub fn ulid(&self) -> Ulid {
                self.0
            }

            /// Parse an identifier from a string
            pub fn parse(s: &str) -> Result<Self, IdParseError> {
                s.parse()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let (prefix, ulid_str) = s
                    .split_once('-')
                    .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

                if !prefix.eq_ignore_ascii_case($prefix) {
                    return Err(IdParseError::WrongPrefix {
                        expected: $prefix,
                        found: prefix.to_string(),
                    });
                }

                let ulid = Ulid::from_string(ulid_str)
                    .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

                Ok(Self(ulid))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

prefixed_id!(FieldId, "FLD");
prefixed_id!(ChoiceId, "CHC");

/// Errors that can occur when parsing identifiers
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("wrong identifier prefix: expected '{expected}', found '{found}'")]
    WrongPrefix {
        expected: &'static str,
        found: String,
    },

    #[error("missing '-' delimiter in identifier: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}
