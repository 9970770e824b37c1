//! SQLite-backed schema store
//!
//! This module owns the single shared database behind the engine:
//! field definitions and the entity-kind registry, choice lists, and
//! generically stored per-instance values. Unlike a rebuildable cache,
//! this database is the system of record, so a schema-version mismatch
//! is an error rather than a drop-and-rebuild.

pub(crate) mod choices;
pub(crate) mod definitions;
mod schema;
mod values;

use std::fs;

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use rusqlite::Connection;
use thiserror::Error;

use crate::core::identity::{ChoiceId, FieldId};
use crate::core::project::Project;
use crate::core::Config;
use crate::validate::Violation;

/// Current schema version - opening a store written by a different
/// version fails rather than migrating silently
const SCHEMA_VERSION: i32 = 1;

/// The schema store backed by SQLite
#[derive(Debug)]
pub struct FieldStore {
    conn: Connection,
}

impl FieldStore {
    /// Open or create the store for a project
    ///
    /// Extra entity kinds from configuration are registered on open.
    pub fn open(project: &Project, config: &Config) -> Result<Self, SchemaError> {
        let db_path = project.db_path();
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent).map_err(|e| SchemaError::Io(e.to_string()))?;
        }

        let needs_init = !db_path.exists();
        let conn = Connection::open(&db_path)?;
        let mut store = Self::from_connection(conn, needs_init)?;

        for kind in &config.extra_kinds {
            store.register_entity_kind(kind)?;
        }

        Ok(store)
    }

    /// Open an in-memory store (tests and embedding callers)
    pub fn open_in_memory() -> Result<Self, SchemaError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, true)
    }

    /// Raw connection access for the import service's transactions
    pub(crate) fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    fn from_connection(conn: Connection, needs_init: bool) -> Result<Self, SchemaError> {
        // WAL for concurrent readers; enforce the FK contract between
        // definitions, choices and values.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

        let mut store = Self { conn };

        if needs_init {
            store.init_schema()?;
        } else {
            let found: i32 = store
                .conn
                .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                    row.get(0)
                })
                .unwrap_or(0);
            if found != SCHEMA_VERSION {
                return Err(SchemaError::UnsupportedSchemaVersion {
                    found,
                    expected: SCHEMA_VERSION,
                });
            }
        }

        Ok(store)
    }
}

/// Parse a stored RFC 3339 timestamp, defaulting to now on corruption
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Errors raised by store operations
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("a field named '{field_name}' already exists for {entity_kind}")]
    #[diagnostic(code(fieldbook::store::duplicate_field_name))]
    DuplicateFieldName {
        entity_kind: String,
        field_name: String,
    },

    #[error("field {0} not found")]
    #[diagnostic(code(fieldbook::store::field_not_found))]
    FieldNotFound(FieldId),

    #[error("choice {0} not found")]
    #[diagnostic(code(fieldbook::store::choice_not_found))]
    ChoiceNotFound(ChoiceId),

    #[error("unknown entity kind '{0}'")]
    #[diagnostic(code(fieldbook::store::unknown_entity_kind))]
    UnknownEntityKind(String),

    #[error("choice value '{value}' already exists for field {field_id}")]
    #[diagnostic(code(fieldbook::store::duplicate_choice_value))]
    DuplicateChoiceValue { field_id: FieldId, value: String },

    #[error("invalid choice value: {0}")]
    #[diagnostic(code(fieldbook::store::invalid_choice_value))]
    InvalidChoiceValue(String),

    #[error("invalid field definition: {0}")]
    #[diagnostic(code(fieldbook::store::invalid_field_spec))]
    InvalidFieldSpec(String),

    #[error("store was written by schema version {found}, this build expects {expected}")]
    #[diagnostic(code(fieldbook::store::unsupported_schema_version))]
    UnsupportedSchemaVersion { found: i32, expected: i32 },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Violation(#[from] Violation),

    #[error("storage error: {0}")]
    #[diagnostic(code(fieldbook::store::storage))]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(fieldbook::store::io))]
    Io(String),
}
