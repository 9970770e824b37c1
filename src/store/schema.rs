//! Database schema initialization

use rusqlite::params;

use super::{FieldStore, SchemaError, SCHEMA_VERSION};

/// Entity kinds every installation starts with
pub(super) const BUILTIN_KINDS: &[&str] =
    &["Customer", "Site", "Asset", "Job", "Estimate", "Invoice"];

impl FieldStore {
    /// Initialize database schema
    pub(super) fn init_schema(&mut self) -> Result<(), SchemaError> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Entity kind registry (the fixed business record types)
            CREATE TABLE IF NOT EXISTS entity_kinds (
                name TEXT PRIMARY KEY,
                builtin INTEGER NOT NULL DEFAULT 0
            );

            -- Field definitions (one custom attribute per row)
            CREATE TABLE IF NOT EXISTS field_definitions (
                id TEXT PRIMARY KEY,
                entity_kind TEXT NOT NULL REFERENCES entity_kinds(name),
                field_name TEXT NOT NULL,
                display_label TEXT NOT NULL,
                field_type TEXT NOT NULL,
                required INTEGER NOT NULL DEFAULT 0,
                read_only INTEGER NOT NULL DEFAULT 0,
                default_value TEXT,
                placeholder TEXT,
                description TEXT,
                group_name TEXT,
                display_order INTEGER NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                validation_regex TEXT,
                min_value REAL,
                max_value REAL,
                min_length INTEGER,
                max_length INTEGER,
                created TEXT NOT NULL,
                UNIQUE (entity_kind, field_name)
            );
            CREATE INDEX IF NOT EXISTS idx_field_definitions_kind
                ON field_definitions(entity_kind);

            -- Choice lists for enumerated field types
            CREATE TABLE IF NOT EXISTS field_choices (
                id TEXT PRIMARY KEY,
                field_id TEXT NOT NULL
                    REFERENCES field_definitions(id) ON DELETE CASCADE,
                display_text TEXT NOT NULL,
                value TEXT NOT NULL,
                sort_order INTEGER NOT NULL,
                UNIQUE (field_id, value)
            );
            CREATE INDEX IF NOT EXISTS idx_field_choices_field
                ON field_choices(field_id);

            -- Stored values, one row per (kind, instance, field)
            CREATE TABLE IF NOT EXISTS field_values (
                entity_kind TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                field_id TEXT NOT NULL
                    REFERENCES field_definitions(id) ON DELETE CASCADE,
                raw_value TEXT NOT NULL,
                updated TEXT NOT NULL,
                PRIMARY KEY (entity_kind, entity_id, field_id)
            );
            CREATE INDEX IF NOT EXISTS idx_field_values_field
                ON field_values(field_id);
            CREATE INDEX IF NOT EXISTS idx_field_values_instance
                ON field_values(entity_kind, entity_id);
            "#,
        )?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        for kind in BUILTIN_KINDS {
            self.conn.execute(
                "INSERT OR IGNORE INTO entity_kinds (name, builtin) VALUES (?1, 1)",
                params![kind],
            )?;
        }

        Ok(())
    }
}
