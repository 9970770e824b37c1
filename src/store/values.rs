//! Generic value storage, gated by the validation engine

use chrono::Utc;
use rusqlite::params;

use super::{FieldStore, SchemaError};
use crate::core::identity::FieldId;
use crate::fields::{TypedValue, ValueEntry};
use crate::validate;

impl FieldStore {
    /// Validate and persist one value for one entity instance
    ///
    /// The candidate is validated against the live definition; a
    /// violation is returned to the caller and nothing is written. A
    /// valid empty value clears the stored row. Returns the typed value
    /// that was accepted.
    pub fn set_value(
        &mut self,
        kind: &str,
        entity_id: &str,
        field_id: FieldId,
        raw_value: &str,
    ) -> Result<TypedValue, SchemaError> {
        self.require_kind(kind)?;

        let definition = self.field(field_id)?;
        if definition.entity_kind != kind {
            // The field exists, but not on this entity kind
            return Err(SchemaError::FieldNotFound(field_id));
        }

        let typed = validate::validate(&definition, raw_value)?;

        if typed.is_none() {
            self.conn.execute(
                "DELETE FROM field_values \
                 WHERE entity_kind = ?1 AND entity_id = ?2 AND field_id = ?3",
                params![kind, entity_id, field_id.to_string()],
            )?;
            return Ok(typed);
        }

        self.conn.execute(
            "INSERT INTO field_values (entity_kind, entity_id, field_id, raw_value, updated) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT (entity_kind, entity_id, field_id) \
             DO UPDATE SET raw_value = excluded.raw_value, updated = excluded.updated",
            params![
                kind,
                entity_id,
                field_id.to_string(),
                canonical_raw(&typed),
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(typed)
    }

    /// All stored values for one entity instance, joined with their
    /// current definitions, ordered by display_order then field_name
    ///
    /// Reads are lenient: a value that no longer parses under the
    /// current definition (type changed, choice removed) is returned
    /// as raw text, never dropped. Callers that care about staleness
    /// re-run `validate::validate` per entry.
    pub fn get_values(&self, kind: &str, entity_id: &str) -> Result<Vec<ValueEntry>, SchemaError> {
        self.require_kind(kind)?;

        let mut stmt = self.conn.prepare(
            "SELECT v.field_id, v.raw_value FROM field_values v \
             JOIN field_definitions d ON d.id = v.field_id \
             WHERE v.entity_kind = ?1 AND v.entity_id = ?2 \
             ORDER BY d.display_order, d.field_name",
        )?;
        let rows = stmt.query_map(params![kind, entity_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (field_id_str, raw_value) = row?;
            let field_id = FieldId::parse(&field_id_str).map_err(|e| {
                SchemaError::InvalidFieldSpec(format!("corrupt field id '{}': {}", field_id_str, e))
            })?;
            let definition = self.field(field_id)?;
            let value = validate::coerce(definition.field_type, &raw_value)
                .unwrap_or_else(|_| TypedValue::Text(raw_value.clone()));
            entries.push(ValueEntry {
                definition,
                raw_value,
                value,
            });
        }
        Ok(entries)
    }

    /// Remove every stored value referencing a field (cascade hook)
    pub fn delete_values_for_field(&mut self, field_id: FieldId) -> Result<u64, SchemaError> {
        let removed = self.conn.execute(
            "DELETE FROM field_values WHERE field_id = ?1",
            params![field_id.to_string()],
        )?;
        Ok(removed as u64)
    }

    /// Remove every stored value for one entity instance
    ///
    /// Called by the business layer when it deletes the instance
    /// itself.
    pub fn delete_values_for_instance(
        &mut self,
        kind: &str,
        entity_id: &str,
    ) -> Result<u64, SchemaError> {
        let removed = self.conn.execute(
            "DELETE FROM field_values WHERE entity_kind = ?1 AND entity_id = ?2",
            params![kind, entity_id],
        )?;
        Ok(removed as u64)
    }

    /// Number of stored values referencing a field, across all
    /// instances - exposed so callers can warn before a destructive
    /// delete
    pub fn count_values(&self, field_id: FieldId) -> Result<u64, SchemaError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM field_values WHERE field_id = ?1",
            params![field_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Canonical stored encoding of a typed value
fn canonical_raw(value: &TypedValue) -> String {
    match value {
        TypedValue::Choices(tokens) => tokens.join(","),
        other => other.to_string(),
    }
}
