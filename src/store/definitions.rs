//! Field definition operations and the entity-kind registry

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, FieldStore, SchemaError};
use crate::core::identity::FieldId;
use crate::fields::{FieldDefinition, FieldSpec, FieldType};

const DEFINITION_COLUMNS: &str = "id, entity_kind, field_name, display_label, field_type, \
     required, read_only, default_value, placeholder, description, group_name, \
     display_order, active, validation_regex, min_value, max_value, min_length, \
     max_length, created";

impl FieldStore {
    /// Define a new field for an entity kind
    ///
    /// The field name must be unique within the kind, counting inactive
    /// fields. `display_order` defaults to the current maximum plus one.
    pub fn define_field(&mut self, kind: &str, spec: FieldSpec) -> Result<FieldId, SchemaError> {
        self.require_kind(kind)?;
        check_spec(&spec)?;

        if self.find_field_by_name(kind, &spec.field_name)?.is_some() {
            return Err(SchemaError::DuplicateFieldName {
                entity_kind: kind.to_string(),
                field_name: spec.field_name,
            });
        }

        let display_order = match spec.display_order {
            Some(order) => order,
            None => self.next_display_order(kind)?,
        };

        let id = FieldId::new();
        insert_definition(&self.conn, id, kind, &spec, display_order)?;
        Ok(id)
    }

    /// Replace the mutable attributes of an existing field
    ///
    /// Entity kind and id are immutable. An unspecified `display_order`
    /// keeps the current position.
    pub fn update_field(&mut self, field_id: FieldId, spec: FieldSpec) -> Result<(), SchemaError> {
        let existing = self.field(field_id)?;
        check_spec(&spec)?;

        if spec.field_name != existing.field_name {
            if self
                .find_field_by_name(&existing.entity_kind, &spec.field_name)?
                .is_some()
            {
                return Err(SchemaError::DuplicateFieldName {
                    entity_kind: existing.entity_kind,
                    field_name: spec.field_name,
                });
            }
        }

        let display_order = spec.display_order.unwrap_or(existing.display_order);

        self.conn.execute(
            "UPDATE field_definitions SET field_name = ?2, display_label = ?3, \
             field_type = ?4, required = ?5, read_only = ?6, default_value = ?7, \
             placeholder = ?8, description = ?9, group_name = ?10, display_order = ?11, \
             active = ?12, validation_regex = ?13, min_value = ?14, max_value = ?15, \
             min_length = ?16, max_length = ?17 \
             WHERE id = ?1",
            params![
                field_id.to_string(),
                spec.field_name,
                spec.display_label,
                spec.field_type.as_str(),
                spec.required,
                spec.read_only,
                spec.default_value,
                spec.placeholder,
                spec.description,
                spec.group_name,
                display_order,
                spec.active,
                spec.validation_regex,
                spec.min_value,
                spec.max_value,
                spec.min_length.map(|n| n as i64),
                spec.max_length.map(|n| n as i64),
            ],
        )?;

        Ok(())
    }

    /// Fetch one field definition with its choices loaded
    pub fn field(&self, field_id: FieldId) -> Result<FieldDefinition, SchemaError> {
        let mut definition = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM field_definitions WHERE id = ?1",
                    DEFINITION_COLUMNS
                ),
                params![field_id.to_string()],
                definition_from_row,
            )
            .optional()?
            .ok_or(SchemaError::FieldNotFound(field_id))?;

        definition.choices = self.choices(field_id)?;
        Ok(definition)
    }

    /// List an entity kind's fields, active and inactive, ordered by
    /// display_order then field_name, with choices loaded
    pub fn list_fields(&self, kind: &str) -> Result<Vec<FieldDefinition>, SchemaError> {
        self.require_kind(kind)?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM field_definitions WHERE entity_kind = ?1 \
             ORDER BY display_order, field_name",
            DEFINITION_COLUMNS
        ))?;
        let rows = stmt.query_map(params![kind], definition_from_row)?;

        let mut definitions = Vec::new();
        for row in rows {
            let mut definition = row?;
            definition.choices = self.choices(definition.id)?;
            definitions.push(definition);
        }
        Ok(definitions)
    }

    /// Delete a field, its choices, and every value referencing it, as
    /// one transaction
    pub fn delete_field(&mut self, field_id: FieldId) -> Result<(), SchemaError> {
        let id = field_id.to_string();
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM field_values WHERE field_id = ?1", params![id])?;
        tx.execute("DELETE FROM field_choices WHERE field_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM field_definitions WHERE id = ?1", params![id])?;

        if deleted == 0 {
            // Nothing was removed; roll back by dropping the transaction.
            return Err(SchemaError::FieldNotFound(field_id));
        }

        tx.commit()?;
        Ok(())
    }

    /// Look up a field id by its machine name within an entity kind
    pub fn find_field_by_name(
        &self,
        kind: &str,
        field_name: &str,
    ) -> Result<Option<FieldId>, SchemaError> {
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM field_definitions WHERE entity_kind = ?1 AND field_name = ?2",
                params![kind, field_name],
                |row| row.get(0),
            )
            .optional()?;

        match id {
            Some(s) => Ok(Some(FieldId::parse(&s).map_err(|e| {
                SchemaError::InvalidFieldSpec(format!("corrupt field id '{}': {}", s, e))
            })?)),
            None => Ok(None),
        }
    }

    /// List the registered entity kinds, built-ins first
    pub fn entity_kinds(&self) -> Result<Vec<String>, SchemaError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM entity_kinds ORDER BY builtin DESC, name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Register an additional entity kind; registering an existing kind
    /// is a no-op
    pub fn register_entity_kind(&mut self, name: &str) -> Result<(), SchemaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::UnknownEntityKind(String::new()));
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO entity_kinds (name, builtin) VALUES (?1, 0)",
            params![name],
        )?;
        Ok(())
    }

    /// Resolve an entity kind against the registry
    pub(crate) fn require_kind(&self, kind: &str) -> Result<(), SchemaError> {
        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM entity_kinds WHERE name = ?1",
                params![kind],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(SchemaError::UnknownEntityKind(kind.to_string()));
        }
        Ok(())
    }

    fn next_display_order(&self, kind: &str) -> Result<i64, SchemaError> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(display_order) FROM field_definitions WHERE entity_kind = ?1",
            params![kind],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0) + 1)
    }
}

/// Insert a definition row; shared with the import service so document
/// imports run inside one transaction
pub(crate) fn insert_definition(
    conn: &rusqlite::Connection,
    id: FieldId,
    kind: &str,
    spec: &FieldSpec,
    display_order: i64,
) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO field_definitions (id, entity_kind, field_name, display_label, \
         field_type, required, read_only, default_value, placeholder, description, \
         group_name, display_order, active, validation_regex, min_value, max_value, \
         min_length, max_length, created) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, \
         ?16, ?17, ?18, ?19)",
        params![
            id.to_string(),
            kind,
            spec.field_name,
            spec.display_label,
            spec.field_type.as_str(),
            spec.required,
            spec.read_only,
            spec.default_value,
            spec.placeholder,
            spec.description,
            spec.group_name,
            display_order,
            spec.active,
            spec.validation_regex,
            spec.min_value,
            spec.max_value,
            spec.min_length.map(|n| n as i64),
            spec.max_length.map(|n| n as i64),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Whether a (kind, field_name) pair is already defined
pub(crate) fn definition_exists(
    conn: &rusqlite::Connection,
    kind: &str,
    field_name: &str,
) -> Result<bool, SchemaError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM field_definitions WHERE entity_kind = ?1 AND field_name = ?2",
            params![kind, field_name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Delete every definition for a kind plus dependent choices and
/// values; runs on the caller's transaction
pub(crate) fn delete_definitions_for_kind(
    conn: &rusqlite::Connection,
    kind: &str,
) -> Result<(), SchemaError> {
    conn.execute(
        "DELETE FROM field_values WHERE field_id IN \
         (SELECT id FROM field_definitions WHERE entity_kind = ?1)",
        params![kind],
    )?;
    conn.execute(
        "DELETE FROM field_choices WHERE field_id IN \
         (SELECT id FROM field_definitions WHERE entity_kind = ?1)",
        params![kind],
    )?;
    conn.execute(
        "DELETE FROM field_definitions WHERE entity_kind = ?1",
        params![kind],
    )?;
    Ok(())
}

/// Reject specs no definition should ever carry
pub(crate) fn check_spec(spec: &FieldSpec) -> Result<(), SchemaError> {
    if spec.field_name.trim().is_empty() {
        return Err(SchemaError::InvalidFieldSpec(
            "field name must not be empty".to_string(),
        ));
    }
    if let Some(pattern) = spec.validation_regex.as_deref() {
        if let Err(e) = regex::Regex::new(&format!("^(?:{})$", pattern)) {
            return Err(SchemaError::InvalidFieldSpec(format!(
                "validation pattern does not compile: {}",
                e
            )));
        }
    }
    Ok(())
}

fn definition_from_row(row: &Row<'_>) -> rusqlite::Result<FieldDefinition> {
    let id_str: String = row.get(0)?;
    let id = FieldId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let type_str: String = row.get(4)?;
    let field_type: FieldType = type_str.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            e.into(),
        )
    })?;

    Ok(FieldDefinition {
        id,
        entity_kind: row.get(1)?,
        field_name: row.get(2)?,
        display_label: row.get(3)?,
        field_type,
        required: row.get(5)?,
        read_only: row.get(6)?,
        default_value: row.get(7)?,
        placeholder: row.get(8)?,
        description: row.get(9)?,
        group_name: row.get(10)?,
        display_order: row.get(11)?,
        active: row.get(12)?,
        validation_regex: row.get(13)?,
        min_value: row.get(14)?,
        max_value: row.get(15)?,
        min_length: row.get::<_, Option<i64>>(16)?.map(|n| n as usize),
        max_length: row.get::<_, Option<i64>>(17)?.map(|n| n as usize),
        created: parse_datetime(&row.get::<_, String>(18)?),
        choices: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;

    fn store() -> FieldStore {
        FieldStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_define_and_fetch() {
        let mut store = store();
        let id = store
            .define_field(
                "Customer",
                FieldSpec::new("Age", "Age", FieldType::Number)
                    .required(true)
                    .min_value(0.0),
            )
            .unwrap();

        let def = store.field(id).unwrap();
        assert_eq!(def.entity_kind, "Customer");
        assert_eq!(def.field_name, "Age");
        assert_eq!(def.field_type, FieldType::Number);
        assert!(def.required);
        assert_eq!(def.min_value, Some(0.0));
        assert_eq!(def.display_order, 1);
    }

    #[test]
    fn test_duplicate_field_name_rejected() {
        let mut store = store();
        store
            .define_field("Customer", FieldSpec::new("Age", "Age", FieldType::Number))
            .unwrap();

        let err = store
            .define_field("Customer", FieldSpec::new("Age", "Age", FieldType::Text))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFieldName { .. }));

        // The first definition is untouched
        let fields = store.list_fields("Customer").unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_type, FieldType::Number);
    }

    #[test]
    fn test_duplicate_check_counts_inactive_fields() {
        let mut store = store();
        store
            .define_field(
                "Customer",
                FieldSpec::new("Age", "Age", FieldType::Number).active(false),
            )
            .unwrap();

        let err = store
            .define_field("Customer", FieldSpec::new("Age", "Age", FieldType::Number))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFieldName { .. }));
    }

    #[test]
    fn test_same_name_allowed_across_kinds() {
        let mut store = store();
        store
            .define_field("Customer", FieldSpec::new("Age", "Age", FieldType::Number))
            .unwrap();
        store
            .define_field("Asset", FieldSpec::new("Age", "Age", FieldType::Number))
            .unwrap();
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let mut store = store();
        let err = store
            .define_field("Starship", FieldSpec::new("Age", "Age", FieldType::Number))
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownEntityKind(_)));
    }

    #[test]
    fn test_display_order_assignment_and_tie_break() {
        let mut store = store();
        store
            .define_field("Job", FieldSpec::new("Beta", "Beta", FieldType::Text))
            .unwrap();
        store
            .define_field("Job", FieldSpec::new("Alpha", "Alpha", FieldType::Text))
            .unwrap();
        // Explicit order colliding with Beta's: tie broken by name
        store
            .define_field(
                "Job",
                FieldSpec::new("Aardvark", "Aardvark", FieldType::Text).display_order(1),
            )
            .unwrap();

        let names: Vec<String> = store
            .list_fields("Job")
            .unwrap()
            .into_iter()
            .map(|f| f.field_name)
            .collect();
        assert_eq!(names, vec!["Aardvark", "Beta", "Alpha"]);
    }

    #[test]
    fn test_update_replaces_attributes() {
        let mut store = store();
        let id = store
            .define_field(
                "Customer",
                FieldSpec::new("Age", "Age", FieldType::Number).min_value(0.0),
            )
            .unwrap();

        store
            .update_field(
                id,
                FieldSpec::new("Age", "Age (years)", FieldType::Number)
                    .min_value(18.0)
                    .max_value(120.0),
            )
            .unwrap();

        let def = store.field(id).unwrap();
        assert_eq!(def.display_label, "Age (years)");
        assert_eq!(def.min_value, Some(18.0));
        assert_eq!(def.max_value, Some(120.0));
        assert_eq!(def.display_order, 1); // kept
    }

    #[test]
    fn test_update_unknown_field() {
        let mut store = store();
        let err = store
            .update_field(FieldId::new(), FieldSpec::new("X", "X", FieldType::Text))
            .unwrap_err();
        assert!(matches!(err, SchemaError::FieldNotFound(_)));
    }

    #[test]
    fn test_update_rename_onto_existing_name() {
        let mut store = store();
        store
            .define_field("Customer", FieldSpec::new("Age", "Age", FieldType::Number))
            .unwrap();
        let other = store
            .define_field("Customer", FieldSpec::new("Tier", "Tier", FieldType::Text))
            .unwrap();

        let err = store
            .update_field(other, FieldSpec::new("Age", "Age", FieldType::Text))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateFieldName { .. }));
    }

    #[test]
    fn test_invalid_regex_rejected_at_define() {
        let mut store = store();
        let err = store
            .define_field(
                "Customer",
                FieldSpec::new("Zip", "Zip", FieldType::Text).validation_regex("("),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidFieldSpec(_)));
    }

    #[test]
    fn test_delete_unknown_field() {
        let mut store = store();
        let err = store.delete_field(FieldId::new()).unwrap_err();
        assert!(matches!(err, SchemaError::FieldNotFound(_)));
    }

    #[test]
    fn test_register_kind_idempotent() {
        let mut store = store();
        store.register_entity_kind("Contract").unwrap();
        store.register_entity_kind("Contract").unwrap();
        let kinds = store.entity_kinds().unwrap();
        assert_eq!(kinds.iter().filter(|k| *k == "Contract").count(), 1);
    }
}
