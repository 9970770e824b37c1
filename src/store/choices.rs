//! Choice list operations

use rusqlite::{params, OptionalExtension, Row};

use super::{FieldStore, SchemaError};
use crate::core::identity::{ChoiceId, FieldId};
use crate::fields::{Choice, MULTI_SELECT_DELIMITER};

impl FieldStore {
    /// Add a choice to a field's list
    ///
    /// The persisted token defaults to the display text. Tokens must be
    /// non-empty, free of the list delimiter, and unique within the
    /// field. Adding choices to a non-choice-bearing field is accepted;
    /// the validation engine simply never consults them.
    pub fn add_choice(
        &mut self,
        field_id: FieldId,
        display_text: &str,
        value: Option<String>,
    ) -> Result<ChoiceId, SchemaError> {
        // Field must exist, whatever its type
        self.field(field_id)?;

        let token = value.unwrap_or_else(|| display_text.to_string());
        check_choice_value(&token)?;

        if self.find_choice_by_value(field_id, &token)?.is_some() {
            return Err(SchemaError::DuplicateChoiceValue {
                field_id,
                value: token,
            });
        }

        let sort_order = self.next_sort_order(field_id)?;
        let id = ChoiceId::new();
        insert_choice(&self.conn, id, field_id, display_text, &token, sort_order)?;
        Ok(id)
    }

    /// Remove a single choice
    ///
    /// Stored values that reference the removed token are left in
    /// place; reads stay lenient about formerly valid selections.
    pub fn remove_choice(&mut self, choice_id: ChoiceId) -> Result<(), SchemaError> {
        let removed = self.conn.execute(
            "DELETE FROM field_choices WHERE id = ?1",
            params![choice_id.to_string()],
        )?;
        if removed == 0 {
            return Err(SchemaError::ChoiceNotFound(choice_id));
        }
        Ok(())
    }

    /// Rewrite a field's choice ordering
    ///
    /// The id list must be a permutation of the field's current
    /// choices.
    pub fn reorder_choices(
        &mut self,
        field_id: FieldId,
        ordered: &[ChoiceId],
    ) -> Result<(), SchemaError> {
        let current = self.choices(field_id)?;
        if current.is_empty() && ordered.is_empty() {
            self.field(field_id)?;
            return Ok(());
        }

        if current.len() != ordered.len() {
            return Err(SchemaError::InvalidChoiceValue(format!(
                "reorder list has {} entries, field has {} choices",
                ordered.len(),
                current.len()
            )));
        }
        for id in ordered {
            if !current.iter().any(|c| c.id == *id) {
                return Err(SchemaError::ChoiceNotFound(*id));
            }
        }
        for choice in &current {
            if !ordered.contains(&choice.id) {
                return Err(SchemaError::InvalidChoiceValue(format!(
                    "reorder list does not mention choice {}",
                    choice.id
                )));
            }
        }

        let tx = self.conn.transaction()?;
        for (position, id) in ordered.iter().enumerate() {
            tx.execute(
                "UPDATE field_choices SET sort_order = ?2 WHERE id = ?1",
                params![id.to_string(), position as i64 + 1],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// A field's choices ordered by sort_order
    pub fn choices(&self, field_id: FieldId) -> Result<Vec<Choice>, SchemaError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, field_id, display_text, value, sort_order FROM field_choices \
             WHERE field_id = ?1 ORDER BY sort_order, value",
        )?;
        let rows = stmt.query_map(params![field_id.to_string()], choice_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn find_choice_by_value(
        &self,
        field_id: FieldId,
        value: &str,
    ) -> Result<Option<String>, SchemaError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM field_choices WHERE field_id = ?1 AND value = ?2",
                params![field_id.to_string(), value],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn next_sort_order(&self, field_id: FieldId) -> Result<i64, SchemaError> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(sort_order) FROM field_choices WHERE field_id = ?1",
            params![field_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0) + 1)
    }
}

/// Insert a choice row; shared with the import service
pub(crate) fn insert_choice(
    conn: &rusqlite::Connection,
    id: ChoiceId,
    field_id: FieldId,
    display_text: &str,
    value: &str,
    sort_order: i64,
) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO field_choices (id, field_id, display_text, value, sort_order) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id.to_string(),
            field_id.to_string(),
            display_text,
            value,
            sort_order
        ],
    )?;
    Ok(())
}

pub(crate) fn check_choice_value(value: &str) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(SchemaError::InvalidChoiceValue(
            "choice value must not be empty".to_string(),
        ));
    }
    if value.contains(MULTI_SELECT_DELIMITER) {
        return Err(SchemaError::InvalidChoiceValue(format!(
            "choice value '{}' must not contain '{}'",
            value, MULTI_SELECT_DELIMITER
        )));
    }
    Ok(())
}

fn choice_from_row(row: &Row<'_>) -> rusqlite::Result<Choice> {
    let id_str: String = row.get(0)?;
    let field_str: String = row.get(1)?;
    let id = ChoiceId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let field_id = FieldId::parse(&field_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Choice {
        id,
        field_id,
        display_text: row.get(2)?,
        value: row.get(3)?,
        sort_order: row.get(4)?,
    })
}
