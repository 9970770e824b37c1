//! Import/export of whole entity-kind schemas
//!
//! Exports snapshot definitions and choices only, never stored values.
//! Imports are transactional: a document that fails structural
//! validation writes nothing, and a Replace import swaps the entire
//! kind's schema in one commit.

pub mod document;
pub mod validator;

use std::fs;
use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::{ChoiceId, FieldId};
use crate::fields::FieldSpec;
use crate::store::{choices, definitions, FieldStore, SchemaError};

pub use document::{ChoiceDescriptor, FieldDescriptor, SchemaDocument, DOCUMENT_VERSION};
pub use validator::{check_document, DocumentIssue, DocumentValidator};

/// Conflict policy for importing a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Skip fields whose name already exists in the target store
    Merge,
    /// Drop the kind's existing schema (cascading choices and values)
    /// and install the document's fields
    Replace,
}

/// What an import did, per field name
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<String>,
    pub skipped: Vec<String>,
}

/// Errors raised by the import/export service
#[derive(Debug, Error, Diagnostic)]
pub enum TransferError {
    #[error("schema document failed validation ({} issue(s))", .0.len())]
    #[diagnostic(code(fieldbook::transfer::malformed))]
    Malformed(Vec<DocumentIssue>),

    #[error("IO error: {0}")]
    #[diagnostic(code(fieldbook::transfer::io))]
    Io(String),

    #[error("JSON error: {0}")]
    #[diagnostic(code(fieldbook::transfer::json))]
    Json(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),
}

/// Snapshot an entity kind's schema as a portable document
pub fn export(store: &FieldStore, kind: &str) -> Result<SchemaDocument, TransferError> {
    let fields = store
        .list_fields(kind)?
        .into_iter()
        .map(|def| FieldDescriptor {
            field_name: def.field_name,
            display_label: def.display_label,
            field_type: def.field_type,
            is_required: def.required,
            is_read_only: def.read_only,
            default_value: def.default_value,
            placeholder: def.placeholder,
            description: def.description,
            group_name: def.group_name,
            display_order: Some(def.display_order),
            is_active: def.active,
            validation_regex: def.validation_regex,
            min_value: def.min_value,
            max_value: def.max_value,
            min_length: def.min_length,
            max_length: def.max_length,
            choices: def
                .choices
                .into_iter()
                .map(|c| ChoiceDescriptor {
                    value: c.value,
                    display_text: c.display_text,
                    sort_order: c.sort_order,
                })
                .collect(),
        })
        .collect();

    Ok(SchemaDocument {
        entity_type: kind.to_string(),
        schema_version: DOCUMENT_VERSION,
        fields,
    })
}

/// Install a document's fields into the store
///
/// Scoped strictly to `document.entity_type`; definitions of other
/// kinds are never touched. All writes happen in one transaction, so a
/// failure part-way leaves the previous schema intact.
pub fn import(
    store: &mut FieldStore,
    doc: &SchemaDocument,
    mode: ImportMode,
) -> Result<ImportReport, TransferError> {
    let issues = check_document(doc);
    if !issues.is_empty() {
        return Err(TransferError::Malformed(issues));
    }

    let kind = doc.entity_type.as_str();
    store.require_kind(kind)?;

    let mut report = ImportReport::default();
    let tx = store.conn_mut().transaction().map_err(SchemaError::from)?;

    if mode == ImportMode::Replace {
        definitions::delete_definitions_for_kind(&tx, kind)?;
    }

    for (position, field) in doc.fields.iter().enumerate() {
        if mode == ImportMode::Merge && definitions::definition_exists(&tx, kind, &field.field_name)? {
            report.skipped.push(field.field_name.clone());
            continue;
        }

        let spec = spec_from_descriptor(field);
        definitions::check_spec(&spec)?;

        let display_order = field.display_order.unwrap_or(position as i64 + 1);
        let field_id = FieldId::new();
        definitions::insert_definition(&tx, field_id, kind, &spec, display_order)?;

        let mut ordered = field.choices.clone();
        ordered.sort_by_key(|c| c.sort_order);
        for (i, choice) in ordered.iter().enumerate() {
            choices::check_choice_value(choice.token())?;
            choices::insert_choice(
                &tx,
                ChoiceId::new(),
                field_id,
                choice.text(),
                choice.token(),
                i as i64 + 1,
            )?;
        }

        report.imported.push(field.field_name.clone());
    }

    tx.commit().map_err(SchemaError::from)?;
    Ok(report)
}

/// Read and structurally validate a document file
pub fn read_document(path: &Path) -> Result<SchemaDocument, TransferError> {
    let contents = fs::read_to_string(path).map_err(|e| TransferError::Io(e.to_string()))?;

    let json: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| TransferError::Json(e.to_string()))?;

    let issues = DocumentValidator::new().check_json(&json);
    if !issues.is_empty() {
        return Err(TransferError::Malformed(issues));
    }

    serde_json::from_value(json).map_err(|e| TransferError::Json(e.to_string()))
}

/// Write a document as pretty-printed JSON
pub fn write_document(path: &Path, doc: &SchemaDocument) -> Result<(), TransferError> {
    let mut json =
        serde_json::to_string_pretty(doc).map_err(|e| TransferError::Json(e.to_string()))?;
    json.push('\n');
    fs::write(path, json).map_err(|e| TransferError::Io(e.to_string()))
}

fn spec_from_descriptor(field: &FieldDescriptor) -> FieldSpec {
    FieldSpec {
        field_name: field.field_name.clone(),
        display_label: field.label().to_string(),
        field_type: field.field_type,
        required: field.is_required,
        read_only: field.is_read_only,
        default_value: field.default_value.clone(),
        placeholder: field.placeholder.clone(),
        description: field.description.clone(),
        group_name: field.group_name.clone(),
        display_order: field.display_order,
        active: field.is_active,
        validation_regex: field.validation_regex.clone(),
        min_value: field.min_value,
        max_value: field.max_value,
        min_length: field.min_length,
        max_length: field.max_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;

    fn seeded_store() -> FieldStore {
        let mut store = FieldStore::open_in_memory().unwrap();
        let priority = store
            .define_field(
                "Job",
                FieldSpec::new("Priority", "Priority", FieldType::Dropdown).group_name("Triage"),
            )
            .unwrap();
        for (text, value) in [("Low", "low"), ("Normal", "normal"), ("High", "high")] {
            store
                .add_choice(priority, text, Some(value.to_string()))
                .unwrap();
        }
        store
            .define_field(
                "Job",
                FieldSpec::new("DueDate", "Due Date", FieldType::Date).required(true),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_export_snapshots_schema_only() {
        let mut store = seeded_store();
        let priority = store.find_field_by_name("Job", "Priority").unwrap().unwrap();
        store.set_value("Job", "job-1", priority, "high").unwrap();

        let doc = export(&store, "Job").unwrap();
        assert_eq!(doc.entity_type, "Job");
        assert_eq!(doc.schema_version, DOCUMENT_VERSION);
        assert_eq!(doc.fields.len(), 2);
        assert_eq!(doc.fields[0].field_name, "Priority");
        assert_eq!(doc.fields[0].choices.len(), 3);

        // Schema only: no trace of the stored value anywhere
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("job-1"));
    }

    #[test]
    fn test_replace_round_trip() {
        let store = seeded_store();
        let doc = export(&store, "Job").unwrap();

        let mut target = FieldStore::open_in_memory().unwrap();
        let report = import(&mut target, &doc, ImportMode::Replace).unwrap();
        assert_eq!(report.imported, vec!["Priority", "DueDate"]);
        assert!(report.skipped.is_empty());

        let round_tripped = export(&target, "Job").unwrap();
        let names: Vec<&str> = round_tripped
            .fields
            .iter()
            .map(|f| f.field_name.as_str())
            .collect();
        assert_eq!(names, vec!["Priority", "DueDate"]);
        assert_eq!(round_tripped.fields[0].field_type, FieldType::Dropdown);
        let tokens: Vec<&str> = round_tripped.fields[0]
            .choices
            .iter()
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(tokens, vec!["low", "normal", "high"]);
    }

    #[test]
    fn test_replace_drops_previous_schema_and_values() {
        let mut store = seeded_store();
        let old_field = store
            .define_field("Job", FieldSpec::new("Legacy", "Legacy", FieldType::Text))
            .unwrap();
        store.set_value("Job", "job-1", old_field, "x").unwrap();

        let doc = SchemaDocument {
            entity_type: "Job".to_string(),
            schema_version: DOCUMENT_VERSION,
            fields: vec![FieldDescriptor {
                field_name: "Fresh".to_string(),
                display_label: String::new(),
                field_type: FieldType::Text,
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
            }],
        };

        import(&mut store, &doc, ImportMode::Replace).unwrap();

        let names: Vec<String> = store
            .list_fields("Job")
            .unwrap()
            .into_iter()
            .map(|f| f.field_name)
            .collect();
        assert_eq!(names, vec!["Fresh"]);
        assert_eq!(store.count_values(old_field).unwrap(), 0);
    }

    #[test]
    fn test_merge_skips_existing_names() {
        let mut store = seeded_store();
        let doc = export(&store, "Job").unwrap();

        let mut incoming = doc.clone();
        incoming.fields[1].field_name = "Crew".to_string();
        incoming.fields[1].field_type = FieldType::Text;

        let report = import(&mut store, &incoming, ImportMode::Merge).unwrap();
        assert_eq!(report.skipped, vec!["Priority"]);
        assert_eq!(report.imported, vec!["Crew"]);

        // Exactly one Priority definition remains, untouched
        let fields = store.list_fields("Job").unwrap();
        let priorities: Vec<_> = fields
            .iter()
            .filter(|f| f.field_name == "Priority")
            .collect();
        assert_eq!(priorities.len(), 1);
        assert_eq!(priorities[0].choices.len(), 3);
    }

    #[test]
    fn test_malformed_document_aborts_without_writes() {
        let mut store = seeded_store();

        let mut doc = export(&store, "Job").unwrap();
        doc.fields.push(doc.fields[0].clone()); // duplicate name

        let err = import(&mut store, &doc, ImportMode::Replace).unwrap_err();
        assert!(matches!(err, TransferError::Malformed(_)));

        // The pre-existing schema is untouched
        let fields = store.list_fields("Job").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].choices.len(), 3);
    }

    #[test]
    fn test_import_scoped_to_document_kind() {
        let mut store = seeded_store();
        store
            .define_field("Customer", FieldSpec::new("Tier", "Tier", FieldType::Text))
            .unwrap();

        let doc = SchemaDocument {
            entity_type: "Job".to_string(),
            schema_version: DOCUMENT_VERSION,
            fields: Vec::new(),
        };
        import(&mut store, &doc, ImportMode::Replace).unwrap();

        assert!(store.list_fields("Job").unwrap().is_empty());
        assert_eq!(store.list_fields("Customer").unwrap().len(), 1);
    }

    #[test]
    fn test_import_unknown_kind_rejected() {
        let mut store = FieldStore::open_in_memory().unwrap();
        let doc = SchemaDocument {
            entity_type: "Starship".to_string(),
            schema_version: DOCUMENT_VERSION,
            fields: Vec::new(),
        };
        let err = import(&mut store, &doc, ImportMode::Merge).unwrap_err();
        assert!(matches!(
            err,
            TransferError::Schema(SchemaError::UnknownEntityKind(_))
        ));
    }

    #[test]
    fn test_document_file_round_trip() {
        let store = seeded_store();
        let doc = export(&store, "Job").unwrap();

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("job-schema.json");
        write_document(&path, &doc).unwrap();

        let read_back = read_document(&path).unwrap();
        assert_eq!(read_back.entity_type, "Job");
        assert_eq!(read_back.fields.len(), doc.fields.len());
    }

    #[test]
    fn test_read_document_rejects_wrong_shape() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, r#"{ "entityType": "Job" }"#).unwrap();

        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, TransferError::Malformed(_)));
    }

    #[test]
    fn test_reorder_reflected_in_export() {
        let mut store = seeded_store();
        let priority = store.find_field_by_name("Job", "Priority").unwrap().unwrap();
        let current = store.choices(priority).unwrap();
        let reversed: Vec<_> = current.iter().rev().map(|c| c.id).collect();
        store.reorder_choices(priority, &reversed).unwrap();

        let doc = export(&store, "Job").unwrap();
        let tokens: Vec<&str> = doc.fields[0]
            .choices
            .iter()
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(tokens, vec!["high", "normal", "low"]);
    }
}
