//! Shared helper functions for CLI commands

use miette::{miette, Result};

use crate::cli::GlobalOpts;
use crate::core::identity::FieldId;
use crate::core::project::Project;
use crate::core::Config;
use crate::store::FieldStore;

/// Locate the project for the invocation (explicit --project or walk-up
/// discovery), load config, and open the store
pub fn open_store(global: &GlobalOpts) -> Result<(Config, FieldStore)> {
    let project = match &global.project {
        Some(path) => Project::open(path).map_err(|e| miette!("{}", e))?,
        None => Project::discover().map_err(|e| miette!("{}", e))?,
    };
    let config = Config::load(&project);
    let store = FieldStore::open(&project, &config)?;
    Ok((config, store))
}

/// Resolve a field argument: a FLD identifier, or a field name scoped
/// by an entity kind
pub fn resolve_field(
    store: &FieldStore,
    arg: &str,
    kind: Option<&str>,
) -> Result<FieldId> {
    if let Ok(id) = FieldId::parse(arg) {
        return Ok(id);
    }

    match kind {
        Some(kind) => match store.find_field_by_name(kind, arg)? {
            Some(id) => Ok(id),
            None => Err(miette!("no field named '{}' on {}", arg, kind)),
        },
        None => Err(miette!(
            "'{}' is not a field id; pass --kind to look it up by name",
            arg
        )),
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_resolve_field_by_id_and_name() {
        use crate::fields::{FieldSpec, FieldType};

        let mut store = FieldStore::open_in_memory().unwrap();
        let id = store
            .define_field("Customer", FieldSpec::new("Age", "Age", FieldType::Number))
            .unwrap();

        let by_id = resolve_field(&store, &id.to_string(), None).unwrap();
        assert_eq!(by_id, id);

        let by_name = resolve_field(&store, "Age", Some("Customer")).unwrap();
        assert_eq!(by_name, id);

        assert!(resolve_field(&store, "Age", None).is_err());
        assert!(resolve_field(&store, "Missing", Some("Customer")).is_err());
    }
}
