//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::project::Project;

/// Fieldbook configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format
    pub default_format: Option<String>,

    /// Additional entity kinds registered on top of the built-ins
    pub extra_kinds: Vec<String>,
}

impl Config {
    /// Load configuration for a project, merging in priority order
    pub fn load(project: &Project) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/fieldbook/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Project config (.fieldbook/config.yaml)
        let project_config_path = project.fieldbook_dir().join("config.yaml");
        if project_config_path.exists() {
            if let Ok(contents) = std::fs::read_to_string(&project_config_path) {
                if let Ok(project_config) = serde_yml::from_str::<Config>(&contents) {
                    config.merge(project_config);
                }
            }
        }

        // 4. Environment variables
        if let Ok(format) = std::env::var("FIELDBOOK_FORMAT") {
            config.default_format = Some(format);
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "fieldbook")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        for kind in other.extra_kinds {
            if !self.extra_kinds.contains(&kind) {
                self.extra_kinds.push(kind);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other_format() {
        let mut base = Config {
            default_format: Some("table".to_string()),
            extra_kinds: vec!["Contract".to_string()],
        };
        base.merge(Config {
            default_format: Some("json".to_string()),
            extra_kinds: vec!["Contract".to_string(), "Warranty".to_string()],
        });

        assert_eq!(base.default_format.as_deref(), Some("json"));
        assert_eq!(base.extra_kinds, vec!["Contract", "Warranty"]);
    }

    #[test]
    fn test_parse_project_config() {
        let config: Config =
            serde_yml::from_str("default_format: json\nextra_kinds:\n  - Contract\n").unwrap();
        assert_eq!(config.default_format.as_deref(), Some("json"));
        assert_eq!(config.extra_kinds, vec!["Contract"]);
    }

    #[test]
    fn test_empty_config_parses() {
        let config: Config = serde_yml::from_str("{}").unwrap();
        assert!(config.default_format.is_none());
        assert!(config.extra_kinds.is_empty());
    }
}
