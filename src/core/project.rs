//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project marker directory
const PROJECT_DIR: &str = ".fieldbook";

/// Filename of the schema database inside the project directory
const DB_FILE: &str = "fields.db";

/// Represents a Fieldbook project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .fieldbook/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            let marker = current.join(PROJECT_DIR);
            if marker.is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open the project rooted at the given directory, without walking up
    pub fn open(root: &Path) -> Result<Self, ProjectError> {
        let root = root
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotFound {
                searched_from: root,
            });
        }
        Ok(Self { root })
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let fieldbook_dir = root.join(PROJECT_DIR);
        if fieldbook_dir.exists() {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        Self::write_skeleton(&fieldbook_dir)?;
        Ok(Self { root })
    }

    /// Force initialization even if .fieldbook/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_skeleton(&root.join(PROJECT_DIR))?;
        Ok(Self { root })
    }

    fn write_skeleton(fieldbook_dir: &Path) -> Result<(), ProjectError> {
        std::fs::create_dir_all(fieldbook_dir)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = fieldbook_dir.join("config.yaml");
        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    fn default_config() -> &'static str {
        r#"# Fieldbook Project Configuration

# Default output format (auto, table, json, tsv)
# default_format: auto

# Additional entity kinds to register besides the built-ins
# (Customer, Site, Asset, Job, Estimate, Invoice)
# extra_kinds: []
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .fieldbook configuration directory
    pub fn fieldbook_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Get the path of the schema database
    pub fn db_path(&self) -> PathBuf {
        self.fieldbook_dir().join(DB_FILE)
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a Fieldbook project (searched from {searched_from:?}). Run 'fieldbook init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("Fieldbook project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
