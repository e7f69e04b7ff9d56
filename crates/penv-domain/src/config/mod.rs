mod parser;

pub(crate) use parser::unquote;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::fs::{read_optional, write_atomic};

pub use parser::{ConfigDocument, ConfigValue};

pub const KEY_BACKEND: &str = "backend";
pub const KEY_TOOL_VERSION: &str = "penv_version";
pub const KEY_VENV_DIRECTORY: &str = "venv.directory";
pub const KEY_MANAGED_ENV_NAME: &str = "managed_env.name";
pub const KEY_PYTHON_VERSION: &str = "python.version";

#[derive(Debug, thiserror::Error)]
pub enum ConfigReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid config key '{key}' (expected KEY or SECTION.KEY using letters, digits, '_' and '-')")]
pub struct ConfigKeyError {
    pub key: String,
}

/// Project-local key/value store backed by `.penv/config`.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
    doc: ConfigDocument,
    exists: bool,
}

impl ConfigStore {
    /// Loads the store. A missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigReadError> {
        let path = path.into();
        let contents = read_optional(&path).map_err(|source| ConfigReadError::Io {
            path: path.clone(),
            source,
        })?;
        let exists = contents.is_some();
        let doc = contents
            .as_deref()
            .map(ConfigDocument::parse)
            .unwrap_or_default();
        if doc.skipped_lines() > 0 {
            debug!(
                path = %path.display(),
                skipped = doc.skipped_lines(),
                "ignored unparseable config lines"
            );
        }
        Ok(Self { path, doc, exists })
    }

    /// Loads the store, treating unreadable files as empty.
    #[must_use]
    pub fn load_lenient(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::load(path.clone()) {
            Ok(store) => store,
            Err(err) => {
                warn!(%err, "config unreadable; continuing without stored values");
                Self::empty(path)
            }
        }
    }

    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            doc: ConfigDocument::default(),
            exists: false,
        }
    }

    #[must_use]
    pub fn from_contents(path: impl Into<PathBuf>, contents: &str) -> Self {
        Self {
            path: path.into(),
            doc: ConfigDocument::parse(contents),
            exists: true,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file existed when the store was loaded.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Non-empty value for `key` or `section.key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.doc.get(key).filter(|value| !value.trim().is_empty())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigKeyError> {
        self.doc.set(key, value)
    }

    #[must_use]
    pub fn document(&self) -> &ConfigDocument {
        &self.doc
    }

    #[must_use]
    pub fn project_config(&self) -> ProjectConfig {
        ProjectConfig {
            backend: self.get(KEY_BACKEND).map(ToOwned::to_owned),
            tool_version: self.get(KEY_TOOL_VERSION).map(ToOwned::to_owned),
            venv_directory: self.get(KEY_VENV_DIRECTORY).map(ToOwned::to_owned),
            managed_env_name: self.get(KEY_MANAGED_ENV_NAME).map(ToOwned::to_owned),
            python_version: self.get(KEY_PYTHON_VERSION).map(ToOwned::to_owned),
        }
    }

    /// Writes the store back to disk through a temp file and rename.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or temp file cannot be created or
    /// the rename fails.
    pub fn save(&mut self) -> Result<()> {
        write_atomic(&self.path, &self.doc.render())?;
        self.exists = true;
        Ok(())
    }
}

/// Typed view over the values every resolver reads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    pub backend: Option<String>,
    pub tool_version: Option<String>,
    pub venv_directory: Option<String>,
    pub managed_env_name: Option<String>,
    pub python_version: Option<String>,
}
