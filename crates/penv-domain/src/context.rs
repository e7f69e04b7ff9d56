use std::path::{Path, PathBuf};

use crate::{
    config::{ConfigStore, ProjectConfig},
    defaults::Defaults,
};

/// Read-only inputs shared by every resolver for one invocation against one
/// project directory.
#[derive(Clone, Debug)]
pub struct ProjectContext {
    root: PathBuf,
    defaults: Defaults,
    store: ConfigStore,
    config: ProjectConfig,
}

impl ProjectContext {
    /// Loads the project config under `root`; an unreadable config is treated
    /// as empty.
    #[must_use]
    pub fn load(root: impl Into<PathBuf>, defaults: Defaults) -> Self {
        let root = root.into();
        let store = ConfigStore::load_lenient(root.join(&defaults.config_path));
        Self::with_store(root, defaults, store)
    }

    #[must_use]
    pub fn with_store(root: impl Into<PathBuf>, defaults: Defaults, store: ConfigStore) -> Self {
        let config = store.project_config();
        Self {
            root: root.into(),
            defaults,
            store,
            config,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    #[must_use]
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub(crate) fn file_exists(&self, relative: &str) -> bool {
        self.path(relative).is_file()
    }

    /// Venv directory from config, falling back to the default.
    #[must_use]
    pub fn venv_dir(&self) -> &str {
        self.config
            .venv_directory
            .as_deref()
            .unwrap_or(&self.defaults.venv_dir)
    }

    #[must_use]
    pub fn descriptor_path(&self) -> PathBuf {
        self.path(&self.defaults.environment_descriptor)
    }

    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.path(&self.defaults.environment_lock)
    }

    #[must_use]
    pub fn ignore_path(&self) -> PathBuf {
        self.path(&self.defaults.ignore_file)
    }
}
