use crate::{backend::Backend, ignore::IgnoreTemplate};

pub const CONFIG_RELATIVE_PATH: &str = ".penv/config";
pub const DEFAULT_VENV_DIR: &str = ".venv";
pub const SECRETS_FILE: &str = ".env";
pub const MANAGED_ENVS_DIR: &str = ".penv/envs";
pub const ENVIRONMENT_DESCRIPTOR: &str = "environment.yml";
pub const ENVIRONMENT_LOCK: &str = "conda-lock.yml";
pub const PIP_DESCRIPTORS: [&str; 2] = ["pyproject.toml", "requirements.txt"];
pub const IGNORE_FILE: &str = ".gitignore";

/// Values every resolver would otherwise hard-code. Built once per invocation
/// and handed to [`crate::ProjectContext`].
#[derive(Clone, Debug)]
pub struct Defaults {
    pub venv_dir: String,
    pub backend: Backend,
    pub ignore_template: IgnoreTemplate,
    pub secrets_file: String,
    pub managed_envs_dir: String,
    pub config_path: String,
    pub environment_descriptor: String,
    pub environment_lock: String,
    pub pip_descriptors: Vec<String>,
    pub ignore_file: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            venv_dir: DEFAULT_VENV_DIR.to_string(),
            backend: Backend::Venv,
            ignore_template: IgnoreTemplate::default(),
            secrets_file: SECRETS_FILE.to_string(),
            managed_envs_dir: MANAGED_ENVS_DIR.to_string(),
            config_path: CONFIG_RELATIVE_PATH.to_string(),
            environment_descriptor: ENVIRONMENT_DESCRIPTOR.to_string(),
            environment_lock: ENVIRONMENT_LOCK.to_string(),
            pip_descriptors: PIP_DESCRIPTORS.iter().map(|s| (*s).to_string()).collect(),
            ignore_file: IGNORE_FILE.to_string(),
        }
    }
}
