use crate::{
    backend::BackendError,
    config::{ConfigKeyError, ConfigReadError},
    ignore::IgnoreFileError,
    lockfile::LockError,
    naming::{EmptyName, NameError},
};

/// Stable diagnostic codes shown next to each failure.
pub mod codes {
    pub const CONFIG_READ: &str = "PE100";
    pub const CONFIG_KEY: &str = "PE101";
    pub const INVALID_BACKEND: &str = "PE200";
    pub const EMPTY_NAME: &str = "PE300";
    pub const INVALID_NAME: &str = "PE301";
    pub const LOCK_MISSING: &str = "PE400";
    pub const LOCK_STALE: &str = "PE401";
    pub const IGNORE_FILE: &str = "PE500";
}

/// Every error kind a resolver can surface to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PenvError {
    #[error(transparent)]
    Config(#[from] ConfigReadError),
    #[error(transparent)]
    ConfigKey(#[from] ConfigKeyError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    EmptyName(#[from] EmptyName),
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    IgnoreFile(#[from] IgnoreFileError),
}

impl PenvError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => codes::CONFIG_READ,
            Self::ConfigKey(_) => codes::CONFIG_KEY,
            Self::Backend(_) => codes::INVALID_BACKEND,
            Self::EmptyName(_) => codes::EMPTY_NAME,
            Self::Name(_) => codes::INVALID_NAME,
            Self::Lock(LockError::Missing { .. }) => codes::LOCK_MISSING,
            Self::Lock(LockError::Stale { .. }) => codes::LOCK_STALE,
            Self::IgnoreFile(_) => codes::IGNORE_FILE,
        }
    }

    /// Process exit code for the orchestrator.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::ConfigKey(_) | Self::IgnoreFile(_) => 1,
            Self::Backend(_) => 3,
            Self::EmptyName(_) | Self::Name(_) => 4,
            Self::Lock(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_maps_to_a_distinct_code() {
        let errors: Vec<PenvError> = vec![
            ConfigKeyError {
                key: "a.b.c".into(),
            }
            .into(),
            BackendError::InvalidBackend {
                value: "x".into(),
            }
            .into(),
            EmptyName { raw: "!".into() }.into(),
            NameError::Empty.into(),
            LockError::Missing {
                missing: "conda-lock.yml".into(),
                hint: None,
            }
            .into(),
            LockError::Stale {
                descriptor: "environment.yml".into(),
                lock: "conda-lock.yml".into(),
                hint: "conda-lock -f environment.yml".into(),
            }
            .into(),
        ];
        let mut codes: Vec<&str> = errors.iter().map(PenvError::code).collect();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert_eq!(errors[0].exit_code(), 1);
        assert_eq!(errors[1].exit_code(), 3);
        assert_eq!(errors[3].exit_code(), 4);
        assert_eq!(errors[5].exit_code(), 5);
    }

    #[test]
    fn messages_pass_through_unchanged() {
        let err: PenvError = NameError::Reserved("base".into()).into();
        assert_eq!(
            err.to_string(),
            "environment name 'base' is reserved; choose a different name"
        );
    }
}
