#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod backend;
pub mod config;
pub mod context;
pub mod defaults;
pub mod descriptor;
pub mod error;
mod fs;
pub mod ignore;
pub mod lockfile;
pub mod naming;
pub mod validate;

pub use backend::{
    all_owned_ignore_patterns, detect_backend, owned_ignore_patterns, resolve_backend,
    validate_backend, Backend, BackendDecision, BackendError, BackendResolution, BackendSource,
};
pub use config::{
    ConfigDocument, ConfigKeyError, ConfigReadError, ConfigStore, ConfigValue, ProjectConfig,
};
pub use context::ProjectContext;
pub use defaults::Defaults;
pub use descriptor::EnvironmentDescriptor;
pub use error::PenvError;
pub use ignore::{
    reconcile_ignore_content, reconcile_ignore_file, remove_ignore_content,
    remove_ignore_patterns, IgnoreFileError, IgnoreSection, IgnoreTemplate, ReconcileReport,
    IGNORE_TEMPLATE_VERSION,
};
pub use lockfile::{
    is_stale, stdin_is_interactive, Confirm, LockCheck, LockError, LockFileValidator, LockPair,
    LockPairStatus,
};
pub use naming::{
    resolve_name, sanitize_name, validate_name, EmptyName, NameError, NameSource, ResolvedName,
    RESERVED_NAMES,
};
pub use validate::{validate_project, CheckLevel, ValidationCheck, ValidationReport};
