use std::{fmt, str::FromStr};

use tracing::{debug, warn};

use crate::context::ProjectContext;

pub const AUTO: &str = "auto";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    Venv,
    ManagedEnv,
}

impl Backend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Venv => "venv",
            Backend::ManagedEnv => "managed-environment",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = BackendError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "venv" => Ok(Backend::Venv),
            "managed-environment" => Ok(Backend::ManagedEnv),
            other => Err(BackendError::InvalidBackend {
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("invalid backend '{value}' (expected one of: venv, managed-environment, auto)")]
    InvalidBackend { value: String },
}

/// Accepts `venv`, `managed-environment` or `auto`.
pub fn validate_backend(value: &str) -> Result<(), BackendError> {
    if value.trim() == AUTO {
        return Ok(());
    }
    value.parse::<Backend>().map(|_| ())
}

/// What the project's files say about the backend, before precedence rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendDecision {
    Venv,
    ManagedEnv,
    Ambiguous,
    None,
}

impl BackendDecision {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BackendDecision::Venv => "venv",
            BackendDecision::ManagedEnv => "managed-environment",
            BackendDecision::Ambiguous => "ambiguous",
            BackendDecision::None => "none",
        }
    }
}

/// Which precedence tier produced the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendSource {
    Override,
    Config,
    Detected,
    /// Both descriptor classes were present; the default won the tie.
    AmbiguousDefault,
    Default,
}

impl BackendSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BackendSource::Override => "override",
            BackendSource::Config => "config",
            BackendSource::Detected => "detected",
            BackendSource::AmbiguousDefault => "ambiguous-default",
            BackendSource::Default => "default",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendResolution {
    pub backend: Backend,
    pub source: BackendSource,
    pub decision: Option<BackendDecision>,
}

/// Inspects marker files under the project root.
#[must_use]
pub fn detect_backend(ctx: &ProjectContext) -> BackendDecision {
    let defaults = ctx.defaults();
    let managed = ctx.file_exists(&defaults.environment_descriptor)
        || ctx.file_exists(&defaults.environment_lock);
    let pip = defaults
        .pip_descriptors
        .iter()
        .any(|name| ctx.file_exists(name));
    match (managed, pip) {
        (true, true) => BackendDecision::Ambiguous,
        (true, false) => BackendDecision::ManagedEnv,
        (false, true) => BackendDecision::Venv,
        (false, false) => BackendDecision::None,
    }
}

/// Resolves the backend: explicit override, then stored config, then file
/// detection, then the configured default.
///
/// When both descriptor classes exist the default backend is chosen and a
/// warning is logged; [`BackendResolution::source`] records the tie-break.
///
/// # Errors
///
/// Returns [`BackendError::InvalidBackend`] when the override or the stored
/// config names an unknown backend.
pub fn resolve_backend(
    ctx: &ProjectContext,
    override_value: Option<&str>,
) -> Result<BackendResolution, BackendError> {
    if let Some(value) = override_value.map(str::trim) {
        if !value.is_empty() && value != AUTO {
            let backend = value.parse::<Backend>()?;
            debug!(%backend, "backend from explicit override");
            return Ok(BackendResolution {
                backend,
                source: BackendSource::Override,
                decision: None,
            });
        }
    }

    if let Some(stored) = ctx.config().backend.as_deref() {
        let backend = stored.parse::<Backend>()?;
        debug!(%backend, path = %ctx.store().path().display(), "backend from project config");
        return Ok(BackendResolution {
            backend,
            source: BackendSource::Config,
            decision: None,
        });
    }

    let decision = detect_backend(ctx);
    let (backend, source) = match decision {
        BackendDecision::Ambiguous => {
            let defaults = ctx.defaults();
            warn!(
                managed = %defaults.environment_descriptor,
                pip = %defaults.pip_descriptors.join(", "),
                fallback = %defaults.backend,
                "both managed-environment and pip-style descriptor files found; \
                 set `backend` in the project config or pass an explicit backend"
            );
            (defaults.backend, BackendSource::AmbiguousDefault)
        }
        BackendDecision::ManagedEnv => (Backend::ManagedEnv, BackendSource::Detected),
        BackendDecision::Venv => (Backend::Venv, BackendSource::Detected),
        BackendDecision::None => (ctx.defaults().backend, BackendSource::Default),
    };
    debug!(%backend, decision = decision.as_str(), "backend from file detection");
    Ok(BackendResolution {
        backend,
        source,
        decision: Some(decision),
    })
}

/// Ignore-file patterns the backend inserts beyond the static template.
#[must_use]
pub fn owned_ignore_patterns(ctx: &ProjectContext, backend: Backend) -> Vec<String> {
    let defaults = ctx.defaults();
    let primary = match backend {
        Backend::Venv => ctx.venv_dir().trim_end_matches('/').to_string(),
        Backend::ManagedEnv => defaults.managed_envs_dir.clone(),
    };
    vec![primary, defaults.secrets_file.clone()]
}

/// Union of the patterns every backend may have inserted, so a file written
/// under one backend reconciles cleanly under another.
#[must_use]
pub fn all_owned_ignore_patterns(ctx: &ProjectContext) -> Vec<String> {
    let mut patterns: Vec<String> = Vec::new();
    for backend in [Backend::Venv, Backend::ManagedEnv] {
        for pattern in owned_ignore_patterns(ctx, backend) {
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }
    }
    patterns
}
