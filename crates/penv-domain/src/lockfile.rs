use std::{
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    time::SystemTime,
};

use tracing::{debug, warn};

use crate::{context::ProjectContext, fs::modified_time};

/// Classification of a descriptor/lock pair on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockPairStatus {
    Fresh,
    Stale,
    MissingLock,
    BothMissing,
    /// Lock file present without its descriptor. This is the only
    /// missing-descriptor state: a missing descriptor with no lock is
    /// [`LockPairStatus::BothMissing`].
    LockOnly,
}

impl LockPairStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LockPairStatus::Fresh => "fresh",
            LockPairStatus::Stale => "stale",
            LockPairStatus::MissingLock => "missing-lock",
            LockPairStatus::BothMissing => "both-missing",
            LockPairStatus::LockOnly => "lock-only",
        }
    }
}

/// `true` only when the descriptor is strictly newer than the lock file.
#[must_use]
pub fn is_stale(descriptor: SystemTime, lock: SystemTime) -> bool {
    descriptor > lock
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockPair {
    pub descriptor: PathBuf,
    pub lock: PathBuf,
}

impl LockPair {
    #[must_use]
    pub fn new(descriptor: impl Into<PathBuf>, lock: impl Into<PathBuf>) -> Self {
        Self {
            descriptor: descriptor.into(),
            lock: lock.into(),
        }
    }

    #[must_use]
    pub fn for_project(ctx: &ProjectContext) -> Self {
        Self::new(ctx.descriptor_path(), ctx.lock_path())
    }

    /// Classifies the pair from existence and modification times. Unreadable
    /// metadata counts as a missing file.
    #[must_use]
    pub fn classify(&self) -> LockPairStatus {
        let descriptor = probe_mtime(&self.descriptor);
        let lock = probe_mtime(&self.lock);
        match (descriptor, lock) {
            (None, None) => LockPairStatus::BothMissing,
            (None, Some(_)) => LockPairStatus::LockOnly,
            (Some(_), None) => LockPairStatus::MissingLock,
            (Some(d), Some(l)) if is_stale(d, l) => LockPairStatus::Stale,
            (Some(_), Some(_)) => LockPairStatus::Fresh,
        }
    }

    /// Shell command that regenerates the lock file from the descriptor.
    #[must_use]
    pub fn regenerate_hint(&self) -> String {
        format!("conda-lock -f {}", display_name(&self.descriptor))
    }
}

fn probe_mtime(path: &Path) -> Option<SystemTime> {
    match modified_time(path) {
        Ok(mtime) => mtime,
        Err(err) => {
            debug!(%err, path = %path.display(), "treating unreadable file as missing");
            None
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    #[error("{missing} not found{}", hint_suffix(.hint))]
    Missing {
        missing: String,
        hint: Option<String>,
    },
    #[error("{lock} is older than {descriptor}; regenerate it with `{hint}`")]
    Stale {
        descriptor: String,
        lock: String,
        hint: String,
    },
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref()
        .map(|hint| format!("; generate it with `{hint}`"))
        .unwrap_or_default()
}

/// Yes/no capability used when a human can be asked.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Whether standard input is attached to a terminal.
#[must_use]
pub fn stdin_is_interactive() -> bool {
    io::stdin().is_terminal()
}

/// What the caller should tell the user after a successful check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockCheck {
    Ok(LockPairStatus),
    /// A problem was found but policy let execution continue.
    Continued(LockPairStatus),
}

impl LockCheck {
    #[must_use]
    pub fn status(self) -> LockPairStatus {
        match self {
            LockCheck::Ok(status) | LockCheck::Continued(status) => status,
        }
    }
}

/// Applies the lock-file policy for the current execution mode.
pub struct LockFileValidator<'a> {
    pair: LockPair,
    strict: bool,
    interactive: bool,
    confirm: &'a dyn Confirm,
}

impl<'a> LockFileValidator<'a> {
    #[must_use]
    pub fn new(pair: LockPair, strict: bool, interactive: bool, confirm: &'a dyn Confirm) -> Self {
        Self {
            pair,
            strict,
            interactive,
            confirm,
        }
    }

    #[must_use]
    pub fn classify(&self) -> LockPairStatus {
        self.pair.classify()
    }

    /// Strict mode fails on any missing or stale lock. Otherwise an interactive
    /// session is asked whether to continue and a non-interactive one
    /// continues without blocking. A pair with no descriptor at all always
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns [`LockError`] when the policy rejects the pair or the user
    /// declines to continue.
    pub fn validate(&self) -> Result<LockCheck, LockError> {
        let status = self.classify();
        debug!(
            status = status.as_str(),
            strict = self.strict,
            interactive = self.interactive,
            "checking lock file"
        );
        match status {
            LockPairStatus::Fresh | LockPairStatus::LockOnly => Ok(LockCheck::Ok(status)),
            LockPairStatus::BothMissing => Err(LockError::Missing {
                missing: display_name(&self.pair.descriptor),
                hint: None,
            }),
            LockPairStatus::MissingLock => {
                let err = LockError::Missing {
                    missing: display_name(&self.pair.lock),
                    hint: Some(self.pair.regenerate_hint()),
                };
                self.apply_policy(status, err, "continue without a lock file?")
            }
            LockPairStatus::Stale => {
                let err = LockError::Stale {
                    descriptor: display_name(&self.pair.descriptor),
                    lock: display_name(&self.pair.lock),
                    hint: self.pair.regenerate_hint(),
                };
                self.apply_policy(status, err, "continue with the stale lock file?")
            }
        }
    }

    fn apply_policy(
        &self,
        status: LockPairStatus,
        err: LockError,
        question: &str,
    ) -> Result<LockCheck, LockError> {
        if self.strict {
            return Err(err);
        }
        if self.interactive {
            warn!("{err}");
            if self.confirm.confirm(question) {
                return Ok(LockCheck::Continued(status));
            }
            return Err(err);
        }
        debug!(status = status.as_str(), "non-interactive run; continuing");
        Ok(LockCheck::Continued(status))
    }
}
