use std::str::FromStr;

use pep440_rs::Version;
use serde::Serialize;

use crate::{
    backend::Backend,
    context::ProjectContext,
    lockfile::{LockPair, LockPairStatus},
    naming::{resolve_name, validate_name},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckLevel {
    Ok,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationCheck {
    pub level: CheckLevel,
    pub subject: &'static str,
    pub message: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    fn push(&mut self, level: CheckLevel, subject: &'static str, message: impl Into<String>) {
        self.checks.push(ValidationCheck {
            level,
            subject,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn worst(&self) -> CheckLevel {
        self.checks
            .iter()
            .map(|check| check.level)
            .max()
            .unwrap_or(CheckLevel::Ok)
    }

    /// 0 when every check passed, 2 for warnings only, 1 on any error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self.worst() {
            CheckLevel::Ok => 0,
            CheckLevel::Warning => 2,
            CheckLevel::Error => 1,
        }
    }
}

/// Checks that the project on disk matches its stored configuration.
#[must_use]
pub fn validate_project(ctx: &ProjectContext, running_version: &str) -> ValidationReport {
    let mut report = ValidationReport::default();
    let defaults = ctx.defaults();

    if !ctx.store().exists() {
        report.push(
            CheckLevel::Error,
            "config",
            format!("{} not found; project is not initialized", defaults.config_path),
        );
        return report;
    }
    report.push(CheckLevel::Ok, "config", defaults.config_path.clone());

    check_tool_version(&mut report, ctx.config().tool_version.as_deref(), running_version);

    let backend = match ctx.config().backend.as_deref() {
        None => {
            report.push(CheckLevel::Error, "backend", "backend is missing from config");
            None
        }
        Some(value) => match Backend::from_str(value) {
            Ok(backend) => {
                report.push(CheckLevel::Ok, "backend", backend.as_str());
                Some(backend)
            }
            Err(err) => {
                report.push(CheckLevel::Error, "backend", err.to_string());
                None
            }
        },
    };

    match backend {
        Some(Backend::Venv) => check_venv(&mut report, ctx),
        Some(Backend::ManagedEnv) => check_managed_env(&mut report, ctx),
        None => {}
    }

    if let Some(python) = ctx.config().python_version.as_deref() {
        report.push(CheckLevel::Ok, "python", format!("python {python}"));
    }

    report
}

fn check_tool_version(report: &mut ValidationReport, recorded: Option<&str>, running: &str) {
    let Some(recorded) = recorded else {
        report.push(
            CheckLevel::Warning,
            "version",
            format!("tool version not recorded (legacy project); re-run init to record {running}"),
        );
        return;
    };
    match (Version::from_str(recorded), Version::from_str(running)) {
        (Ok(recorded_v), Ok(running_v)) if recorded_v == running_v => {
            report.push(CheckLevel::Ok, "version", recorded);
        }
        (Ok(recorded_v), Ok(running_v)) => {
            let relation = if recorded_v < running_v { "older" } else { "newer" };
            report.push(
                CheckLevel::Warning,
                "version",
                format!("project was configured with {relation} version {recorded} (running {running})"),
            );
        }
        _ => report.push(
            CheckLevel::Warning,
            "version",
            format!("unrecognized tool version {recorded} (running {running})"),
        ),
    }
}

fn check_venv(report: &mut ValidationReport, ctx: &ProjectContext) {
    let dir = ctx.venv_dir();
    if ctx.path(dir).is_dir() {
        report.push(CheckLevel::Ok, "environment", format!("virtual environment {dir}"));
    } else {
        report.push(
            CheckLevel::Error,
            "environment",
            format!("virtual environment directory {dir} is missing"),
        );
    }
}

fn check_managed_env(report: &mut ValidationReport, ctx: &ProjectContext) {
    let descriptor = &ctx.defaults().environment_descriptor;
    if ctx.descriptor_path().is_file() {
        report.push(CheckLevel::Ok, "descriptor", descriptor.clone());
    } else {
        report.push(
            CheckLevel::Error,
            "descriptor",
            format!("{descriptor} is missing"),
        );
    }

    match resolve_name(ctx, None) {
        Ok(resolved) => match validate_name(&resolved.name) {
            Ok(()) => report.push(CheckLevel::Ok, "name", resolved.name),
            Err(err) => report.push(CheckLevel::Error, "name", err.to_string()),
        },
        Err(err) => report.push(CheckLevel::Error, "name", err.to_string()),
    }

    let pair = LockPair::for_project(ctx);
    match pair.classify() {
        LockPairStatus::Fresh => report.push(CheckLevel::Ok, "lock", "lock file is up to date"),
        LockPairStatus::Stale => report.push(
            CheckLevel::Warning,
            "lock",
            format!("lock file is stale; run `{}`", pair.regenerate_hint()),
        ),
        LockPairStatus::MissingLock => report.push(
            CheckLevel::Warning,
            "lock",
            format!("no lock file; run `{}`", pair.regenerate_hint()),
        ),
        LockPairStatus::LockOnly | LockPairStatus::BothMissing => {}
    }
}
