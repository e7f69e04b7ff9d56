use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use penv_domain::{
    all_owned_ignore_patterns,
    config::{KEY_BACKEND, KEY_MANAGED_ENV_NAME},
    owned_ignore_patterns, reconcile_ignore_file, remove_ignore_patterns, resolve_backend,
    resolve_name, stdin_is_interactive, validate_name, validate_project, Backend, BackendDecision,
    BackendSource, ConfigStore, Defaults, LockCheck, LockFileValidator, LockPair, LockPairStatus,
    PenvError, ProjectContext, ValidationCheck, IGNORE_TEMPLATE_VERSION,
};
use serde_json::{json, Value};

use crate::{
    cli::{
        BackendArgs, CommandGroupCli, ConfigCommand, ConfigGetArgs, ConfigSetArgs, LockArgs,
        NameArgs, PenvCli,
    },
    prompt,
};

/// Result of one command, rendered by `output`.
#[derive(Debug)]
pub struct Outcome {
    pub code: i32,
    pub message: String,
    pub details: Value,
    pub hint: Option<String>,
    pub checks: Vec<ValidationCheck>,
}

impl Outcome {
    fn new(message: impl Into<String>, details: Value) -> Self {
        Self {
            code: 0,
            message: message.into(),
            details,
            hint: None,
            checks: Vec::new(),
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub fn run(cli: &PenvCli) -> Result<Outcome> {
    let root = project_root(cli.project.as_deref())?;
    let ctx = ProjectContext::load(&root, Defaults::default());
    match &cli.command {
        CommandGroupCli::Backend(args) => backend(&ctx, args),
        CommandGroupCli::Name(args) => name(&ctx, args),
        CommandGroupCli::Lock(args) => lock(&ctx, args, cli.no_input),
        CommandGroupCli::Gitignore(args) => gitignore(&ctx, args),
        CommandGroupCli::GitignoreClean(args) => gitignore_clean(&ctx, args),
        CommandGroupCli::Validate => Ok(validate(&ctx)),
        CommandGroupCli::Config(ConfigCommand::Get(args)) => config_get(&ctx, args),
        CommandGroupCli::Config(ConfigCommand::Set(args)) => config_set(&ctx, args),
    }
}

fn project_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let root = match explicit {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().context("failed to determine the current directory")?,
    };
    if !root.is_dir() {
        bail!("project directory {} does not exist", root.display());
    }
    Ok(root)
}

fn backend(ctx: &ProjectContext, args: &BackendArgs) -> Result<Outcome> {
    let resolution = resolve_backend(ctx, args.backend.as_deref()).map_err(PenvError::from)?;
    let outcome = Outcome::new(
        format!(
            "backend: {} ({})",
            resolution.backend,
            resolution.source.as_str()
        ),
        json!({
            "backend": resolution.backend.as_str(),
            "source": resolution.source.as_str(),
            "decision": resolution.decision.map(BackendDecision::as_str),
        }),
    );
    if resolution.source == BackendSource::AmbiguousDefault {
        return Ok(outcome.with_hint(format!(
            "set `{KEY_BACKEND}` in {} to choose a backend explicitly",
            ctx.defaults().config_path
        )));
    }
    Ok(outcome)
}

fn name(ctx: &ProjectContext, args: &NameArgs) -> Result<Outcome> {
    let resolved = resolve_name(ctx, args.env_name.as_deref()).map_err(PenvError::from)?;
    if args.check {
        validate_name(&resolved.name).map_err(PenvError::from)?;
    }
    Ok(Outcome::new(
        format!("environment name: {} ({})", resolved.name, resolved.source.as_str()),
        json!({
            "name": resolved.name,
            "source": resolved.source.as_str(),
        }),
    ))
}

fn lock(ctx: &ProjectContext, args: &LockArgs, no_input: bool) -> Result<Outcome> {
    let resolution = resolve_backend(ctx, None).map_err(PenvError::from)?;
    if resolution.backend != Backend::ManagedEnv {
        return Ok(Outcome::new(
            format!("lock check skipped: project uses the {} backend", resolution.backend),
            json!({ "backend": resolution.backend.as_str(), "status": Value::Null }),
        ));
    }

    let pair = LockPair::for_project(ctx);
    let hint = pair.regenerate_hint();
    let interactive = !no_input && stdin_is_interactive();
    let confirm = prompt::confirm;
    let validator = LockFileValidator::new(pair, args.strict, interactive, &confirm);
    let check = validator.validate().map_err(PenvError::from)?;

    let defaults = ctx.defaults();
    let message = match check.status() {
        LockPairStatus::Fresh => format!("{} is up to date", defaults.environment_lock),
        LockPairStatus::LockOnly => format!(
            "{} has no {} to compare against",
            defaults.environment_lock, defaults.environment_descriptor
        ),
        LockPairStatus::Stale => format!("continuing with stale {}", defaults.environment_lock),
        LockPairStatus::MissingLock => {
            format!("continuing without {}", defaults.environment_lock)
        }
        LockPairStatus::BothMissing => {
            format!("{} not found", defaults.environment_descriptor)
        }
    };
    let outcome = Outcome::new(
        message,
        json!({
            "status": check.status().as_str(),
            "continued": matches!(check, LockCheck::Continued(_)),
        }),
    );
    if matches!(check, LockCheck::Continued(_)) {
        return Ok(outcome.with_hint(format!("regenerate it with `{hint}`")));
    }
    Ok(outcome)
}

fn gitignore(ctx: &ProjectContext, args: &BackendArgs) -> Result<Outcome> {
    let resolution = resolve_backend(ctx, args.backend.as_deref()).map_err(PenvError::from)?;
    let dynamic = owned_ignore_patterns(ctx, resolution.backend);
    let known = all_owned_ignore_patterns(ctx);
    let defaults = ctx.defaults();
    let report = reconcile_ignore_file(
        &ctx.ignore_path(),
        &defaults.ignore_template,
        &dynamic,
        &known,
    )
    .map_err(PenvError::from)?;
    let action = match (report.created, report.changed) {
        (true, _) => "created",
        (false, true) => "updated",
        (false, false) => "unchanged",
    };
    Ok(Outcome::new(
        format!("{} {action}", defaults.ignore_file),
        json!({
            "backend": resolution.backend.as_str(),
            "created": report.created,
            "changed": report.changed,
            "patterns": dynamic,
            "template_version": IGNORE_TEMPLATE_VERSION,
        }),
    ))
}

fn gitignore_clean(ctx: &ProjectContext, args: &BackendArgs) -> Result<Outcome> {
    let resolution = resolve_backend(ctx, args.backend.as_deref()).map_err(PenvError::from)?;
    let patterns = owned_ignore_patterns(ctx, resolution.backend);
    let changed =
        remove_ignore_patterns(&ctx.ignore_path(), &patterns).map_err(PenvError::from)?;
    let ignore_file = &ctx.defaults().ignore_file;
    let message = if changed {
        format!("removed {} patterns from {ignore_file}", resolution.backend)
    } else {
        format!("{ignore_file} unchanged")
    };
    Ok(Outcome::new(
        message,
        json!({ "changed": changed, "patterns": patterns }),
    ))
}

fn validate(ctx: &ProjectContext) -> Outcome {
    let report = validate_project(ctx, env!("CARGO_PKG_VERSION"));
    let code = report.exit_code();
    let message = match code {
        0 => "project is valid",
        2 => "project is valid with warnings",
        _ => "project has errors",
    };
    let mut outcome = Outcome::new(message, json!({ "checks": &report.checks }));
    outcome.code = code;
    outcome.checks = report.checks;
    outcome
}

fn load_store(ctx: &ProjectContext) -> Result<ConfigStore> {
    let path = ctx.path(&ctx.defaults().config_path);
    let store = ConfigStore::load(path).map_err(PenvError::from)?;
    Ok(store)
}

fn config_get(ctx: &ProjectContext, args: &ConfigGetArgs) -> Result<Outcome> {
    let store = load_store(ctx)?;
    let Some(value) = store.get(&args.key) else {
        bail!("{} is not set in {}", args.key, ctx.defaults().config_path);
    };
    Ok(Outcome::new(value, json!({ "key": args.key, "value": value })))
}

fn config_set(ctx: &ProjectContext, args: &ConfigSetArgs) -> Result<Outcome> {
    let value = args.value.trim();
    match args.key.as_str() {
        KEY_BACKEND => {
            value.parse::<Backend>().map_err(PenvError::from)?;
        }
        KEY_MANAGED_ENV_NAME => validate_name(value).map_err(PenvError::from)?,
        _ => {}
    }
    let mut store = load_store(ctx)?;
    store.set(&args.key, value).map_err(PenvError::from)?;
    store
        .save()
        .with_context(|| format!("failed to save {}", store.path().display()))?;
    Ok(Outcome::new(
        format!("{} = {value}", args.key),
        json!({ "key": args.key, "value": value }),
    ))
}
