use std::path::Path;

use tracing::{debug, warn};

use crate::{context::ProjectContext, descriptor::EnvironmentDescriptor};

pub const MAX_NAME_LEN: usize = 255;
pub const RESERVED_NAMES: [&str; 6] = ["base", "root", "default", "conda", "mamba", "micromamba"];
const DIGIT_PREFIX: &str = "env-";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("environment name is empty")]
    Empty,
    #[error("environment name '{0}' is reserved; choose a different name")]
    Reserved(String),
    #[error("environment name '{name}' is {len} characters long (max {})", MAX_NAME_LEN)]
    TooLong { name: String, len: usize },
    #[error(
        "environment name '{0}' contains invalid characters (allowed: letters, digits, '_' and '-')"
    )]
    InvalidChars(String),
    #[error("environment name '{0}' must start with a letter or underscore")]
    BadStart(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{raw}' does not contain any usable characters for an environment name")]
pub struct EmptyName {
    pub raw: String,
}

/// Turns arbitrary text into a syntactically valid environment name.
///
/// Reserved words pass through untouched; callers creating an environment
/// must still run [`validate_name`].
pub fn sanitize_name(raw: &str) -> Result<String, EmptyName> {
    let lowered = raw.to_lowercase();
    let mut result = String::with_capacity(lowered.len());
    let mut in_run = false;
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-') {
            result.push(ch);
            in_run = false;
        } else if !in_run {
            result.push('-');
            in_run = true;
        }
    }
    let trimmed = result.trim_matches('-');
    if trimmed.is_empty() {
        return Err(EmptyName {
            raw: raw.to_string(),
        });
    }
    let mut name = if trimmed.starts_with(|ch: char| ch.is_ascii_lowercase() || ch == '_') {
        trimmed.to_string()
    } else {
        format!("{DIGIT_PREFIX}{trimmed}")
    };
    // only ASCII remains, so byte truncation is char-safe
    name.truncate(MAX_NAME_LEN);
    let end = name.trim_end_matches('-').len();
    name.truncate(end);
    Ok(name)
}

/// Checks a candidate name, reporting the first rule it breaks.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong {
            name: name.to_string(),
            len,
        });
    }
    if !name.starts_with(|ch: char| ch.is_ascii_alphabetic() || ch == '_') {
        return Err(NameError::BadStart(name.to_string()));
    }
    if !name
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-'))
    {
        return Err(NameError::InvalidChars(name.to_string()));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(NameError::Reserved(name.to_string()));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameSource {
    Override,
    Config,
    Descriptor,
    Directory,
}

impl NameSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NameSource::Override => "override",
            NameSource::Config => "config",
            NameSource::Descriptor => "descriptor",
            NameSource::Directory => "directory",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    pub source: NameSource,
}

/// Picks the environment name: explicit override, stored config, the
/// descriptor's `name:` field, then the sanitized directory name.
///
/// The result is not validated; reserved or malformed names from the first
/// three sources are returned as-is so environment creation can report them.
///
/// # Errors
///
/// Returns [`EmptyName`] when the directory name sanitizes to nothing.
pub fn resolve_name(
    ctx: &ProjectContext,
    override_value: Option<&str>,
) -> Result<ResolvedName, EmptyName> {
    let resolved = |name: &str, source| ResolvedName {
        name: name.to_string(),
        source,
    };

    if let Some(name) = override_value.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(resolved(name, NameSource::Override));
    }
    if let Some(name) = ctx.config().managed_env_name.as_deref().map(str::trim) {
        if !name.is_empty() {
            return Ok(resolved(name, NameSource::Config));
        }
    }
    match EnvironmentDescriptor::read(&ctx.descriptor_path()) {
        Ok(Some(EnvironmentDescriptor {
            name: Some(name), ..
        })) => return Ok(resolved(name.as_str(), NameSource::Descriptor)),
        Ok(_) => {}
        Err(err) => warn!(%err, "skipping unreadable environment descriptor"),
    }

    let name = sanitize_name(&directory_basename(ctx.root()))?;
    debug!(%name, "environment name derived from project directory");
    Ok(ResolvedName {
        name,
        source: NameSource::Directory,
    })
}

fn directory_basename(root: &Path) -> String {
    let canonical = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ConfigStore, defaults::Defaults};
    use std::fs;
    use tempfile::tempdir;

    fn context_in(root: &Path, config: &str) -> ProjectContext {
        let defaults = Defaults::default();
        let store = ConfigStore::from_contents(root.join(&defaults.config_path), config);
        ProjectContext::with_store(root, defaults, store)
    }

    #[test]
    fn sanitize_collapses_punctuation_and_case() {
        assert_eq!(sanitize_name("My Cool Project!").unwrap(), "my-cool-project");
        assert_eq!(sanitize_name("  spaced   out  ").unwrap(), "spaced-out");
        assert_eq!(sanitize_name("keep_under-score").unwrap(), "keep_under-score");
        assert_eq!(sanitize_name("dots.and/slashes").unwrap(), "dots-and-slashes");
        assert_eq!(sanitize_name("Café Ölé").unwrap(), "caf-l");
    }

    #[test]
    fn sanitize_prefixes_non_letter_starts() {
        assert_eq!(sanitize_name("123project").unwrap(), "env-123project");
        assert_eq!(sanitize_name("-_x").unwrap(), "_x");
        assert_eq!(sanitize_name("42").unwrap(), "env-42");
    }

    #[test]
    fn sanitize_rejects_inputs_without_usable_characters() {
        for raw in ["", "!!!", "---", "   ", "日本"] {
            assert_eq!(
                sanitize_name(raw),
                Err(EmptyName {
                    raw: raw.to_string()
                })
            );
        }
    }

    #[test]
    fn sanitize_truncates_without_trailing_hyphen() {
        let raw = format!("{}!tail", "a".repeat(254));
        let name = sanitize_name(&raw).unwrap();
        assert_eq!(name.len(), 254);
        assert!(!name.ends_with('-'));
        assert_eq!(sanitize_name(&"b".repeat(400)).unwrap().len(), MAX_NAME_LEN);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let samples = [
            "My Cool Project!",
            "123project",
            "__init__",
            "a--b",
            "UPPER lower",
            "-leading",
            "trailing-",
            "x/y\\z",
            "9-",
        ];
        let long = format!("1{}", "-a".repeat(200));
        for raw in samples.iter().copied().chain(std::iter::once(long.as_str())) {
            let once = sanitize_name(raw).unwrap();
            assert_eq!(sanitize_name(&once).unwrap(), once, "input: {raw}");
        }
    }

    #[test]
    fn sanitized_names_validate_unless_reserved() {
        for raw in ["My Cool Project!", "123project", "x".repeat(300).as_str()] {
            let name = sanitize_name(raw).unwrap();
            assert!(validate_name(&name).is_ok(), "{name}");
        }
        let name = sanitize_name("Base").unwrap();
        assert_eq!(name, "base");
        assert_eq!(validate_name(&name), Err(NameError::Reserved("base".into())));
    }

    #[test]
    fn validate_reports_each_rule() {
        assert_eq!(validate_name(""), Err(NameError::Empty));
        assert!(matches!(
            validate_name(&"a".repeat(256)),
            Err(NameError::TooLong { len: 256, .. })
        ));
        assert!(validate_name(&"a".repeat(255)).is_ok());
        assert_eq!(validate_name("1abc"), Err(NameError::BadStart("1abc".into())));
        assert_eq!(validate_name("-abc"), Err(NameError::BadStart("-abc".into())));
        assert_eq!(
            validate_name("has space"),
            Err(NameError::InvalidChars("has space".into()))
        );
        for reserved in RESERVED_NAMES {
            assert_eq!(
                validate_name(reserved),
                Err(NameError::Reserved(reserved.to_string()))
            );
        }
        assert!(validate_name("Mixed_Case-1").is_ok());
        assert!(validate_name("_private").is_ok());
    }

    #[test]
    fn resolution_order_is_override_config_descriptor_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("My Cool Project!");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("environment.yml"), "name: from-descriptor\ndependencies:\n").unwrap();

        let ctx = context_in(&root, "managed_env:\n  name: from-config\n");
        let name = resolve_name(&ctx, Some("cli-name")).unwrap();
        assert_eq!((name.name.as_str(), name.source), ("cli-name", NameSource::Override));
        let name = resolve_name(&ctx, Some("  ")).unwrap();
        assert_eq!((name.name.as_str(), name.source), ("from-config", NameSource::Config));

        let ctx = context_in(&root, "");
        let name = resolve_name(&ctx, None).unwrap();
        assert_eq!(
            (name.name.as_str(), name.source),
            ("from-descriptor", NameSource::Descriptor)
        );

        fs::remove_file(root.join("environment.yml")).unwrap();
        let name = resolve_name(&ctx, None).unwrap();
        assert_eq!(
            (name.name.as_str(), name.source),
            ("my-cool-project", NameSource::Directory)
        );
    }

    #[test]
    fn directory_starting_with_digit_gets_prefix() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("123project");
        fs::create_dir_all(&root).unwrap();
        let ctx = context_in(&root, "");
        assert_eq!(resolve_name(&ctx, None).unwrap().name, "env-123project");
    }

    #[test]
    fn reserved_names_are_returned_for_the_caller_to_reject() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("proj");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("environment.yml"), "name: base\n").unwrap();
        let ctx = context_in(&root, "");
        let resolved = resolve_name(&ctx, None).unwrap();
        assert_eq!(resolved.name, "base");
        assert!(matches!(
            validate_name(&resolved.name),
            Err(NameError::Reserved(_))
        ));

        let root = dir.path().join("Conda");
        fs::create_dir_all(&root).unwrap();
        let ctx = context_in(&root, "");
        let resolved = resolve_name(&ctx, None).unwrap();
        assert_eq!(resolved.name, "conda");
        assert!(validate_name(&resolved.name).is_err());
    }

    #[test]
    fn override_values_are_not_validated() {
        let dir = tempdir().unwrap();
        let ctx = context_in(dir.path(), "");
        let resolved = resolve_name(&ctx, Some("root")).unwrap();
        assert_eq!(resolved.name, "root");
    }
}
