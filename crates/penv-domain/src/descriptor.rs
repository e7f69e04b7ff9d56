use std::path::Path;

use anyhow::{Context, Result};

use crate::{config::unquote, fs::read_optional};

/// The handful of fields read from an environment descriptor file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvironmentDescriptor {
    pub name: Option<String>,
    pub channels: Vec<String>,
    pub has_dependencies: bool,
}

impl EnvironmentDescriptor {
    /// Reads the descriptor at `path`; `Ok(None)` when it does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let contents =
            read_optional(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(contents.as_deref().map(Self::parse))
    }

    #[must_use]
    pub fn parse(contents: &str) -> Self {
        let mut descriptor = Self::default();
        let mut in_channels = false;
        for raw in contents.lines() {
            let line = raw.trim_end();
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if trimmed.len() != line.len() || trimmed.starts_with('-') {
                if in_channels {
                    if let Some(item) = trimmed.strip_prefix('-') {
                        let item = unquote(item);
                        if !item.is_empty() {
                            descriptor.channels.push(item.to_string());
                        }
                    }
                }
                continue;
            }
            in_channels = false;
            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            match key.trim() {
                "name" => {
                    let value = unquote(value);
                    descriptor.name = (!value.is_empty()).then(|| value.to_string());
                }
                "channels" => in_channels = true,
                "dependencies" => descriptor.has_dependencies = true,
                _ => {}
            }
        }
        descriptor
    }
}
