//! Parser for the `.penv/config` format.
//!
//! The grammar is a single level of `key: value` nesting:
//!
//! ```text
//! document  := line*
//! comment   := ws* "#" any*
//! scalar    := key ":" ws* value          (column 0, non-empty value)
//! section   := key ":" ws*                (column 0, empty value)
//! entry     := ws+ key ":" ws* value      (belongs to the last open section)
//! value     := bare | "'" chars "'" | '"' chars '"'
//! ```
//!
//! Anything else (list items, colon-less lines, indented entries with no open
//! section, deeper nesting) is skipped rather than rejected.

use indexmap::IndexMap;

use super::ConfigKeyError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigValue {
    Scalar(String),
    Section(IndexMap<String, String>),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    entries: IndexMap<String, ConfigValue>,
    skipped: usize,
}

impl ConfigDocument {
    #[must_use]
    pub fn parse(contents: &str) -> Self {
        let mut doc = Self::default();
        let mut open_section: Option<String> = None;

        for raw in contents.lines() {
            let line = raw.trim_end();
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let indented = trimmed.len() != line.len();
            let Some((key, value)) = split_entry(trimmed) else {
                doc.skipped += 1;
                continue;
            };

            if indented {
                match open_section.as_ref() {
                    Some(section) if !value.is_empty() => {
                        if let Some(ConfigValue::Section(map)) = doc.entries.get_mut(section) {
                            map.insert(key.to_string(), unquote(value).to_string());
                        }
                    }
                    _ => doc.skipped += 1,
                }
                continue;
            }

            if value.is_empty() {
                doc.entries
                    .entry(key.to_string())
                    .and_modify(|existing| {
                        if !matches!(existing, ConfigValue::Section(_)) {
                            *existing = ConfigValue::Section(IndexMap::new());
                        }
                    })
                    .or_insert_with(|| ConfigValue::Section(IndexMap::new()));
                open_section = Some(key.to_string());
            } else {
                doc.entries.insert(
                    key.to_string(),
                    ConfigValue::Scalar(unquote(value).to_string()),
                );
                open_section = None;
            }
        }
        doc
    }

    /// Looks up `key` or `section.key`. A dotted key only ever reads from its
    /// own section.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match key.split_once('.') {
            Some((section, sub)) => match self.entries.get(section)? {
                ConfigValue::Section(map) => map.get(sub).map(String::as_str),
                ConfigValue::Scalar(_) => None,
            },
            None => match self.entries.get(key)? {
                ConfigValue::Scalar(value) => Some(value.as_str()),
                ConfigValue::Section(_) => None,
            },
        }
    }

    /// Sets `key` or `section.key`, replacing a scalar with a section (or the
    /// reverse) when the shape changes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigKeyError`] for keys the parser could not read back,
    /// such as `a.b.c` or names with spaces.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigKeyError> {
        let writable = match key.split_once('.') {
            Some((section, sub)) => is_key(section) && is_key(sub),
            None => is_key(key),
        };
        if !writable {
            return Err(ConfigKeyError {
                key: key.to_string(),
            });
        }
        match key.split_once('.') {
            Some((section, sub)) => {
                let entry = self
                    .entries
                    .entry(section.to_string())
                    .or_insert_with(|| ConfigValue::Section(IndexMap::new()));
                if !matches!(entry, ConfigValue::Section(_)) {
                    *entry = ConfigValue::Section(IndexMap::new());
                }
                if let ConfigValue::Section(map) = entry {
                    map.insert(sub.to_string(), value.to_string());
                }
            }
            None => {
                self.entries
                    .insert(key.to_string(), ConfigValue::Scalar(value.to_string()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of non-blank, non-comment lines the parser could not place.
    #[must_use]
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn entries(&self) -> &IndexMap<String, ConfigValue> {
        &self.entries
    }

    /// Renders top-level scalars first, then each section, in insertion order.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            if let ConfigValue::Scalar(value) = value {
                out.push_str(&format!("{key}: {}\n", quote_if_needed(value)));
            }
        }
        for (key, value) in &self.entries {
            if let ConfigValue::Section(map) = value {
                if map.is_empty() {
                    continue;
                }
                out.push_str(&format!("{key}:\n"));
                for (sub, value) in map {
                    out.push_str(&format!("  {sub}: {}\n", quote_if_needed(value)));
                }
            }
        }
        out
    }
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    if line.starts_with('-') {
        return None;
    }
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if !is_key(key) {
        return None;
    }
    Some((key, value.trim()))
}

fn is_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('-')
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-'))
}

pub(crate) fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn quote_if_needed(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value != value.trim()
        || value.starts_with(['"', '\'', '#', '-'])
        || value.contains(": ")
        || looks_numeric(value);
    if needs_quotes && !value.contains('"') {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

fn looks_numeric(value: &str) -> bool {
    value.chars().next().is_some_and(|ch| ch.is_ascii_digit())
        && value.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
}
