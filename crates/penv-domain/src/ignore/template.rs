/// Bumped whenever the line set below changes; idempotence of
/// reconciliation is only defined against a single version.
pub const IGNORE_TEMPLATE_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IgnoreSection {
    pub header: String,
    pub patterns: Vec<String>,
}

impl IgnoreSection {
    pub fn new(header: impl Into<String>, patterns: &[&str]) -> Self {
        Self {
            header: header.into(),
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

/// Ordered, tool-owned block written at the head of the ignore file. Dynamic
/// patterns are appended to the last section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IgnoreTemplate {
    sections: Vec<IgnoreSection>,
}

impl IgnoreTemplate {
    #[must_use]
    pub fn new(sections: Vec<IgnoreSection>) -> Self {
        Self { sections }
    }

    #[must_use]
    pub fn sections(&self) -> &[IgnoreSection] {
        &self.sections
    }

    /// Every non-blank line the template owns, headers included.
    pub fn owned_lines(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().flat_map(|section| {
            std::iter::once(section.header.as_str())
                .chain(section.patterns.iter().map(String::as_str))
        })
    }

    /// Head block with `dynamic` appended to the final section, one blank line
    /// between sections and no trailing blank.
    #[must_use]
    pub fn render_lines(&self, dynamic: &[String]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        let last = self.sections.len().saturating_sub(1);
        for (idx, section) in self.sections.iter().enumerate() {
            if idx > 0 {
                lines.push(String::new());
            }
            for line in std::iter::once(&section.header).chain(section.patterns.iter()) {
                if !seen.contains(&line.as_str()) {
                    seen.push(line);
                    lines.push(line.clone());
                }
            }
            if idx == last {
                for pattern in dynamic {
                    if pattern.trim().is_empty() || seen.contains(&pattern.as_str()) {
                        continue;
                    }
                    seen.push(pattern);
                    lines.push(pattern.clone());
                }
            }
        }
        if self.sections.is_empty() {
            for pattern in dynamic {
                if !pattern.trim().is_empty() && !lines.contains(pattern) {
                    lines.push(pattern.clone());
                }
            }
        }
        lines
    }
}

impl Default for IgnoreTemplate {
    fn default() -> Self {
        Self::new(vec![
            IgnoreSection::new("# macOS", &[".DS_Store"]),
            IgnoreSection::new(
                "# Python build and test artifacts",
                &[
                    "__pycache__",
                    "*.egg-info",
                    ".coverage",
                    "coverage.xml",
                    "htmlcov/",
                    ".pytest_cache/",
                    "dist/",
                    "build/",
                ],
            ),
            IgnoreSection::new("# Jupyter notebooks", &[".ipynb_checkpoints/"]),
            IgnoreSection::new("# Penv virtual environment", &[".penv/testenv", ".envrc"]),
        ])
    }
}
