use std::env;

use color_eyre::owo_colors::OwoColorize;
use penv_domain::CheckLevel;

pub struct Style {
    enabled: bool,
}

impl Style {
    pub fn new(force_no_color: bool, is_tty: bool) -> Self {
        let env_no_color = env::var_os("NO_COLOR").is_some();
        Self {
            enabled: !(force_no_color || env_no_color) && is_tty,
        }
    }

    pub fn status(&self, level: CheckLevel, text: &str) -> String {
        let (symbol, tone) = match level {
            CheckLevel::Ok => ("✔", Tone::Green),
            CheckLevel::Warning => ("!", Tone::Yellow),
            CheckLevel::Error => ("✖", Tone::Red),
        };
        let line = format!("{symbol} {text}");
        self.paint(&line, tone, level != CheckLevel::Ok)
    }

    pub fn info(&self, text: &str) -> String {
        self.paint(text, Tone::Blue, false)
    }

    pub fn error_code(&self, code: &str) -> String {
        let tag = format!("[{code}]");
        self.paint(&tag, Tone::Red, true)
    }

    pub fn hint(&self, hint: &str) -> String {
        if !self.enabled {
            return format!("penv ▸ Hint: {hint}");
        }
        let prefix = "penv ▸ Hint:".cyan().bold().to_string();
        format!("{prefix} {hint}")
    }

    fn paint(&self, text: &str, tone: Tone, bold: bool) -> String {
        if !self.enabled {
            return text.to_string();
        }
        match (tone, bold) {
            (Tone::Green, true) => text.green().bold().to_string(),
            (Tone::Green, false) => text.green().to_string(),
            (Tone::Yellow, true) => text.yellow().bold().to_string(),
            (Tone::Yellow, false) => text.yellow().to_string(),
            (Tone::Red, true) => text.red().bold().to_string(),
            (Tone::Red, false) => text.red().to_string(),
            (Tone::Blue, true) => text.cyan().bold().to_string(),
            (Tone::Blue, false) => text.cyan().to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Green,
    Yellow,
    Red,
    Blue,
}
