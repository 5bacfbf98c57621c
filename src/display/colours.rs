//! Core colour management for CLI output

use colored::{ColoredString, Colorize};
use std::env;

/// Manages colour output for the CLI application
#[derive(Debug, Clone)]
pub struct ColourManager {
    enabled: bool,
}

impl ColourManager {
    /// Colours on unless `NO_COLOR` is set
    pub fn new() -> Self {
        Self::from_args(false)
    }

    /// Create a ColourManager with explicit colour control
    pub fn with_colours(enabled: bool) -> Self {
        Self { enabled }
    }

    /// CLI `--no-color` overrides everything, then `NO_COLOR`
    pub fn from_args(no_color_flag: bool) -> Self {
        let no_color_env = env::var_os("NO_COLOR").map_or(false, |v| !v.is_empty());
        Self::with_colours(!no_color_flag && !no_color_env)
    }

    pub fn colours_enabled(&self) -> bool {
        self.enabled
    }

    pub fn error(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.red())
    }

    pub fn warning(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.yellow())
    }

    pub fn info(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.blue())
    }

    pub fn success(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.green())
    }

    pub fn highlight(&self, text: &str) -> ColoredString {
        self.paint(text, |t| t.cyan().bold())
    }

    /// Colour a load status label by severity
    pub fn status(&self, label: &str) -> ColoredString {
        match label {
            "loaded" | "enabled" => self.success(label),
            "excluded" | "disabled" => self.warning(label),
            "not found" | "failed" | "unavailable" => self.error(label),
            _ => label.normal(),
        }
    }

    fn paint<F>(&self, text: &str, colour: F) -> ColoredString
    where
        F: FnOnce(&str) -> ColoredString,
    {
        if self.enabled {
            colour(text)
        } else {
            text.normal()
        }
    }
}

impl Default for ColourManager {
    fn default() -> Self {
        Self::new()
    }
}
