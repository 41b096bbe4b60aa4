//! Configuration file support
//!
//! Loads settings from ~/.spurc.toml (or %USERPROFILE%\.spurc.toml on Windows)
//!
//! Every key is optional. Example:
//! ```text
//! # SpurC configuration
//! show-line-numbers = true
//! tab-width = 4
//! max-file-size = 10485760
//! keywords = ["int", "return", "struct"]
//!
//! [styles.keyword]
//! fg = "#a6cee3"
//! bold = true
//!
//! [styles.string]
//! fg = "yellow"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::syntax::{Color, KeywordSet, Style, Theme, TokenCategory};

/// Largest file the editor will open, in bytes
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Configuration settings
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to show the line-number gutter
    pub show_line_numbers: bool,
    /// Tab width for display
    pub tab_width: usize,
    /// Files larger than this are refused
    pub max_file_size: u64,
    /// Words highlighted as keywords
    pub keywords: KeywordSet,
    /// Editor and token styles
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_line_numbers: true,
            tab_width: 4,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            keywords: KeywordSet::builtin(),
            theme: Theme::default(),
        }
    }
}

/// On-disk shape of the config file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ConfigFile {
    show_line_numbers: Option<bool>,
    tab_width: Option<usize>,
    max_file_size: Option<u64>,
    keywords: Option<Vec<String>>,
    #[serde(default)]
    styles: BTreeMap<String, StyleSpec>,
}

#[derive(Debug, Default, Deserialize)]
struct StyleSpec {
    fg: Option<String>,
    bold: Option<bool>,
    italic: Option<bool>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".spurc.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".spurc.toml"))
        }
    }

    /// Load configuration from the config file; a missing file means defaults
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!(path = %path.display(), "loading config");
                Self::parse(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse config file contents over the defaults
    pub fn parse(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        let mut config = Self::default();
        config.apply(file);
        Ok(config)
    }

    fn apply(&mut self, file: ConfigFile) {
        if let Some(show) = file.show_line_numbers {
            self.show_line_numbers = show;
        }

        if let Some(n) = file.tab_width {
            self.tab_width = n.clamp(1, 16);
        }

        if let Some(n) = file.max_file_size {
            self.max_file_size = n;
        }

        if let Some(words) = file.keywords {
            self.keywords = KeywordSet::from_words(words);
        }

        for (name, spec) in file.styles {
            let Some(category) = TokenCategory::from_name(&name) else {
                warn!(category = %name, "unknown style category in config");
                continue;
            };
            let style = spec.apply_to(self.theme.style(category));
            self.theme.set_style(category, style);
        }
    }
}

impl StyleSpec {
    /// Overlay the keys that are set onto `style`
    fn apply_to(&self, mut style: Style) -> Style {
        if let Some(fg) = &self.fg {
            match Color::parse(fg) {
                Some(color) => style.fg = color,
                None => warn!(color = %fg, "unrecognised colour in config"),
            }
        }
        if let Some(bold) = self.bold {
            style.bold = bold;
        }
        if let Some(italic) = self.italic {
            style.italic = italic;
        }
        style
    }
}
