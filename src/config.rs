use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub document: DocumentConfig,
    pub markdown: MarkdownConfig,
    pub fonts: FontConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Text of the `<title>` element in the generated HTML document.
    pub title: String,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: "Enterprise Maturity Assessment".to_string(),
            input: PathBuf::from("docs/ENTERPRISE_MATURITY_ASSESSMENT.md"),
            output: PathBuf::from("docs/ENTERPRISE_MATURITY_ASSESSMENT.pdf"),
        }
    }
}

/// Markdown extensions enabled when rendering the HTML fragment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub definition_lists: bool,
    pub heading_attributes: bool,
    pub smart_punctuation: bool,
    /// Give every heading an id and expand `[TOC]` paragraphs.
    pub toc: bool,
    /// Strip YAML front matter.
    pub frontmatter: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: true,
            definition_lists: true,
            heading_attributes: true,
            smart_punctuation: false,
            toc: true,
            frontmatter: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FontConfig {
    /// Search fonts installed on the system in addition to the embedded set.
    pub system: bool,
}

impl Config {
    /// The defaults compiled into the binary from `default_config.toml`.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Load config from a TOML file, or return the compiled defaults if the
    /// file is absent or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::compiled_default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{e}; using defaults");
                Self::compiled_default()
            }
        }
    }
}
