//! Project configuration (`folio.toml`) parsing and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::language::{LanguageDescriptor, LanguageRegistry, RegistryError};
use crate::unit::{normalize_path, OutputMapper, OutputNaming, DEFAULT_INDEX};

/// Conventional configuration file name.
pub const CONFIG_FILE: &str = "folio.toml";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("jobs must be at least 1")]
    ZeroJobs,

    #[error("language #{0} has an empty name")]
    UnnamedLanguage(usize),

    #[error("language '{0}' claims no extension or file name")]
    UnclaimedLanguage(String),

    #[error("language '{language}' has an empty {marker} marker")]
    EmptyMarker {
        language: String,
        marker: &'static str,
    },

    #[error(transparent)]
    Conflict(#[from] RegistryError),
}

/// The complete folio.toml file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    /// Languages added to (or replacing) the built-in table.
    #[serde(default, rename = "language")]
    pub languages: Vec<LanguageDescriptor>,
}

/// The `[project]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Site title; defaults to the input directory name.
    #[serde(default)]
    pub name: Option<String>,

    /// Output directory.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Source file rendered as the front page. An empty string disables it.
    #[serde(default)]
    pub index: Option<String>,

    /// Leading directories removed from output paths.
    #[serde(default)]
    pub strip: Vec<String>,

    /// Glob patterns of paths to leave out.
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub naming: Option<OutputNaming>,

    /// Worker threads used for segmentation and rendering.
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.jobs == Some(0) {
            return Err(ConfigError::ZeroJobs);
        }
        for (index, language) in self.languages.iter().enumerate() {
            validate_language(index, language)?;
        }
        // Configured languages may replace built-ins but not each other.
        let mut configured = LanguageRegistry::new();
        for language in &self.languages {
            configured.register(language.clone())?;
        }
        Ok(())
    }

    /// Built-in languages with the configured ones layered on top.
    pub fn registry(&self) -> LanguageRegistry {
        let mut registry = LanguageRegistry::builtin();
        for language in &self.languages {
            let mut language = language.clone();
            if language.highlighter.is_empty() {
                language.highlighter = language.name.to_lowercase();
            }
            tracing::debug!(language = %language.name, "registering configured language");
            registry.override_with(language);
        }
        registry
    }

    /// Output path mapping described by the `[project]` section.
    pub fn output_mapper(&self) -> OutputMapper {
        let index = match self.project.index.as_deref() {
            None => Some(DEFAULT_INDEX.to_string()),
            Some("") => None,
            Some(index) => Some(normalize_path(index)),
        };
        OutputMapper {
            strip: self.project.strip.clone(),
            naming: self.project.naming.unwrap_or_default(),
            index,
        }
    }
}

fn validate_language(index: usize, language: &LanguageDescriptor) -> Result<(), ConfigError> {
    if language.name.trim().is_empty() {
        return Err(ConfigError::UnnamedLanguage(index));
    }
    if language.extensions.is_empty() && language.file_names.is_empty() {
        return Err(ConfigError::UnclaimedLanguage(language.name.clone()));
    }

    let empty = |marker| ConfigError::EmptyMarker {
        language: language.name.clone(),
        marker,
    };
    if language.line_comments.iter().any(String::is_empty) {
        return Err(empty("line comment"));
    }
    for block in &language.block_comments {
        if block.open.is_empty() {
            return Err(empty("block open"));
        }
        if block.close.is_empty() {
            return Err(empty("block close"));
        }
        if block.middle.as_deref() == Some("") {
            return Err(empty("block middle"));
        }
    }
    if language.ignore_prefix.as_deref() == Some("") {
        return Err(empty("ignore prefix"));
    }
    if language.fold_prefix.as_deref() == Some("") {
        return Err(empty("fold prefix"));
    }
    Ok(())
}
