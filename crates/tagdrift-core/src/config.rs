//! Mining run configuration.
//!
//! A [`MinerConfig`] starts from defaults, is optionally replaced by a TOML
//! file, and is then overridden field by field by the CLI.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::ConfigError;
use crate::git::DEFAULT_DIFF_CONTEXT;
use crate::scan::DEFAULT_HEADER_WINDOW;

pub const DEFAULT_EXTENSION: &str = "java";
pub const DEFAULT_COMMIT_URL_PREFIX: &str = "https://github.com/albertogoffi/toradocu/commit/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinerConfig {
    /// Tracked file extension, without the dot.
    pub extension: String,
    /// Prepended to commit ids to build report links.
    pub commit_url_prefix: String,
    /// Lines a header search may span before giving up.
    pub header_window: usize,
    /// Unified diff context requested from git.
    pub diff_context: usize,
    /// Commits classified concurrently.
    pub jobs: usize,
    /// Restrict the run to one commit.
    pub only_commit: Option<String>,
    pub output_dir: PathBuf,
    /// WHATWG labels tried after UTF-8 when decoding patches.
    pub fallback_encodings: Vec<String>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            commit_url_prefix: DEFAULT_COMMIT_URL_PREFIX.to_string(),
            header_window: DEFAULT_HEADER_WINDOW,
            diff_context: DEFAULT_DIFF_CONTEXT,
            jobs: 1,
            only_commit: None,
            output_dir: PathBuf::from("."),
            fallback_encodings: Vec::new(),
        }
    }
}

impl MinerConfig {
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.display().to_string(),
            source,
        })
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extension.trim().is_empty() {
            return Err(ConfigError::Invalid("extension must not be empty".into()));
        }
        if self.header_window == 0 {
            return Err(ConfigError::Invalid("header_window must be at least 1".into()));
        }
        if self.jobs == 0 {
            return Err(ConfigError::Invalid("jobs must be at least 1".into()));
        }
        Ok(())
    }

    /// The tracked extension without a leading dot.
    pub fn normalized_extension(&self) -> &str {
        self.extension.trim().trim_start_matches('.')
    }
}
