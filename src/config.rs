//! Renderer configuration
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`TEMPLATED_VIEWS_MAX_INCLUDE_DEPTH`,
//!    `TEMPLATED_VIEWS_STRICT_UNDEFINED`, `TEMPLATED_VIEWS_ROOT`)
//! 2. Config file (YAML, passed explicitly)
//! 3. Defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_MAX_INCLUDE_DEPTH: &str = "TEMPLATED_VIEWS_MAX_INCLUDE_DEPTH";
pub const ENV_STRICT_UNDEFINED: &str = "TEMPLATED_VIEWS_STRICT_UNDEFINED";
pub const ENV_ROOT: &str = "TEMPLATED_VIEWS_ROOT";

/// Settings for a [`Renderer`](crate::Renderer)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Maximum `include` nesting below the outermost template
    pub max_include_depth: usize,

    /// Fail on names missing from the data instead of printing nothing
    pub strict_undefined: bool,

    /// Base directory for relative template paths (default: working directory)
    pub root: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_include_depth: 32,
            strict_undefined: true,
            root: None,
        }
    }
}

impl RenderConfig {
    /// Load a YAML config file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file(path)?.with_env_overrides()
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Parse a YAML config file without looking at the environment.
    ///
    /// An empty file yields the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from a variable lookup (the environment in production).
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_MAX_INCLUDE_DEPTH) {
            self.max_include_depth = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_MAX_INCLUDE_DEPTH.to_string(),
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_STRICT_UNDEFINED) {
            self.strict_undefined = parse_flag(&value).ok_or_else(|| ConfigError::InvalidEnv {
                var: ENV_STRICT_UNDEFINED.to_string(),
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup(ENV_ROOT) {
            if !value.is_empty() {
                self.root = Some(PathBuf::from(value));
            }
        }
        Ok(self)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
