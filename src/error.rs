//! Error types with fix suggestions
//!
//! Only two kinds of failure are translated into diagnostic text by the
//! renderer: [`RenderError::TemplateNotFound`] and
//! [`RenderError::RenderFailure`]. Everything else (config, data) is a plain
//! error for programmatic callers.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::report;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Failure of a single render call.
///
/// `Display` produces the human-readable diagnostic returned by the
/// string-returning entry points.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{}", report::not_found_message(.path, .source))]
    TemplateNotFound {
        /// Resolved absolute path that failed to read
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}", report::render_failure_message(.path.as_deref(), .content, .source))]
    RenderFailure {
        /// Full template content that was being evaluated
        content: Arc<str>,
        /// Path or hint, `None` for raw content
        path: Option<String>,
        #[source]
        source: EvalError,
    },
}

impl RenderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RenderError::TemplateNotFound { .. })
    }
}

/// Failure raised by an [`Evaluator`](crate::evaluator::Evaluator).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct EvalError {
    kind: String,
    message: String,
    #[source]
    source: Option<minijinja::Error>,
}

impl EvalError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Kind label shown as "Error code" in diagnostics
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<minijinja::Error> for EvalError {
    fn from(err: minijinja::Error) -> Self {
        Self {
            kind: format!("{:?}", err.kind()),
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Caller data that cannot be used as a binding set.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Template data must be a map, got {kind}")]
    NotAMap { kind: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: String, value: String },
}

impl FixSuggestion for RenderError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            RenderError::TemplateNotFound { .. } => {
                Some("Check the template path; relative paths resolve against the working directory or configured root")
            }
            RenderError::RenderFailure { .. } => {
                Some("Check that every ${...} expression only uses names passed in the data")
            }
        }
    }
}

impl FixSuggestion for ConfigError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            ConfigError::Read { .. } => Some("Check the config file path and permissions"),
            ConfigError::Parse { .. } => {
                Some("Check YAML syntax: max_include_depth, strict_undefined, root")
            }
            ConfigError::InvalidEnv { .. } => {
                Some("Use an unsigned integer for depths and true/false for flags")
            }
        }
    }
}
