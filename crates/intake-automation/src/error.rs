//! Umbrella error for pipeline operations
//!
//! Composes the per-crate errors so a request layer can map any failure to
//! a response class with [`PipelineError::status_code`].

use intake_compose::ComposeError;
use intake_core::CoreError;
use intake_templates::TemplateError;
use std::path::PathBuf;

/// Errors surfaced by intake, document and automation operations
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Domain, validation or collaborator failure
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Template lookup or rendering failed
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Letterhead or PDF composition failed
    #[error("compose error: {0}")]
    Compose(#[from] ComposeError),

    /// Document bundle could not be written
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Invocation exceeded the configured request timeout
    #[error("operation timed out after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Configuration file could not be read or parsed
    #[error("invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl PipelineError {
    /// Create configuration-file error
    pub fn config(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Config {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Status code the request layer reports for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Core(e) => e.status_code(),
            Self::Template(e) => e.status_code(),
            Self::Compose(e) if e.is_configuration() => 400,
            Self::Config { .. } => 400,
            Self::Compose(_) | Self::Archive(_) => 500,
            Self::Timeout { .. } => 504,
        }
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Core(e) => e.is_retryable(),
            Self::Timeout { .. } => true,
            Self::Template(TemplateError::Io { .. }) => true,
            _ => false,
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
