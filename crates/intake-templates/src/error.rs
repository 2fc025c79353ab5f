//! Error types for template loading and rendering

use std::path::PathBuf;

/// Errors raised while loading or rendering a template
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No resource backs the identifier
    #[error("template not found: '{0}'")]
    NotFound(String),

    /// Identifier contains characters outside `[A-Za-z0-9_-]`
    #[error("invalid template id: '{0}'")]
    InvalidId(String),

    /// Malformed template syntax or a failing helper
    #[error("failed to render template '{template}': {message}")]
    Render { template: String, message: String },

    /// IO error while reading a template file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    /// Create render error for template
    pub fn render(template: impl Into<String>, message: impl ToString) -> Self {
        Self::Render {
            template: template.into(),
            message: message.to_string(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Status code the request layer reports for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidId(_) => 400,
            Self::Render { .. } | Self::Io { .. } => 500,
        }
    }
}

/// Result type alias for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;
