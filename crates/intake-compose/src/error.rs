//! Error types for PDF composition

use std::path::PathBuf;

/// Errors while loading a letterhead or writing the composed document
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Letterhead file does not exist
    #[error("letterhead not found: {0}")]
    LetterheadMissing(PathBuf),

    /// Letterhead has no pages to draw on
    #[error("letterhead has no pages")]
    EmptyLetterhead,

    /// IO error reading the letterhead
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Page tree is missing a required entry
    #[error("malformed pdf: {0}")]
    Malformed(String),

    /// PDF parse or write error
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),
}

impl ComposeError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create malformed-structure error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Missing or unusable letterhead is a setup problem, not a runtime one
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::LetterheadMissing(_) | Self::EmptyLetterhead)
    }
}

/// Result type alias for composition
pub type ComposeResult<T> = Result<T, ComposeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_classification() {
        let err = ComposeError::LetterheadMissing(PathBuf::from("/tmp/lh.pdf"));
        assert_eq!(err.to_string(), "letterhead not found: /tmp/lh.pdf");
        assert!(err.is_configuration());
        assert!(!ComposeError::malformed("no Root").is_configuration());
    }
}
