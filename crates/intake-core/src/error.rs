//! Error taxonomy shared by every pipeline stage
//!
//! Each variant maps onto one response class of the enclosing request
//! layer (see [`CoreError::status_code`]).

/// Errors raised by the domain model and by collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Bad input shape or a missing required field
    #[error("validation failed: {0}")]
    Validation(String),

    /// Case, task, document or stored object missing
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Task does not belong to the referenced case
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Required template or config value missing
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Storage, email or AI call failed
    #[error("{service} failed: {message}")]
    Collaborator {
        service: &'static str,
        message: String,
    },

    /// Conditional write lost against a concurrent update
    #[error("conflict: {0}")]
    Conflict(String),

    /// A collaborator the operation needs was never configured
    #[error("required collaborator not configured: {0}")]
    Unavailable(&'static str),
}

impl CoreError {
    /// Create not-found error
    #[inline]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create collaborator failure
    #[inline]
    pub fn collaborator(service: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            service,
            message: message.into(),
        }
    }

    /// Status code the request layer reports for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Configuration(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound { .. } => 404,
            Self::Conflict(_) => 409,
            Self::Collaborator { .. } => 500,
            Self::Unavailable(_) => 503,
        }
    }

    /// Whether the user may simply try again
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Collaborator { .. } | Self::Conflict(_))
    }
}

/// Result alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
