//! Error taxonomy for the noema backend.
//!
//! Six caller-visible kinds: invalid argument, not found, unavailable,
//! deadline exceeded, external service, internal. Subsystem errors map
//! into these so the orchestrator can make degradation decisions on kind
//! alone.

mod storage_error;

pub use storage_error::StorageError;

/// Convenience alias used across the workspace.
pub type NoemaResult<T> = Result<T, NoemaError>;

/// Top-level error for the noema backend.
#[derive(Debug, thiserror::Error)]
pub enum NoemaError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("{source_name} unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },

    #[error("deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u64 },

    #[error("external service {service} failed: {reason}")]
    ExternalService { service: String, reason: String },

    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl NoemaError {
    /// Shorthand for an invalid-argument error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Shorthand for a not-found error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Shorthand for an unavailable-source error.
    pub fn unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is retriable by the caller.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::DeadlineExceeded { .. }
        )
    }
}

impl From<StorageError> for NoemaError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::RowNotFound { table, id } => Self::NotFound { entity: table, id },
            StorageError::Sqlite { message } => Self::Unavailable {
                source_name: "metadata".into(),
                reason: message,
            },
            StorageError::MigrationFailed { version, reason } => Self::Internal {
                reason: format!("migration v{version} failed: {reason}"),
            },
            StorageError::PoolPoisoned { message } => Self::Internal { reason: message },
            StorageError::Serialization { message } => Self::Internal { reason: message },
        }
    }
}
