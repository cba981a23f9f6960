//! Application layer errors.
//!
//! These errors represent failures while driving introspection, not
//! malformed data. Data errors are `DomainError` from `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while building the metamodel.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Introspection of one class failed structurally.
    #[error("Introspection of '{class}' failed: {reason}")]
    IntrospectionFailed { class: String, reason: String },

    /// A factory raised an explicit metamodel error; the whole build stops.
    #[error("Metamodel build aborted by {factory} at {identifier}: {reason}")]
    MetaModelAborted {
        factory: String,
        identifier: String,
        reason: String,
    },

    /// Production-mode build finished with error-severity failures.
    #[error("Metamodel validation failed with {errors} error(s) and {warnings} warning(s)")]
    ValidationAborted { errors: usize, warnings: usize },

    /// The class source could not be read.
    #[error("Class source error: {reason}")]
    SourceUnavailable { reason: String },

    /// Specification cache access failed (lock poisoned).
    #[error("Specification cache error")]
    CacheLockError,

    /// Two factories registered under the same name.
    #[error("Facet factory '{name}' is registered twice")]
    DuplicateFactory { name: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::IntrospectionFailed { class, .. } => vec![
                format!("Check the declaration of '{}'", class),
                "Run: metamodel validate to see every failure".into(),
            ],
            Self::MetaModelAborted { factory, .. } => vec![
                format!("Factory '{}' refused to continue", factory),
                "Fix the reported element; this error is never downgraded".into(),
            ],
            Self::ValidationAborted { .. } => vec![
                "Run: metamodel validate --mode prototype to list the failures".into(),
                "Fix every error-severity failure before deploying".into(),
            ],
            Self::SourceUnavailable { .. } => vec![
                "Check the classes directory in your configuration".into(),
            ],
            Self::CacheLockError => vec![
                "The specification cache is unusable after a panic".into(),
                "Restart the process to rebuild the metamodel".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IntrospectionFailed { .. } => ErrorCategory::Structural,
            Self::MetaModelAborted { .. } | Self::ValidationAborted { .. } => ErrorCategory::Aborted,
            Self::SourceUnavailable { .. } => ErrorCategory::Configuration,
            Self::CacheLockError | Self::DuplicateFactory { .. } => ErrorCategory::Internal,
        }
    }

    pub fn is_per_class(&self) -> bool {
        matches!(self, Self::IntrospectionFailed { .. })
    }
}
