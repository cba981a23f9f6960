//! Unified error handling for the metamodel core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for metamodel operations.
#[derive(Debug, Error, Clone)]
pub enum MetamodelError {
    /// Errors from the domain layer (malformed identifiers, classes, values).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (introspection and orchestration).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Invalid configuration or introspection policy. Fatal at startup.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl MetamodelError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check the [introspection] section of your configuration".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in the metamodel".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Structural => ErrorCategory::Structural,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Whether the error is confined to a single class, so the rest of the
    /// metamodel can still be built.
    pub fn is_per_class(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_structural() || matches!(e, DomainError::UnknownClass(_)),
            Self::Application(e) => e.is_per_class(),
            _ => false,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Structural,
    NotFound,
    Configuration,
    Aborted,
    Internal,
}

/// Convenient result type alias.
pub type MetamodelResult<T> = Result<T, MetamodelError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> MetamodelResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> MetamodelResult<T> {
        self.map_err(|e| MetamodelError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}
