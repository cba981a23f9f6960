// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (failures are copied into reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid identifier '{input}': {reason}")]
    InvalidIdentifier { input: String, reason: String },

    #[error("Invalid type reference '{0}'")]
    InvalidTypeRef(String),

    #[error("Invalid {what}: '{value}'")]
    InvalidValue { what: &'static str, value: String },

    #[error("Invalid member order sequence '{0}'")]
    InvalidMemberOrder(String),

    #[error("Invalid introspection policy: {reason}")]
    InvalidPolicy { reason: String },

    // ========================================================================
    // Structural Errors (a class cannot be introspected at all)
    // ========================================================================
    #[error("Class '{class}' cannot be introspected: {reason}")]
    MalformedClass { class: String, reason: String },

    #[error("Class '{class}' extends unknown class '{superclass}'")]
    UnknownSuperclass { class: String, superclass: String },

    #[error("Cyclic class hierarchy: {chain}")]
    CyclicHierarchy { chain: String },

    #[error("Class '{class}' declares method '{signature}' more than once")]
    DuplicateMethod { class: String, signature: String },

    #[error("Introspection of '{class}' exceeded the maximum depth of {max}")]
    HierarchyTooDeep { class: String, max: usize },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    #[error("Unknown class: {0}")]
    UnknownClass(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidIdentifier { .. } => vec![
                "Identifiers look like Class, Class#member or Class#action(Type1,Type2)".into(),
                "Parameters are addressed with an index suffix: Class#action(Type)[0]".into(),
            ],
            Self::InvalidPolicy { reason } => vec![
                format!("Policy problem: {}", reason),
                "Encapsulated introspection requires member annotations to be required".into(),
            ],
            Self::CyclicHierarchy { chain } => vec![
                format!("Break the inheritance cycle: {}", chain),
                "A class may not (transitively) extend itself".into(),
            ],
            Self::UnknownSuperclass { superclass, .. } => vec![
                format!("Register '{}' with the class source", superclass),
                "Or remove the superclass reference".into(),
            ],
            Self::UnknownClass(name) => vec![
                format!("No class named '{}' is known", name),
                "Try: metamodel list".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidIdentifier { .. }
            | Self::InvalidTypeRef(_)
            | Self::InvalidValue { .. }
            | Self::InvalidMemberOrder(_) => ErrorCategory::Validation,
            Self::InvalidPolicy { .. } => ErrorCategory::Configuration,
            Self::MalformedClass { .. }
            | Self::UnknownSuperclass { .. }
            | Self::CyclicHierarchy { .. }
            | Self::DuplicateMethod { .. }
            | Self::HierarchyTooDeep { .. } => ErrorCategory::Structural,
            Self::UnknownClass(_) => ErrorCategory::NotFound,
        }
    }

    /// Whether this error aborts introspection of a single class only.
    pub fn is_structural(&self) -> bool {
        self.category() == ErrorCategory::Structural
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Structural,
    Configuration,
    NotFound,
}
