//! Introspection policy: which methods are eligible to become members.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Visibility};

/// Whether members must be annotated (`@Property`, `@Collection`, `@Action`)
/// to be picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberAnnotations {
    /// Every public getter and public method is a member.
    #[default]
    Optional,
    /// Only annotated methods (or getters of annotated fields) are members.
    Required,
}

/// Which method visibilities introspection looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encapsulation {
    #[default]
    PublicOnly,
    /// Non-public methods are members too, provided they are annotated.
    Encapsulated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntrospectionPolicy {
    pub member_annotations: MemberAnnotations,
    pub encapsulation: Encapsulation,
}

impl IntrospectionPolicy {
    pub fn annotations_required() -> Self {
        Self {
            member_annotations: MemberAnnotations::Required,
            ..Self::default()
        }
    }

    pub fn encapsulated() -> Self {
        Self {
            member_annotations: MemberAnnotations::Required,
            encapsulation: Encapsulation::Encapsulated,
        }
    }

    /// Reject combinations that cannot be honoured.
    ///
    /// Encapsulated members are only found through their annotations, so
    /// encapsulation requires `member_annotations = required`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.encapsulation == Encapsulation::Encapsulated
            && self.member_annotations == MemberAnnotations::Optional
        {
            return Err(DomainError::InvalidPolicy {
                reason: "encapsulation requires member_annotations = required".into(),
            });
        }
        Ok(())
    }

    pub fn requires_member_annotations(&self) -> bool {
        self.member_annotations == MemberAnnotations::Required
    }

    /// Whether a method of `visibility` is visible to introspection at all.
    pub fn admits(&self, visibility: Visibility) -> bool {
        visibility.is_public() || self.encapsulation == Encapsulation::Encapsulated
    }
}
