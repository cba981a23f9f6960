//! Whole-model checks run after every class has been introspected.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::domain::facet::TypeOfFacet;
use crate::domain::{
    ClassKind, Identifier, ObjectSpecification, ROOT_CLASS_NAME, TypeRef, ValidationFailure,
    ValidationFailures,
};

pub const UNKNOWN_TYPE_REFERENCES: &str = "unknown-type-references";
pub const DUPLICATE_MEMBER_IDS: &str = "duplicate-member-ids";

/// What a validator can see: every specification built so far and the
/// names of every class the source knows.
pub struct ValidationContext<'a> {
    pub specs: &'a BTreeMap<String, Arc<ObjectSpecification>>,
    pub known_classes: &'a BTreeSet<String>,
    pub failures: &'a ValidationFailures,
}

impl ValidationContext<'_> {
    pub fn is_known(&self, class_name: &str) -> bool {
        class_name == ROOT_CLASS_NAME
            || self.known_classes.contains(class_name)
            || self.specs.contains_key(class_name)
    }
}

/// A post-introspection check over one specification.
pub trait MetaModelValidator: Send + Sync {
    fn name(&self) -> &'static str;

    fn validate(&self, spec: &ObjectSpecification, ctx: &ValidationContext<'_>);
}

pub fn default_validators() -> Vec<Box<dyn MetaModelValidator>> {
    vec![Box::new(UnknownTypeReferences), Box::new(DuplicateMemberIds)]
}

// ── Unknown types ────────────────────────────────────────────────────────────

/// Member, parameter and element types must name known classes, and a
/// mixin's mixee must exist.
pub struct UnknownTypeReferences;

impl UnknownTypeReferences {
    fn check(&self, identifier: &Identifier, ty: &TypeRef, ctx: &ValidationContext<'_>) {
        let Some(class) = ty.referenced_class() else {
            return;
        };
        if !ctx.is_known(class) {
            ctx.failures.add(ValidationFailure::error(
                identifier.clone(),
                format!("references unknown class '{class}'"),
                self.name(),
            ));
        }
    }
}

impl MetaModelValidator for UnknownTypeReferences {
    fn name(&self) -> &'static str {
        UNKNOWN_TYPE_REFERENCES
    }

    fn validate(&self, spec: &ObjectSpecification, ctx: &ValidationContext<'_>) {
        if let ClassKind::Mixin { mixee } = spec.kind() {
            if !ctx.is_known(mixee) {
                ctx.failures.add(ValidationFailure::error(
                    spec.identifier().clone(),
                    format!("mixin contributes to unknown class '{mixee}'"),
                    self.name(),
                ));
            }
        }

        for member in spec.members() {
            self.check(member.identifier(), member.ty(), ctx);
            if let Some(type_of) = member.get::<TypeOfFacet>() {
                self.check(member.identifier(), &type_of.element, ctx);
            }
            for param in member.parameters() {
                self.check(param.holder().identifier(), param.ty(), ctx);
            }
        }
    }
}

// ── Duplicate members ────────────────────────────────────────────────────────

/// Member ids must be unique within a class. Overloaded actions and mixins
/// contributing a member the class already has both break this.
pub struct DuplicateMemberIds;

impl MetaModelValidator for DuplicateMemberIds {
    fn name(&self) -> &'static str {
        DUPLICATE_MEMBER_IDS
    }

    fn validate(&self, spec: &ObjectSpecification, ctx: &ValidationContext<'_>) {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for member in spec.members() {
            *counts.entry(member.id()).or_default() += 1;
        }
        for (id, count) in counts.into_iter().filter(|(_, count)| *count > 1) {
            ctx.failures.add(ValidationFailure::error(
                Identifier::member(spec.class_name(), id),
                format!("member '{id}' is declared {count} times"),
                self.name(),
            ));
        }
    }
}
