// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for the metamodel.
//!
//! This module holds the data the metamodel is made of: identifiers, class
//! descriptors, facets, facet holders, specifications and validation
//! failures. It performs no I/O and knows nothing about how classes are
//! discovered or which factories run; that lives in the application layer.
//!
//! ## Layout
//!
//! - **entities**: class descriptors, annotations, runtime values and bound
//!   method handles
//! - **facet**: facet payloads, the [`FacetHolder`] and its precedence rules
//! - **spec**: [`ObjectSpecification`], the cached facet tree of one class
//! - **validation**: accumulated [`ValidationFailure`]s
//!
pub mod entities;
pub mod error;
pub mod facet;
pub mod identifier;
pub mod spec;
pub mod validation;
pub mod value_objects;

pub use entities::{
    Annotation, Annotations, AttrValue, ClassDescriptor, ClassKind, DomainObject, FieldDescriptor,
    InvocationError, MethodDescriptor, MethodHandle, MethodSignature, ParamDescriptor,
    ROOT_CLASS_NAME, Value, Visibility, names,
};

pub use error::{DomainError, ErrorCategory};

pub use facet::{
    Facet, FacetConflict, FacetData, FacetHolder, FacetOrigin, FacetOutcome, FacetSource,
    FacetType, SupersededFacet, SupersessionReason, TypedFacet,
};

pub use identifier::{Identifier, IdentifierKind};

pub use spec::{ActionParameter, ObjectMember, ObjectSpecification};

pub use validation::{Severity, ValidationFailure, ValidationFailures, ValidationReport};

pub use value_objects::{DeweyOrder, FeatureType, Precedence, SemanticsOf, TypeRef, Where};

#[cfg(test)]
mod tests {
    use super::*;
    use facet::{NamedFacet, TitleFacet};

    // ========================================================================
    // Cross-module behaviour
    // ========================================================================

    #[test]
    fn annotation_beats_convention_beats_fallback() {
        let mut holder = FacetHolder::new(Identifier::member("Customer", "foo"), FeatureType::Property);

        holder.add_facet(Facet::new(
            NamedFacet::Literal("Foo".into()),
            Precedence::Fallback,
            FacetOrigin::fallback("natural-name"),
        ));
        holder.add_facet(Facet::new(
            NamedFacet::Literal("Foo (convention)".into()),
            Precedence::Default,
            FacetOrigin::convention("named-method", "namedFoo()"),
        ));
        holder.add_facet(Facet::new(
            NamedFacet::Literal("Foo (annotation)".into()),
            Precedence::High,
            FacetOrigin::annotation("named-annotation", names::NAMED),
        ));

        assert_eq!(
            holder.get::<NamedFacet>().and_then(NamedFacet::literal),
            Some("Foo (annotation)")
        );
        let losers: Vec<_> = holder
            .superseded(FacetType::Named)
            .iter()
            .map(|s| s.facet.origin().factory.as_str())
            .collect();
        assert_eq!(losers, ["natural-name", "named-method"]);
    }

    #[test]
    fn spec_title_uses_title_facet() {
        let class = ClassDescriptor::new("Customer").method(
            MethodDescriptor::new("title", TypeRef::Text).returns_field("name"),
        );
        let mut spec = ObjectSpecification::new("Customer", None, ClassKind::Entity);
        spec.holder_mut().add_facet(Facet::new(
            TitleFacet::Method(class.methods[0].handle()),
            Precedence::Default,
            FacetOrigin::convention("title-method", "title()"),
        ));

        let obj = DomainObject::new("Customer", "1").with_field("name", "Ada");
        assert_eq!(spec.title(&obj), "Ada");
    }

    #[test]
    fn identifier_kinds_cover_every_holder() {
        let action = Identifier::action("Customer", "find", ["string"]);
        assert_eq!(Identifier::class("Customer").kind(), IdentifierKind::Class);
        assert_eq!(action.kind(), IdentifierKind::Action);
        assert_eq!(action.parameter(0).kind(), IdentifierKind::Parameter(0));
    }
}
