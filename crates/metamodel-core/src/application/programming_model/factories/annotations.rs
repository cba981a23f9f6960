//! Annotation-driven factories shared by several kinds of holder.

use super::member::hidden;
use super::{
    DESCRIBED_AS_ANNOTATION, DISABLED_ANNOTATION, HIDDEN_ANNOTATION, MEMBER_LAYOUT,
    MEMBER_ORDER_ANNOTATION, NAMED_ANNOTATION, invalid,
};
use crate::application::programming_model::{
    FacetFactory, FactoryError, FactoryResult, ProcessClassContext, ProcessMethodContext,
    ProcessParameterContext, ProcessingPhase,
};
use crate::domain::facet::{DescribedAsFacet, DisabledFacet, HiddenFacet, MemberOrderFacet, NamedFacet};
use crate::domain::{Annotation, DeweyOrder, Facet, FacetOrigin, FeatureType, Precedence, Where, names};

fn named_facet(annotation: &Annotation) -> Option<Facet> {
    annotation.value().map(|name| {
        Facet::new(
            NamedFacet::Literal(name.to_string()),
            Precedence::High,
            FacetOrigin::annotation(NAMED_ANNOTATION, names::NAMED),
        )
    })
}

fn described_as_facet(annotation: &Annotation) -> Option<Facet> {
    annotation.value().map(|text| {
        Facet::new(
            DescribedAsFacet::new(text),
            Precedence::High,
            FacetOrigin::annotation(DESCRIBED_AS_ANNOTATION, names::DESCRIBED_AS),
        )
    })
}

// ── @Named / @DescribedAs ────────────────────────────────────────────────────

/// `@Named("...")` on a class, member or parameter.
pub struct NamedAnnotation;

impl FacetFactory for NamedAnnotation {
    fn name(&self) -> &'static str {
        NAMED_ANNOTATION
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::EVERYTHING
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        if let Some(facet) = ctx.annotation(names::NAMED).and_then(named_facet) {
            ctx.add_facet(facet);
        }
        Ok(())
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        if let Some(facet) = ctx.annotation(names::NAMED).and_then(named_facet) {
            ctx.add_facet(facet);
        }
        Ok(())
    }

    fn process_param(&self, ctx: &mut ProcessParameterContext<'_>) -> FactoryResult {
        if let Some(facet) = ctx.annotation(names::NAMED).and_then(named_facet) {
            ctx.add_facet(facet);
        }
        Ok(())
    }
}

pub struct DescribedAsAnnotation;

impl FacetFactory for DescribedAsAnnotation {
    fn name(&self) -> &'static str {
        DESCRIBED_AS_ANNOTATION
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::EVERYTHING
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        if let Some(facet) = ctx.annotation(names::DESCRIBED_AS).and_then(described_as_facet) {
            ctx.add_facet(facet);
        }
        Ok(())
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        if let Some(facet) = ctx.annotation(names::DESCRIBED_AS).and_then(described_as_facet) {
            ctx.add_facet(facet);
        }
        Ok(())
    }

    fn process_param(&self, ctx: &mut ProcessParameterContext<'_>) -> FactoryResult {
        if let Some(facet) = ctx.annotation(names::DESCRIBED_AS).and_then(described_as_facet) {
            ctx.add_facet(facet);
        }
        Ok(())
    }
}

// ── Layout ───────────────────────────────────────────────────────────────────

/// `@PropertyLayout`, `@ActionLayout` and `@ParameterLayout`.
pub struct MemberLayout;

impl MemberLayout {
    fn facets(layout: &Annotation) -> Result<Vec<Facet>, FactoryError> {
        let origin = || FacetOrigin::annotation(MEMBER_LAYOUT, layout.name.clone());
        let mut facets = Vec::new();
        if let Some(named) = layout.text("named") {
            facets.push(Facet::new(NamedFacet::Literal(named.into()), Precedence::High, origin()));
        }
        if let Some(described) = layout.text("describedAs") {
            facets.push(Facet::new(DescribedAsFacet::new(described), Precedence::High, origin()));
        }
        if let Some(facet) = hidden(layout)? {
            facets.push(Facet::new(facet, Precedence::High, origin()));
        }
        Ok(facets)
    }
}

impl FacetFactory for MemberLayout {
    fn name(&self) -> &'static str {
        MEMBER_LAYOUT
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS_AND_PARAMETERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let layout_name = match ctx.feature_type {
            FeatureType::Action => names::ACTION_LAYOUT,
            _ => names::PROPERTY_LAYOUT,
        };
        let Some(layout) = ctx.annotation(layout_name).cloned() else {
            return Ok(());
        };
        for facet in Self::facets(&layout)? {
            ctx.add_facet(facet);
        }
        Ok(())
    }

    fn process_param(&self, ctx: &mut ProcessParameterContext<'_>) -> FactoryResult {
        let Some(layout) = ctx.annotation(names::PARAMETER_LAYOUT).cloned() else {
            return Ok(());
        };
        for facet in Self::facets(&layout)? {
            ctx.add_facet(facet);
        }
        Ok(())
    }
}

// ── @Hidden / @Disabled / @MemberOrder ───────────────────────────────────────

pub struct HiddenAnnotation;

impl FacetFactory for HiddenAnnotation {
    fn name(&self) -> &'static str {
        HIDDEN_ANNOTATION
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let Some(annotation) = ctx.annotation(names::HIDDEN) else {
            return Ok(());
        };
        let hidden_in = match annotation.text("where").or_else(|| annotation.value()) {
            Some(raw) => raw.parse().map_err(invalid)?,
            None => Where::Everywhere,
        };
        ctx.add_facet(Facet::new(
            HiddenFacet { hidden_in },
            Precedence::High,
            FacetOrigin::annotation(HIDDEN_ANNOTATION, names::HIDDEN),
        ));
        Ok(())
    }
}

pub struct DisabledAnnotation;

impl FacetFactory for DisabledAnnotation {
    fn name(&self) -> &'static str {
        DISABLED_ANNOTATION
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let Some(annotation) = ctx.annotation(names::DISABLED) else {
            return Ok(());
        };
        let reason = annotation
            .text("reason")
            .or_else(|| annotation.value())
            .map(str::to_string);
        ctx.add_facet(Facet::new(
            DisabledFacet { reason },
            Precedence::High,
            FacetOrigin::annotation(DISABLED_ANNOTATION, names::DISABLED),
        ));
        Ok(())
    }
}

/// `@MemberOrder(sequence = "1.2", name = "group")`.
pub struct MemberOrderAnnotation;

impl FacetFactory for MemberOrderAnnotation {
    fn name(&self) -> &'static str {
        MEMBER_ORDER_ANNOTATION
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let Some(annotation) = ctx.annotation(names::MEMBER_ORDER) else {
            return Ok(());
        };
        let raw = annotation
            .text("sequence")
            .ok_or_else(|| FactoryError::Invalid("@MemberOrder requires a sequence".into()))?;
        let sequence = DeweyOrder::parse(raw).map_err(invalid)?;
        let group = annotation.text("name").map(str::to_string);
        ctx.add_facet(Facet::new(
            MemberOrderFacet { sequence, group },
            Precedence::High,
            FacetOrigin::annotation(MEMBER_ORDER_ANNOTATION, names::MEMBER_ORDER),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::programming_model::factories::test_support::{ClassFixture, MemberFixture};
    use crate::domain::{ClassDescriptor, FacetType, MethodDescriptor, ParamDescriptor, TypeRef};

    fn with_method(method: MethodDescriptor) -> ClassDescriptor {
        ClassDescriptor::new("Customer").method(method)
    }

    #[test]
    fn named_applies_to_every_holder_kind() {
        let class = with_method(
            MethodDescriptor::new("placeOrder", TypeRef::Void)
                .annotate(Annotation::new(names::NAMED).with("value", "Order"))
                .param_with(
                    ParamDescriptor::new(TypeRef::Int).annotate(Annotation::new(names::NAMED).with("value", "Qty")),
                ),
        )
        .annotate(Annotation::new(names::NAMED).with("value", "Client"));

        let mut class_fixture = ClassFixture::new(class.clone());
        class_fixture.run(&NamedAnnotation).unwrap();
        assert_eq!(class_fixture.holder.get::<NamedFacet>().and_then(NamedFacet::literal), Some("Client"));

        let mut fixture = MemberFixture::action(class, "placeOrder");
        fixture.run(&NamedAnnotation).unwrap();
        fixture.run_param(&NamedAnnotation, 0).unwrap();
        assert_eq!(fixture.holder.get::<NamedFacet>().and_then(NamedFacet::literal), Some("Order"));
        assert_eq!(fixture.params[0].get::<NamedFacet>().and_then(NamedFacet::literal), Some("Qty"));
    }

    #[test]
    fn layout_and_named_conflict_at_equal_precedence() {
        let class = with_method(
            MethodDescriptor::getter("getName", TypeRef::Text, "name")
                .annotate(Annotation::new(names::NAMED).with("value", "Full name"))
                .annotate(Annotation::new(names::PROPERTY_LAYOUT).with("named", "Name shown")),
        );
        let mut fixture = MemberFixture::property(class, "getName");
        fixture.run(&NamedAnnotation).unwrap();
        fixture.run(&MemberLayout).unwrap();

        assert_eq!(fixture.holder.get::<NamedFacet>().and_then(NamedFacet::literal), Some("Name shown"));
        assert_eq!(fixture.holder.conflicts().len(), 1);
    }

    #[test]
    fn hidden_defaults_to_everywhere() {
        let class = with_method(
            MethodDescriptor::new("purge", TypeRef::Void).annotate(Annotation::new(names::HIDDEN)),
        );
        let mut fixture = MemberFixture::action(class, "purge");
        fixture.run(&HiddenAnnotation).unwrap();
        assert_eq!(fixture.holder.get::<HiddenFacet>().unwrap().hidden_in, Where::Everywhere);
    }

    #[test]
    fn hidden_where_must_parse() {
        let class = with_method(
            MethodDescriptor::new("purge", TypeRef::Void)
                .annotate(Annotation::new(names::HIDDEN).with("where", "sideways")),
        );
        let mut fixture = MemberFixture::action(class, "purge");
        assert!(fixture.run(&HiddenAnnotation).is_err());
        assert!(!fixture.holder.contains(FacetType::Hidden));
    }

    #[test]
    fn member_order_reads_sequence_and_group() {
        let class = with_method(
            MethodDescriptor::getter("getName", TypeRef::Text, "name").annotate(
                Annotation::new(names::MEMBER_ORDER)
                    .with("sequence", "1.10")
                    .with("name", "General"),
            ),
        );
        let mut fixture = MemberFixture::property(class, "getName");
        fixture.run(&MemberOrderAnnotation).unwrap();

        let order = fixture.holder.get::<MemberOrderFacet>().unwrap();
        assert_eq!(order.sequence.components(), [1, 10]);
        assert_eq!(order.group.as_deref(), Some("General"));
    }

    #[test]
    fn member_order_without_sequence_is_invalid() {
        let class = with_method(
            MethodDescriptor::getter("getName", TypeRef::Text, "name")
                .annotate(Annotation::new(names::MEMBER_ORDER).with("name", "General")),
        );
        let mut fixture = MemberFixture::property(class, "getName");
        assert!(matches!(fixture.run(&MemberOrderAnnotation), Err(FactoryError::Invalid(_))));
    }

    #[test]
    fn disabled_reason() {
        let class = with_method(
            MethodDescriptor::getter("getCode", TypeRef::Text, "code")
                .annotate(Annotation::new(names::DISABLED).with("reason", "Assigned by the system")),
        );
        let mut fixture = MemberFixture::property(class, "getCode");
        fixture.run(&DisabledAnnotation).unwrap();
        assert_eq!(fixture.holder.get::<DisabledFacet>().unwrap().reason(), "Assigned by the system");
    }
}
