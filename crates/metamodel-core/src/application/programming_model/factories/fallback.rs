//! Fallback and post-processing factories.
//!
//! Fallbacks fill in anything annotations and conventions left unset, at
//! [`Precedence::Fallback`] (or `Inferred` when the value follows from the
//! type). Post-processing factories derive facets from facets that are
//! already settled.

use super::object::declares_bounded;
use super::{
    ACTION_SEMANTICS_FALLBACK, BOUNDED_CHOICES, IMMUTABLE_DISABLES_MEMBERS, MANDATORY_FALLBACK,
    MEMBER_NATURAL_NAME, PARAMETER_NAME, PARAMETER_NATURAL_NAME, invalid,
};
use crate::application::programming_model::naming;
use crate::application::programming_model::{
    FacetFactory, FactoryError, FactoryResult, IntrospectionEnv, ProcessMethodContext, ProcessParameterContext,
    ProcessingPhase,
};
use crate::domain::facet::{
    ActionSemanticsFacet, ChoicesFacet, DisabledFacet, ImmutableFacet, MandatoryFacet, NamedFacet,
};
use crate::domain::{
    Facet, FacetHolder, FacetOrigin, FacetSource, FacetType, FeatureType, Precedence, SemanticsOf,
    TypeRef,
};

// ── Names ────────────────────────────────────────────────────────────────────

/// Parameter names recovered from debug metadata, unless synthetic (`arg0`).
pub struct ParameterName;

impl FacetFactory for ParameterName {
    fn name(&self) -> &'static str {
        PARAMETER_NAME
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PARAMETERS_ONLY
    }

    fn process_param(&self, ctx: &mut ProcessParameterContext<'_>) -> FactoryResult {
        let param = ctx.param;
        let Some(name) = param.name.as_deref() else {
            return Ok(());
        };
        if naming::is_synthetic_param_name(name) {
            return Ok(());
        }
        ctx.add_facet(Facet::new(
            NamedFacet::Literal(naming::natural_name(name)),
            Precedence::Default,
            FacetOrigin::new(PARAMETER_NAME, FacetSource::Metadata),
        ));
        Ok(())
    }
}

pub struct MemberNaturalName;

impl FacetFactory for MemberNaturalName {
    fn name(&self) -> &'static str {
        MEMBER_NATURAL_NAME
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Fallback
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let name = naming::natural_name(ctx.member_id);
        ctx.add_facet(Facet::new(
            NamedFacet::Literal(name),
            Precedence::Fallback,
            FacetOrigin::fallback(MEMBER_NATURAL_NAME),
        ));
        Ok(())
    }
}

/// Name of the parameter's type: a `Customer` parameter is called
/// "Customer". Used only when neither debug metadata, a `named<N><Action>()`
/// method nor `@Named` supplied a name.
pub struct ParameterNaturalName;

impl FacetFactory for ParameterNaturalName {
    fn name(&self) -> &'static str {
        PARAMETER_NATURAL_NAME
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Fallback
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PARAMETERS_ONLY
    }

    fn process_param(&self, ctx: &mut ProcessParameterContext<'_>) -> FactoryResult {
        let name = naming::natural_name(&ctx.param.ty.simple_name());
        ctx.add_facet(Facet::new(
            NamedFacet::Literal(name),
            Precedence::Fallback,
            FacetOrigin::fallback(PARAMETER_NATURAL_NAME),
        ));
        Ok(())
    }
}

// ── Mandatory / semantics ────────────────────────────────────────────────────

/// Properties and parameters are required unless declared optional;
/// primitives cannot hold "no value" at all.
pub struct MandatoryFallback;

impl MandatoryFallback {
    fn facet(ty: &TypeRef) -> Facet {
        let precedence = if ty.is_primitive() {
            Precedence::Inferred
        } else {
            Precedence::Fallback
        };
        Facet::new(
            MandatoryFacet::Required,
            precedence,
            FacetOrigin::fallback(MANDATORY_FALLBACK),
        )
    }
}

impl FacetFactory for MandatoryFallback {
    fn name(&self) -> &'static str {
        MANDATORY_FALLBACK
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Fallback
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_AND_PARAMETERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let facet = Self::facet(ctx.member_type());
        ctx.add_facet(facet);
        Ok(())
    }

    fn process_param(&self, ctx: &mut ProcessParameterContext<'_>) -> FactoryResult {
        let facet = Self::facet(&ctx.param.ty);
        ctx.add_facet(facet);
        Ok(())
    }
}

pub struct ActionSemanticsFallback;

impl FacetFactory for ActionSemanticsFallback {
    fn name(&self) -> &'static str {
        ACTION_SEMANTICS_FALLBACK
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Fallback
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::ACTIONS_ONLY
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        ctx.add_facet(Facet::new(
            ActionSemanticsFacet {
                semantics: SemanticsOf::NonIdempotent,
            },
            Precedence::Fallback,
            FacetOrigin::fallback(ACTION_SEMANTICS_FALLBACK),
        ));
        Ok(())
    }
}

// ── Post-processing ──────────────────────────────────────────────────────────

/// Members of an immutable class are disabled, with the class's reason.
pub struct ImmutableDisablesMembers;

impl FacetFactory for ImmutableDisablesMembers {
    fn name(&self) -> &'static str {
        IMMUTABLE_DISABLES_MEMBERS
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::PostProcessing
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_AND_COLLECTIONS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let Some(immutable) = ctx.class_holder.get::<ImmutableFacet>() else {
            return Ok(());
        };
        let reason = Some(immutable.reason().to_string());
        ctx.add_facet(Facet::new(
            DisabledFacet { reason },
            Precedence::Inferred,
            FacetOrigin::derived(IMMUTABLE_DISABLES_MEMBERS, FacetType::Immutable),
        ));
        Ok(())
    }
}

/// A property or parameter whose type is a bounded class offers that
/// class's instances as choices, unless it already has choices.
pub struct BoundedChoices;

impl BoundedChoices {
    fn facet(
        env: &IntrospectionEnv<'_>,
        holder: &FacetHolder,
        ty: &TypeRef,
    ) -> Result<Option<Facet>, FactoryError> {
        if holder.contains(FacetType::Choices) || ty.is_list() {
            return Ok(None);
        }
        let Some(class) = ty.referenced_class() else {
            return Ok(None);
        };
        let bounded = env
            .source
            .class(class)
            .map_err(invalid)?
            .is_some_and(|descriptor| declares_bounded(&descriptor));
        Ok(bounded.then(|| {
            Facet::new(
                ChoicesFacet::Bounded {
                    class: class.to_string(),
                },
                Precedence::Inferred,
                FacetOrigin::derived(BOUNDED_CHOICES, FacetType::Bounded),
            )
        }))
    }
}

impl FacetFactory for BoundedChoices {
    fn name(&self) -> &'static str {
        BOUNDED_CHOICES
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::PostProcessing
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_AND_PARAMETERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        if let Some(facet) = Self::facet(&ctx.env, ctx.holder, ctx.member_type())? {
            ctx.add_facet(facet);
        }
        Ok(())
    }

    fn process_param(&self, ctx: &mut ProcessParameterContext<'_>) -> FactoryResult {
        if let Some(facet) = Self::facet(&ctx.env, ctx.holder, &ctx.param.ty)? {
            ctx.add_facet(facet);
        }
        Ok(())
    }
}
