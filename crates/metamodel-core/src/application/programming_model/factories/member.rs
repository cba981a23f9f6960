//! Member-level factories: accessors, mutators, invocation and the
//! `@Property`, `@Collection`, `@Action` and `@Parameter` annotations.

use super::{
    ACTION_ANNOTATION, ACTION_INVOCATION, COLLECTION_ACCESSOR, COLLECTION_ANNOTATION,
    PARAMETER_ANNOTATION, PROPERTY_ACCESSOR, PROPERTY_ANNOTATION, convention, invalid,
};
use crate::application::programming_model::naming::{CLEAR_PREFIX, MODIFY_PREFIX, SET_PREFIX};
use crate::application::programming_model::{
    FacetFactory, FactoryError, FactoryResult, ProcessMethodContext, ProcessParameterContext,
    ProcessingPhase,
};
use crate::domain::facet::{
    ActionInvocationFacet, ActionSemanticsFacet, CollectionAccessorFacet, DisabledFacet,
    HiddenFacet, MandatoryFacet, MaxLengthFacet, PropertyAccessorFacet, PropertyClearFacet,
    PropertySetterFacet, RegExFacet, TypeOfFacet,
};
use crate::domain::{Annotation, Facet, FacetOrigin, FeatureType, Precedence, TypeRef, names};

// ── Shared attribute readers ─────────────────────────────────────────────────

/// `editing = "disabled"`, with the optional `editingDisabledReason`.
pub(super) fn editing_disabled(annotation: &Annotation) -> Option<DisabledFacet> {
    annotation
        .text("editing")
        .filter(|e| e.eq_ignore_ascii_case("disabled"))
        .map(|_| DisabledFacet {
            reason: annotation.text("editingDisabledReason").map(str::to_string),
        })
}

/// `hidden = "<where>"`; `hidden = true` hides everywhere.
pub(super) fn hidden(annotation: &Annotation) -> Result<Option<HiddenFacet>, FactoryError> {
    if annotation.bool("hidden") == Some(true) {
        return Ok(Some(HiddenFacet {
            hidden_in: crate::domain::Where::Everywhere,
        }));
    }
    annotation
        .text("hidden")
        .filter(|h| !h.eq_ignore_ascii_case("false"))
        .map(|h| h.parse().map(|hidden_in| HiddenFacet { hidden_in }).map_err(invalid))
        .transpose()
}

pub(super) fn optionality(annotation: &Annotation) -> Result<Option<MandatoryFacet>, FactoryError> {
    match annotation.text("optionality").map(str::to_ascii_lowercase).as_deref() {
        None | Some("default") => Ok(None),
        Some("optional") => Ok(Some(MandatoryFacet::Optional)),
        Some("mandatory") => Ok(Some(MandatoryFacet::Required)),
        Some(other) => Err(FactoryError::Invalid(format!("unknown optionality '{other}'"))),
    }
}

pub(super) fn max_length(annotation: &Annotation) -> Result<Option<MaxLengthFacet>, FactoryError> {
    let Some(max) = annotation.int("maxLength") else {
        return Ok(None);
    };
    usize::try_from(max)
        .map(|max| Some(MaxLengthFacet { max }))
        .map_err(|_| FactoryError::Invalid(format!("maxLength must not be negative, got {max}")))
}

pub(super) fn regex(annotation: &Annotation) -> Result<Option<RegExFacet>, FactoryError> {
    annotation
        .text("regexPattern")
        .map(|pattern| RegExFacet::new(pattern).map_err(invalid))
        .transpose()
}

/// The bare `@Optional` / `@Mandatory` markers.
fn marker(optional: Option<&Annotation>, mandatory: Option<&Annotation>) -> Option<(MandatoryFacet, &'static str)> {
    match (optional, mandatory) {
        (Some(_), _) => Some((MandatoryFacet::Optional, names::OPTIONAL)),
        (None, Some(_)) => Some((MandatoryFacet::Required, names::MANDATORY)),
        (None, None) => None,
    }
}

// ── Accessors ────────────────────────────────────────────────────────────────

/// Getter, plus `set<Name>`, `modify<Name>` and `clear<Name>`.
pub struct PropertyAccessor;

impl PropertyAccessor {
    pub const NO_SETTER: &'static str = "No setter";
}

impl FacetFactory for PropertyAccessor {
    fn name(&self) -> &'static str {
        PROPERTY_ACCESSOR
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::MemberModelling
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_ONLY
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let getter = ctx.method;
        let ty = getter.return_type.clone();
        let stem = ctx.capitalized_name();

        ctx.add_facet(Facet::new(
            PropertyAccessorFacet {
                accessor: getter.handle(),
                ty: ty.clone(),
            },
            Precedence::Default,
            convention(PROPERTY_ACCESSOR, getter),
        ));

        let value_param = [ty];
        let setter = ctx.pool.take_exact(&format!("{SET_PREFIX}{stem}"), &value_param);
        let modify = ctx.pool.take_exact(&format!("{MODIFY_PREFIX}{stem}"), &value_param);
        let clear = ctx.pool.take(&format!("{CLEAR_PREFIX}{stem}"), 0);

        if let Some(setter) = &setter {
            ctx.add_facet(Facet::new(
                PropertySetterFacet::Setter(setter.handle()),
                Precedence::Inferred,
                convention(PROPERTY_ACCESSOR, setter),
            ));
        }
        if let Some(modify) = &modify {
            ctx.add_facet(Facet::new(
                PropertySetterFacet::Modify(modify.handle()),
                Precedence::Default,
                convention(PROPERTY_ACCESSOR, modify),
            ));
        }
        if let Some(clear) = clear {
            ctx.add_facet(Facet::new(
                PropertyClearFacet {
                    handle: clear.handle(),
                },
                Precedence::Default,
                convention(PROPERTY_ACCESSOR, &clear),
            ));
        }
        if setter.is_none() && modify.is_none() {
            ctx.add_facet(Facet::new(
                DisabledFacet {
                    reason: Some(Self::NO_SETTER.to_string()),
                },
                Precedence::Fallback,
                FacetOrigin::fallback(PROPERTY_ACCESSOR),
            ));
        }
        Ok(())
    }
}

pub struct CollectionAccessor;

impl FacetFactory for CollectionAccessor {
    fn name(&self) -> &'static str {
        COLLECTION_ACCESSOR
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::MemberModelling
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::COLLECTIONS_ONLY
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let getter = ctx.method;
        ctx.add_facet(Facet::new(
            CollectionAccessorFacet {
                accessor: getter.handle(),
                ty: getter.return_type.clone(),
            },
            Precedence::Default,
            convention(COLLECTION_ACCESSOR, getter),
        ));
        if let Some(element) = getter.return_type.element_type() {
            ctx.add_facet(Facet::new(
                TypeOfFacet {
                    element: element.clone(),
                },
                Precedence::Inferred,
                FacetOrigin::fallback(COLLECTION_ACCESSOR),
            ));
        }
        Ok(())
    }
}

pub struct ActionInvocation;

impl FacetFactory for ActionInvocation {
    fn name(&self) -> &'static str {
        ACTION_INVOCATION
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::MemberModelling
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::ACTIONS_ONLY
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let method = ctx.method;
        ctx.add_facet(Facet::new(
            ActionInvocationFacet {
                handle: method.handle(),
                return_type: method.return_type.clone(),
            },
            Precedence::Default,
            convention(ACTION_INVOCATION, method),
        ));
        Ok(())
    }
}

// ── @Action / @Property / @Collection ────────────────────────────────────────

pub struct ActionAnnotation;

impl FacetFactory for ActionAnnotation {
    fn name(&self) -> &'static str {
        ACTION_ANNOTATION
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::ACTIONS_ONLY
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let Some(action) = ctx.annotation(names::ACTION).cloned() else {
            return Ok(());
        };
        let origin = || FacetOrigin::annotation(ACTION_ANNOTATION, names::ACTION);

        if let Some(semantics) = action.text("semantics") {
            let semantics = semantics.parse().map_err(invalid)?;
            ctx.add_facet(Facet::new(ActionSemanticsFacet { semantics }, Precedence::High, origin()));
        }
        if let Some(facet) = hidden(&action)? {
            ctx.add_facet(Facet::new(facet, Precedence::High, origin()));
        }
        Ok(())
    }
}

pub struct PropertyAnnotation;

impl FacetFactory for PropertyAnnotation {
    fn name(&self) -> &'static str {
        PROPERTY_ANNOTATION
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_ONLY
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        if let Some((facet, name)) = marker(ctx.annotation(names::OPTIONAL), ctx.annotation(names::MANDATORY)) {
            ctx.add_facet(Facet::new(
                facet,
                Precedence::High,
                FacetOrigin::annotation(PROPERTY_ANNOTATION, name),
            ));
        }

        let Some(property) = ctx.annotation(names::PROPERTY).cloned() else {
            return Ok(());
        };
        let origin = || FacetOrigin::annotation(PROPERTY_ANNOTATION, names::PROPERTY);

        // Parse everything first so a bad attribute leaves the holder untouched.
        let max = max_length(&property)?;
        let pattern = regex(&property)?;
        let mandatory = optionality(&property)?;
        let hide = hidden(&property)?;

        if let Some(facet) = editing_disabled(&property) {
            ctx.add_facet(Facet::new(facet, Precedence::High, origin()));
        }
        if let Some(facet) = max {
            ctx.add_facet(Facet::new(facet, Precedence::High, origin()));
        }
        if let Some(facet) = pattern {
            ctx.add_facet(Facet::new(facet, Precedence::High, origin()));
        }
        if let Some(facet) = mandatory {
            ctx.add_facet(Facet::new(facet, Precedence::High, origin()));
        }
        if let Some(facet) = hide {
            ctx.add_facet(Facet::new(facet, Precedence::High, origin()));
        }
        Ok(())
    }
}

pub struct CollectionAnnotation;

impl FacetFactory for CollectionAnnotation {
    fn name(&self) -> &'static str {
        COLLECTION_ANNOTATION
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::COLLECTIONS_ONLY
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let Some(collection) = ctx.annotation(names::COLLECTION).cloned() else {
            return Ok(());
        };
        let origin = || FacetOrigin::annotation(COLLECTION_ANNOTATION, names::COLLECTION);

        if let Some(type_of) = collection.text("typeOf") {
            let element: TypeRef = type_of.parse().map_err(invalid)?;
            ctx.add_facet(Facet::new(TypeOfFacet { element }, Precedence::High, origin()));
        }
        if let Some(facet) = editing_disabled(&collection) {
            ctx.add_facet(Facet::new(facet, Precedence::High, origin()));
        }
        if let Some(facet) = hidden(&collection)? {
            ctx.add_facet(Facet::new(facet, Precedence::High, origin()));
        }
        Ok(())
    }
}

// ── @Parameter ───────────────────────────────────────────────────────────────

pub struct ParameterAnnotation;

impl FacetFactory for ParameterAnnotation {
    fn name(&self) -> &'static str {
        PARAMETER_ANNOTATION
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PARAMETERS_ONLY
    }

    fn process_param(&self, ctx: &mut ProcessParameterContext<'_>) -> FactoryResult {
        if let Some((facet, name)) = marker(ctx.annotation(names::OPTIONAL), ctx.annotation(names::MANDATORY)) {
            ctx.add_facet(Facet::new(
                facet,
                Precedence::High,
                FacetOrigin::annotation(PARAMETER_ANNOTATION, name),
            ));
        }

        let Some(parameter) = ctx.annotation(names::PARAMETER).cloned() else {
            return Ok(());
        };
        let origin = || FacetOrigin::annotation(PARAMETER_ANNOTATION, names::PARAMETER);

        let max = max_length(&parameter)?;
        let pattern = regex(&parameter)?;
        let mandatory = optionality(&parameter)?;

        if let Some(facet) = max {
            ctx.add_facet(Facet::new(facet, Precedence::High, origin()));
        }
        if let Some(facet) = pattern {
            ctx.add_facet(Facet::new(facet, Precedence::High, origin()));
        }
        if let Some(facet) = mandatory {
            ctx.add_facet(Facet::new(facet, Precedence::High, origin()));
        }
        Ok(())
    }
}
