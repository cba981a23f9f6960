//! Naming-convention support methods: `named<Member>()`, `hide<Member>()`,
//! `disable<Member>()`, `validate<Member>(..)`, `default<Member>()`,
//! `choices<Member>()`, `autoComplete<Member>(search)` and their positional
//! parameter forms such as `default0PlaceOrder()`.

use std::fmt;

use super::{NAMED_METHOD, PARAM_NAMED_METHOD, convention, expect_return, is_list_of};
use crate::application::programming_model::naming::{
    AUTO_COMPLETE_PREFIX, CHOICES_PREFIX, DEFAULT_PREFIX, DISABLE_PREFIX, HIDE_PREFIX,
    NAMED_PREFIX, VALIDATE_PREFIX,
};
use crate::application::programming_model::{
    FacetFactory, FactoryError, FactoryResult, MethodPool, ProcessMethodContext, ProcessParameterContext,
    ProcessingPhase,
};
use crate::domain::facet::{
    AutoCompleteFacet, ChoicesFacet, DefaultFacet, DisableForContextFacet, HideForContextFacet,
    NamedFacet, ValidateFacet,
};
use crate::domain::{Facet, FacetData, FeatureType, MethodDescriptor, Precedence, TypeRef, names};

/// The family of a support method, by prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportKind {
    Hide,
    Disable,
    Validate,
    Default,
    Choices,
    AutoComplete,
}

impl SupportKind {
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Hide => HIDE_PREFIX,
            Self::Disable => DISABLE_PREFIX,
            Self::Validate => VALIDATE_PREFIX,
            Self::Default => DEFAULT_PREFIX,
            Self::Choices => CHOICES_PREFIX,
            Self::AutoComplete => AUTO_COMPLETE_PREFIX,
        }
    }

    /// Name of the member-level factory for this kind.
    pub const fn member_factory_name(&self) -> &'static str {
        match self {
            Self::Hide => "hide-method",
            Self::Disable => "disable-method",
            Self::Validate => "validate-method",
            Self::Default => "default-method",
            Self::Choices => "choices-method",
            Self::AutoComplete => "auto-complete-method",
        }
    }

    /// Name of the positional parameter factory for this kind.
    pub const fn param_factory_name(&self) -> &'static str {
        match self {
            Self::Hide => "param-hide-method",
            Self::Disable => "param-disable-method",
            Self::Validate => "param-validate-method",
            Self::Default => "param-default-method",
            Self::Choices => "param-choices-method",
            Self::AutoComplete => "param-auto-complete-method",
        }
    }

    /// Member kinds this support method applies to.
    pub const fn member_feature_types(&self) -> &'static [FeatureType] {
        match self {
            Self::Hide | Self::Disable => FeatureType::MEMBERS,
            Self::Validate => FeatureType::PROPERTIES_AND_ACTIONS,
            Self::Default | Self::Choices | Self::AutoComplete => FeatureType::PROPERTIES_ONLY,
        }
    }

    /// Description of the accepted return type, for failure messages.
    fn expected_return(&self, ty: &TypeRef) -> String {
        match self {
            Self::Hide => "boolean".into(),
            Self::Disable => "boolean or string".into(),
            Self::Validate => "string".into(),
            Self::Default => ty.to_string(),
            Self::Choices | Self::AutoComplete => TypeRef::list_of(ty.clone()).to_string(),
        }
    }

    fn accepts_return(&self, method: &MethodDescriptor, ty: &TypeRef) -> bool {
        let ret = &method.return_type;
        match self {
            Self::Hide => ret.is_boolean(),
            Self::Disable => ret.is_boolean() || ret.is_text(),
            Self::Validate => ret.is_text(),
            Self::Default => ret == ty,
            Self::Choices | Self::AutoComplete => is_list_of(ret, ty),
        }
    }

    /// Facet payload for a method of this kind.
    fn facet_data(&self, method: &MethodDescriptor) -> FacetData {
        let handle = method.handle();
        match self {
            Self::Hide => HideForContextFacet { handle }.into(),
            Self::Disable => DisableForContextFacet { handle }.into(),
            Self::Validate => ValidateFacet { handle }.into(),
            Self::Default => DefaultFacet { handle }.into(),
            Self::Choices => ChoicesFacet::Method(handle).into(),
            Self::AutoComplete => {
                let min_length = method
                    .annotations
                    .find(names::MIN_LENGTH)
                    .and_then(|a| a.int("value"))
                    .and_then(|n| usize::try_from(n).ok())
                    .unwrap_or(AutoCompleteFacet::DEFAULT_MIN_LENGTH);
                AutoCompleteFacet { handle, min_length }.into()
            }
        }
    }
}

impl fmt::Display for SupportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Take `name(params)` from the pool and check its return type.
///
/// A method with the right name and parameters but the wrong return type is
/// still consumed, so it is reported once here rather than again as an
/// orphan.
fn claim(
    kind: SupportKind,
    pool: &mut MethodPool,
    name: &str,
    params: &[TypeRef],
    ty: &TypeRef,
) -> Result<Option<MethodDescriptor>, FactoryError> {
    let Some(method) = pool.take_exact(name, params) else {
        return Ok(None);
    };
    expect_return(&method, &kind.expected_return(ty), kind.accepts_return(&method, ty))?;
    Ok(Some(method))
}

// ── named<Member>() ──────────────────────────────────────────────────────────

pub struct NamedMethod;

impl FacetFactory for NamedMethod {
    fn name(&self) -> &'static str {
        NAMED_METHOD
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let name = format!("{NAMED_PREFIX}{}", ctx.capitalized_name());
        let Some(method) = ctx.pool.take(&name, 0) else {
            return Ok(());
        };
        expect_return(&method, "string", method.return_type.is_text())?;
        ctx.add_facet(Facet::new(
            NamedFacet::Method(method.handle()),
            Precedence::Default,
            convention(NAMED_METHOD, &method),
        ));
        Ok(())
    }
}

/// `named<N><Action>()`: the name of parameter `N`. Outranks the debug
/// metadata name, which is often a synthetic `argN`.
pub struct ParameterNamedMethod;

impl FacetFactory for ParameterNamedMethod {
    fn name(&self) -> &'static str {
        PARAM_NAMED_METHOD
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PARAMETERS_ONLY
    }

    fn process_param(&self, ctx: &mut ProcessParameterContext<'_>) -> FactoryResult {
        let name = format!("{NAMED_PREFIX}{}{}", ctx.index, ctx.capitalized_action_name());
        let Some(method) = ctx.pool.take(&name, 0) else {
            return Ok(());
        };
        expect_return(&method, "string", method.return_type.is_text())?;
        ctx.add_facet(Facet::new(
            NamedFacet::Method(method.handle()),
            Precedence::Default,
            convention(PARAM_NAMED_METHOD, &method),
        ));
        Ok(())
    }
}

// ── Member-level support methods ─────────────────────────────────────────────

/// `<prefix><Member>(..)` for one [`SupportKind`].
pub struct SupportMethod {
    kind: SupportKind,
}

impl SupportMethod {
    pub const fn new(kind: SupportKind) -> Self {
        Self { kind }
    }

    /// Parameters the support method must declare for this member.
    fn expected_params(&self, ctx: &ProcessMethodContext<'_>) -> Vec<TypeRef> {
        match (self.kind, ctx.feature_type) {
            (SupportKind::Validate, FeatureType::Action) => {
                ctx.method.params.iter().map(|p| p.ty.clone()).collect()
            }
            (SupportKind::Validate, _) => vec![ctx.member_type().clone()],
            (SupportKind::AutoComplete, _) => vec![TypeRef::Text],
            _ => Vec::new(),
        }
    }
}

impl FacetFactory for SupportMethod {
    fn name(&self) -> &'static str {
        self.kind.member_factory_name()
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        self.kind.member_feature_types()
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        let name = format!("{}{}", self.kind.prefix(), ctx.capitalized_name());
        let params = self.expected_params(ctx);
        let ty = ctx.member_type().clone();

        if let Some(method) = claim(self.kind, ctx.pool, &name, &params, &ty)? {
            ctx.add_facet(Facet::new(
                self.kind.facet_data(&method),
                Precedence::Default,
                convention(self.name(), &method),
            ));
        }
        Ok(())
    }
}

// ── Positional parameter support methods ─────────────────────────────────────

/// `<prefix><N><Action>(..)` for parameter `N` of an action.
pub struct ParameterSupportMethod {
    kind: SupportKind,
}

impl ParameterSupportMethod {
    pub const fn new(kind: SupportKind) -> Self {
        Self { kind }
    }

    fn expected_params(&self, param_type: &TypeRef) -> Vec<TypeRef> {
        match self.kind {
            SupportKind::Validate => vec![param_type.clone()],
            SupportKind::AutoComplete => vec![TypeRef::Text],
            _ => Vec::new(),
        }
    }
}

impl FacetFactory for ParameterSupportMethod {
    fn name(&self) -> &'static str {
        self.kind.param_factory_name()
    }

    fn phase(&self) -> ProcessingPhase {
        ProcessingPhase::Annotations
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PARAMETERS_ONLY
    }

    fn process_param(&self, ctx: &mut ProcessParameterContext<'_>) -> FactoryResult {
        let name = format!("{}{}{}", self.kind.prefix(), ctx.index, ctx.capitalized_action_name());
        let ty = ctx.param.ty.clone();
        let params = self.expected_params(&ty);

        if let Some(method) = claim(self.kind, ctx.pool, &name, &params, &ty)? {
            ctx.add_facet(Facet::new(
                self.kind.facet_data(&method),
                Precedence::Default,
                convention(self.name(), &method),
            ));
        }
        Ok(())
    }
}
