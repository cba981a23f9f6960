//! Class-level factories.

use super::{
    convention, expect_return, invalid, CSS_CLASS_METHOD, DOMAIN_OBJECT_ANNOTATION, DOMAIN_OBJECT_KIND,
    ICON_NAME_METHOD, NAVIGABLE_PARENT, OBJECT_LAYOUT, OBJECT_NATURAL_NAME,
    OBJECT_VALIDATE_METHOD, PLURAL_FALLBACK, TITLE_ANNOTATION, TITLE_METHOD, TITLE_TO_STRING,
};
use crate::application::programming_model::naming::{self, GET_PREFIX, IS_PREFIX};
use crate::application::programming_model::{
    FacetFactory, FactoryError, FactoryResult, ProcessClassContext, ProcessingPhase,
};
use crate::domain::facet::{
    BoundedFacet, CssClassFacet, DescribedAsFacet, IconFacet, ImmutableFacet, MixinFacet,
    NamedFacet, NatureFacet, NavigableParentFacet, PluralFacet, TitleComponent, TitleFacet,
    ValidateFacet,
};
use crate::domain::{
    Annotation, AttrValue, ClassDescriptor, ClassKind, DeweyOrder, Facet, FacetOrigin,
    FeatureType, MethodDescriptor, Precedence, ROOT_CLASS_NAME, names,
};

macro_rules! class_factory {
    ($name:expr, $phase:ident) => {
        fn name(&self) -> &'static str {
            $name
        }

        fn phase(&self) -> ProcessingPhase {
            ProcessingPhase::$phase
        }

        fn feature_types(&self) -> &'static [FeatureType] {
            FeatureType::OBJECTS_ONLY
        }
    };
}

// ── Kind ─────────────────────────────────────────────────────────────────────

/// Facets implied by the declared kind of the class.
pub struct DomainObjectKind;

impl FacetFactory for DomainObjectKind {
    class_factory!(DOMAIN_OBJECT_KIND, MemberModelling);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let origin = || FacetOrigin::fallback(DOMAIN_OBJECT_KIND);
        let kind = ctx.class.kind.clone();

        if kind == ClassKind::Value {
            ctx.add_facet(Facet::new(
                ImmutableFacet { reason: None },
                Precedence::Inferred,
                origin(),
            ));
        }
        if let ClassKind::Mixin { mixee } = &kind {
            let member = ctx
                .class
                .mixin_member_name()
                .ok_or_else(|| FactoryError::Invalid("mixin class names must end in _<member>".into()))?;
            ctx.add_facet(Facet::new(
                MixinFacet {
                    mixee: mixee.clone(),
                    member: member.to_string(),
                },
                Precedence::Inferred,
                origin(),
            ));
        }
        ctx.add_facet(Facet::new(NatureFacet { kind }, Precedence::Inferred, origin()));
        Ok(())
    }
}

// ── @DomainObject / @DomainObjectLayout ──────────────────────────────────────

fn is_bounded(annotation: &Annotation) -> bool {
    match annotation.attributes.get("bounding") {
        Some(AttrValue::Bool(b)) => *b,
        Some(AttrValue::Text(text)) => text.eq_ignore_ascii_case("bounded") || text == "true",
        _ => false,
    }
}

/// Whether `class` is declared `@DomainObject(bounding = ...)`.
pub(crate) fn declares_bounded(class: &ClassDescriptor) -> bool {
    class
        .annotations
        .find(names::DOMAIN_OBJECT)
        .is_some_and(is_bounded)
}

pub struct DomainObjectAnnotation;

impl FacetFactory for DomainObjectAnnotation {
    class_factory!(DOMAIN_OBJECT_ANNOTATION, Annotations);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let Some(annotation) = ctx.annotation(names::DOMAIN_OBJECT).cloned() else {
            return Ok(());
        };
        let origin = || FacetOrigin::annotation(DOMAIN_OBJECT_ANNOTATION, names::DOMAIN_OBJECT);

        if annotation
            .text("editing")
            .is_some_and(|e| e.eq_ignore_ascii_case("disabled"))
        {
            let reason = annotation.text("editingDisabledReason").map(str::to_string);
            ctx.add_facet(Facet::new(ImmutableFacet { reason }, Precedence::High, origin()));
        }
        if is_bounded(&annotation) {
            ctx.add_facet(Facet::new(BoundedFacet, Precedence::High, origin()));
        }
        if let Some(nature) = annotation.text("nature") {
            let kind = ClassKind::parse_nature(nature)
                .map_err(invalid)?;
            ctx.add_facet(Facet::new(NatureFacet { kind }, Precedence::High, origin()));
        }
        Ok(())
    }
}

/// `@DomainObjectLayout(named, plural, describedAs, cssClass)`, `@Plural`
/// and `@CssClass` on the class.
pub struct ObjectLayout;

impl FacetFactory for ObjectLayout {
    class_factory!(OBJECT_LAYOUT, Annotations);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        if let Some(layout) = ctx.annotation(names::DOMAIN_OBJECT_LAYOUT).cloned() {
            let origin = || FacetOrigin::annotation(OBJECT_LAYOUT, names::DOMAIN_OBJECT_LAYOUT);
            if let Some(named) = layout.text("named") {
                ctx.add_facet(Facet::new(NamedFacet::Literal(named.into()), Precedence::High, origin()));
            }
            if let Some(plural) = layout.text("plural") {
                ctx.add_facet(Facet::new(PluralFacet::new(plural), Precedence::High, origin()));
            }
            if let Some(described) = layout.text("describedAs") {
                ctx.add_facet(Facet::new(DescribedAsFacet::new(described), Precedence::High, origin()));
            }
            if let Some(css) = layout.text("cssClass") {
                ctx.add_facet(Facet::new(CssClassFacet::Literal(css.into()), Precedence::High, origin()));
            }
        }
        if let Some(plural) = ctx.annotation(names::PLURAL).and_then(Annotation::value).map(str::to_string) {
            ctx.add_facet(Facet::new(
                PluralFacet::new(plural),
                Precedence::High,
                FacetOrigin::annotation(OBJECT_LAYOUT, names::PLURAL),
            ));
        }
        if let Some(css) = ctx.annotation(names::CSS_CLASS).and_then(Annotation::value).map(str::to_string) {
            ctx.add_facet(Facet::new(
                CssClassFacet::Literal(css),
                Precedence::High,
                FacetOrigin::annotation(OBJECT_LAYOUT, names::CSS_CLASS),
            ));
        }
        Ok(())
    }
}

// ── Title ────────────────────────────────────────────────────────────────────

/// A `title()` method.
pub struct TitleMethod;

impl FacetFactory for TitleMethod {
    class_factory!(TITLE_METHOD, Annotations);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let Some(method) = ctx.pool.take("title", 0) else {
            return Ok(());
        };
        expect_return(&method, "string", method.return_type.is_text())?;
        ctx.add_facet(Facet::new(
            TitleFacet::Method(method.handle()),
            Precedence::Default,
            convention(TITLE_METHOD, &method),
        ));
        Ok(())
    }
}

/// `@Title` on getters, or on fields with a getter.
pub struct TitleAnnotation;

impl TitleAnnotation {
    fn getter_of<'c>(class: &'c ClassDescriptor, field: &str) -> Option<&'c MethodDescriptor> {
        let stem = naming::capitalize(field);
        [GET_PREFIX, IS_PREFIX].iter().find_map(|prefix| {
            let name = format!("{prefix}{stem}");
            class
                .methods
                .iter()
                .find(|m| m.name == name && m.params.is_empty())
        })
    }

    fn component(
        sequence: DeweyOrder,
        accessor: &MethodDescriptor,
        annotation: &Annotation,
        first: bool,
    ) -> TitleComponent {
        let default_prepend = if first { "" } else { " " };
        TitleComponent {
            accessor: accessor.handle(),
            sequence,
            prepend: annotation.text("prepend").unwrap_or(default_prepend).to_string(),
            append: annotation.text("append").unwrap_or_default().to_string(),
        }
    }
}

impl FacetFactory for TitleAnnotation {
    class_factory!(TITLE_ANNOTATION, Annotations);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let class = ctx.class;
        let mut sources: Vec<(&MethodDescriptor, &Annotation)> = Vec::new();

        for method in &class.methods {
            if let Some(title) = method.annotations.find(names::TITLE) {
                if !method.params.is_empty() || method.return_type.is_void() {
                    return Err(FactoryError::Invalid(format!(
                        "@Title on {} requires an accessor without parameters",
                        method.signature()
                    )));
                }
                sources.push((method, title));
            }
        }
        for field in &class.fields {
            if let Some(title) = field.annotations.find(names::TITLE) {
                let getter = Self::getter_of(class, &field.name).ok_or_else(|| {
                    FactoryError::Invalid(format!("@Title field '{}' has no getter", field.name))
                })?;
                if !sources.iter().any(|(m, _)| m.signature() == getter.signature()) {
                    sources.push((getter, title));
                }
            }
        }
        if sources.is_empty() {
            return Ok(());
        }

        let mut ordered = sources
            .into_iter()
            .map(|(accessor, annotation)| {
                DeweyOrder::parse(annotation.text("sequence").unwrap_or("1"))
                    .map(|sequence| (sequence, accessor, annotation))
                    .map_err(invalid)
            })
            .collect::<Result<Vec<_>, _>>()?;
        ordered.sort_by(|a, b| a.0.cmp(&b.0));

        let components = ordered
            .into_iter()
            .enumerate()
            .map(|(i, (sequence, accessor, annotation))| {
                Self::component(sequence, accessor, annotation, i == 0)
            })
            .collect();

        ctx.add_facet(Facet::new(
            TitleFacet::Annotated(components),
            Precedence::High,
            FacetOrigin::annotation(TITLE_ANNOTATION, names::TITLE),
        ));
        Ok(())
    }
}

/// An overridden `toString()`; the inherited root implementation never
/// becomes a title.
pub struct TitleToString;

impl FacetFactory for TitleToString {
    class_factory!(TITLE_TO_STRING, Fallback);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let Some(method) = ctx.pool.take("toString", 0) else {
            return Ok(());
        };
        if method.declared_in == ROOT_CLASS_NAME || !method.return_type.is_text() {
            return Ok(());
        }
        ctx.add_facet(Facet::new(
            TitleFacet::ToString(method.handle()),
            Precedence::Fallback,
            convention(TITLE_TO_STRING, &method),
        ));
        Ok(())
    }
}

// ── Per-object support methods ───────────────────────────────────────────────

/// `iconName()`.
pub struct IconNameMethod;

impl FacetFactory for IconNameMethod {
    class_factory!(ICON_NAME_METHOD, Annotations);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let Some(method) = ctx.pool.take("iconName", 0) else {
            return Ok(());
        };
        expect_return(&method, "string", method.return_type.is_text())?;
        ctx.add_facet(Facet::new(
            IconFacet::Method(method.handle()),
            Precedence::Default,
            convention(ICON_NAME_METHOD, &method),
        ));
        Ok(())
    }
}

/// `cssClass()`.
pub struct CssClassMethod;

impl FacetFactory for CssClassMethod {
    class_factory!(CSS_CLASS_METHOD, Annotations);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let Some(method) = ctx.pool.take("cssClass", 0) else {
            return Ok(());
        };
        expect_return(&method, "string", method.return_type.is_text())?;
        ctx.add_facet(Facet::new(
            CssClassFacet::Method(method.handle()),
            Precedence::Default,
            convention(CSS_CLASS_METHOD, &method),
        ));
        Ok(())
    }
}

/// Object-level `validate()`: why the object as a whole is invalid.
pub struct ObjectValidateMethod;

impl FacetFactory for ObjectValidateMethod {
    class_factory!(OBJECT_VALIDATE_METHOD, Annotations);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let Some(method) = ctx.pool.take("validate", 0) else {
            return Ok(());
        };
        expect_return(&method, "string", method.return_type.is_text())?;
        ctx.add_facet(Facet::new(
            ValidateFacet {
                handle: method.handle(),
            },
            Precedence::Default,
            convention(OBJECT_VALIDATE_METHOD, &method),
        ));
        Ok(())
    }
}

/// `@Parent` on a getter (or its field): the navigable parent.
pub struct NavigableParent;

impl FacetFactory for NavigableParent {
    class_factory!(NAVIGABLE_PARENT, Annotations);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let class = ctx.class;
        let mut accessors: Vec<&MethodDescriptor> = class
            .methods
            .iter()
            .filter(|m| m.annotations.has(names::PARENT))
            .collect();
        for field in class.fields.iter().filter(|f| f.annotations.has(names::PARENT)) {
            let getter = TitleAnnotation::getter_of(class, &field.name).ok_or_else(|| {
                FactoryError::Invalid(format!("@Parent field '{}' has no getter", field.name))
            })?;
            if !accessors.iter().any(|m| m.signature() == getter.signature()) {
                accessors.push(getter);
            }
        }

        match accessors.as_slice() {
            [] => Ok(()),
            [accessor] => {
                if accessor.return_type.referenced_class().is_none() || accessor.return_type.is_list() {
                    return Err(FactoryError::Invalid(format!(
                        "@Parent accessor {} must return a domain object",
                        accessor.signature()
                    )));
                }
                let handle = accessor.handle();
                ctx.add_facet(Facet::new(
                    NavigableParentFacet { accessor: handle },
                    Precedence::High,
                    FacetOrigin::annotation(NAVIGABLE_PARENT, names::PARENT),
                ));
                Ok(())
            }
            many => Err(FactoryError::Invalid(format!(
                "{} members are annotated @Parent; at most one is allowed",
                many.len()
            ))),
        }
    }
}

// ── Fallbacks ────────────────────────────────────────────────────────────────

/// Natural name of the simple class name: `OrderLine` → `Order Line`.
pub struct ObjectNaturalName;

impl FacetFactory for ObjectNaturalName {
    class_factory!(OBJECT_NATURAL_NAME, Fallback);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let name = naming::natural_name(ctx.class.simple_name());
        ctx.add_facet(Facet::new(
            NamedFacet::Literal(name),
            Precedence::Fallback,
            FacetOrigin::fallback(OBJECT_NATURAL_NAME),
        ));
        Ok(())
    }
}

/// Plural of whatever singular name won.
pub struct PluralFallback;

impl FacetFactory for PluralFallback {
    class_factory!(PLURAL_FALLBACK, PostProcessing);

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        let singular = ctx
            .holder
            .get::<NamedFacet>()
            .and_then(NamedFacet::literal)
            .map_or_else(|| naming::natural_name(ctx.class.simple_name()), str::to_string);
        ctx.add_facet(Facet::new(
            PluralFacet::new(naming::pluralize(&singular)),
            Precedence::Fallback,
            FacetOrigin::fallback(PLURAL_FALLBACK),
        ));
        Ok(())
    }
}
