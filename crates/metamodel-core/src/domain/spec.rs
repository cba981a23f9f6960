//! Object specifications: the cached, read-only result of introspecting a
//! class.

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::domain::entities::{ClassKind, DomainObject};
use crate::domain::facet::{
    CssClassFacet, DisableForContextFacet, DisabledFacet, Facet, FacetConflict, FacetHolder,
    FacetType, HiddenFacet, HideForContextFacet, IconFacet, ImmutableFacet, MemberOrderFacet,
    NamedFacet, NavigableParentFacet, PluralFacet, TitleFacet, TypedFacet, BoundedFacet,
};
use crate::domain::identifier::Identifier;
use crate::domain::value_objects::{FeatureType, TypeRef, Where};

// ── ActionParameter ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ActionParameter {
    index: usize,
    ty: TypeRef,
    holder: FacetHolder,
}

impl ActionParameter {
    pub fn new(action: &Identifier, index: usize, ty: TypeRef) -> Self {
        Self {
            index,
            ty,
            holder: FacetHolder::new(action.parameter(index), FeatureType::ActionParameter),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn holder(&self) -> &FacetHolder {
        &self.holder
    }

    pub(crate) fn holder_mut(&mut self) -> &mut FacetHolder {
        &mut self.holder
    }

    pub fn get<T: TypedFacet>(&self) -> Option<&T> {
        self.holder.get::<T>()
    }

    /// Display name: the `Named` facet, else `param<N>`.
    pub fn name(&self) -> String {
        self.get::<NamedFacet>()
            .and_then(NamedFacet::literal)
            .map_or_else(|| format!("param{}", self.index), str::to_string)
    }
}

// ── ObjectMember ─────────────────────────────────────────────────────────────

/// A property, collection or action of a specification.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMember {
    id: String,
    ty: TypeRef,
    holder: FacetHolder,
    parameters: Vec<ActionParameter>,
    mixed_in_from: Option<String>,
}

impl ObjectMember {
    /// A property or collection.
    pub fn association(class_name: &str, id: impl Into<String>, feature_type: FeatureType, ty: TypeRef) -> Self {
        let id = id.into();
        Self {
            holder: FacetHolder::new(Identifier::member(class_name, id.clone()), feature_type),
            id,
            ty,
            parameters: Vec::new(),
            mixed_in_from: None,
        }
    }

    /// An action; parameters are created from `param_types`.
    pub fn action(class_name: &str, id: impl Into<String>, param_types: Vec<TypeRef>, return_type: TypeRef) -> Self {
        let id = id.into();
        let identifier = Identifier::action(
            class_name,
            id.clone(),
            param_types.iter().map(ToString::to_string),
        );
        let parameters = param_types
            .into_iter()
            .enumerate()
            .map(|(index, ty)| ActionParameter::new(&identifier, index, ty))
            .collect();
        Self {
            holder: FacetHolder::new(identifier, FeatureType::Action),
            id,
            ty: return_type,
            parameters,
            mixed_in_from: None,
        }
    }

    pub fn mixed_in(mut self, mixin_class: impl Into<String>) -> Self {
        self.mixed_in_from = Some(mixin_class.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn identifier(&self) -> &Identifier {
        self.holder.identifier()
    }

    pub fn feature_type(&self) -> FeatureType {
        self.holder.feature_type()
    }

    /// Property type, collection type, or action return type.
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn holder(&self) -> &FacetHolder {
        &self.holder
    }

    pub(crate) fn holder_mut(&mut self) -> &mut FacetHolder {
        &mut self.holder
    }

    pub fn parameters(&self) -> &[ActionParameter] {
        &self.parameters
    }

    pub fn parameter(&self, index: usize) -> Option<&ActionParameter> {
        self.parameters.get(index)
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut [ActionParameter] {
        &mut self.parameters
    }

    /// The member's own holder alongside its parameters, for processing
    /// parameters while the action's facets stay readable.
    pub(crate) fn holder_and_params_mut(&mut self) -> (&FacetHolder, &mut [ActionParameter]) {
        (&self.holder, &mut self.parameters)
    }

    pub fn mixed_in_from(&self) -> Option<&str> {
        self.mixed_in_from.as_deref()
    }

    pub fn is_property(&self) -> bool {
        self.feature_type() == FeatureType::Property
    }

    pub fn is_collection(&self) -> bool {
        self.feature_type() == FeatureType::Collection
    }

    pub fn is_action(&self) -> bool {
        self.feature_type() == FeatureType::Action
    }

    pub fn get<T: TypedFacet>(&self) -> Option<&T> {
        self.holder.get::<T>()
    }

    pub fn get_facet(&self, facet_type: FacetType) -> Option<&Facet> {
        self.holder.get_facet(facet_type)
    }

    /// Display name, evaluated against `obj` when computed.
    pub fn name(&self, obj: Option<&DomainObject>) -> String {
        self.get::<NamedFacet>()
            .and_then(|named| named.name(obj))
            .unwrap_or_else(|| self.id.clone())
    }

    pub fn member_order(&self) -> Option<&MemberOrderFacet> {
        self.get::<MemberOrderFacet>()
    }

    /// Whether the member is hidden in `context` for `obj`.
    pub fn is_hidden(&self, obj: &DomainObject, context: Where) -> bool {
        self.get::<HiddenFacet>().is_some_and(|h| h.hides(context))
            || self.get::<HideForContextFacet>().is_some_and(|h| h.hides(obj))
    }

    /// Why the member is disabled for `obj`, if it is.
    pub fn disabled_reason(&self, obj: &DomainObject) -> Option<String> {
        if let Some(disabled) = self.get::<DisabledFacet>() {
            return Some(disabled.reason().to_string());
        }
        self.get::<DisableForContextFacet>()
            .and_then(|d| d.disabled_reason(obj))
    }

    fn holders(&self) -> impl Iterator<Item = &FacetHolder> {
        std::iter::once(&self.holder).chain(self.parameters.iter().map(ActionParameter::holder))
    }
}

fn compare_member_order(a: &ObjectMember, b: &ObjectMember) -> Ordering {
    match (a.member_order(), b.member_order()) {
        (Some(x), Some(y)) => x.sequence.cmp(&y.sequence).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}

// ── ObjectSpecification ──────────────────────────────────────────────────────

/// The facet tree of one class: its own holder plus one per member.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSpecification {
    holder: FacetHolder,
    superclass: Option<String>,
    kind: ClassKind,
    members: Vec<ObjectMember>,
}

impl ObjectSpecification {
    pub fn new(class_name: impl Into<String>, superclass: Option<String>, kind: ClassKind) -> Self {
        Self {
            holder: FacetHolder::new(Identifier::class(class_name), FeatureType::Object),
            superclass,
            kind,
            members: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &Identifier {
        self.holder.identifier()
    }

    pub fn class_name(&self) -> &str {
        self.holder.identifier().class_name()
    }

    pub fn simple_name(&self) -> &str {
        self.holder.identifier().simple_class_name()
    }

    /// Name of the direct superclass, resolved through the loader on demand.
    pub fn superclass_name(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    pub fn kind(&self) -> &ClassKind {
        &self.kind
    }

    pub fn holder(&self) -> &FacetHolder {
        &self.holder
    }

    pub(crate) fn holder_mut(&mut self) -> &mut FacetHolder {
        &mut self.holder
    }

    pub(crate) fn add_member(&mut self, member: ObjectMember) {
        self.members.push(member);
    }

    pub fn get_facet(&self, facet_type: FacetType) -> Option<&Facet> {
        self.holder.get_facet(facet_type)
    }

    pub fn facet<T: TypedFacet>(&self) -> Option<&T> {
        self.holder.get::<T>()
    }

    /// Members in discovery order.
    pub fn members(&self) -> &[ObjectMember] {
        &self.members
    }

    /// Members ordered by `MemberOrder` sequence; unordered members follow,
    /// by id.
    pub fn members_in_order(&self) -> Vec<&ObjectMember> {
        let mut ordered: Vec<_> = self.members.iter().collect();
        ordered.sort_by(|a, b| compare_member_order(a, b));
        ordered
    }

    pub fn member(&self, id: &str) -> Option<&ObjectMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn property(&self, id: &str) -> Option<&ObjectMember> {
        self.properties().find(|m| m.id == id)
    }

    pub fn collection(&self, id: &str) -> Option<&ObjectMember> {
        self.collections().find(|m| m.id == id)
    }

    pub fn action(&self, id: &str) -> Option<&ObjectMember> {
        self.actions().find(|m| m.id == id)
    }

    pub fn properties(&self) -> impl Iterator<Item = &ObjectMember> {
        self.members.iter().filter(|m| m.is_property())
    }

    pub fn collections(&self) -> impl Iterator<Item = &ObjectMember> {
        self.members.iter().filter(|m| m.is_collection())
    }

    pub fn actions(&self) -> impl Iterator<Item = &ObjectMember> {
        self.members.iter().filter(|m| m.is_action())
    }

    pub fn singular_name(&self) -> String {
        self.facet::<NamedFacet>()
            .and_then(NamedFacet::literal)
            .unwrap_or_else(|| self.simple_name())
            .to_string()
    }

    pub fn plural_name(&self) -> String {
        self.facet::<PluralFacet>()
            .map_or_else(|| format!("{}s", self.singular_name()), |p| p.value.clone())
    }

    /// Title of `obj`, or `Untitled <Name>` when none can be produced.
    pub fn title(&self, obj: &DomainObject) -> String {
        self.facet::<TitleFacet>()
            .and_then(|t| t.title(obj))
            .unwrap_or_else(|| format!("Untitled {}", self.singular_name()))
    }

    pub fn icon_name(&self, obj: &DomainObject) -> Option<String> {
        self.facet::<IconFacet>().and_then(|i| i.icon_name(obj))
    }

    pub fn css_class(&self, obj: &DomainObject) -> Option<String> {
        self.facet::<CssClassFacet>().and_then(|c| c.css_class(obj))
    }

    pub fn navigable_parent(&self, obj: &DomainObject) -> Option<Arc<DomainObject>> {
        self.facet::<NavigableParentFacet>().and_then(|p| p.parent(obj))
    }

    pub fn is_immutable(&self) -> bool {
        self.holder.has::<ImmutableFacet>()
    }

    pub fn is_bounded(&self) -> bool {
        self.holder.has::<BoundedFacet>()
    }

    pub fn is_mixin(&self) -> bool {
        matches!(self.kind, ClassKind::Mixin { .. })
    }

    /// Every holder in the tree: class, members, parameters.
    pub fn holders(&self) -> impl Iterator<Item = &FacetHolder> {
        std::iter::once(&self.holder).chain(self.members.iter().flat_map(ObjectMember::holders))
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &FacetConflict> {
        self.holders().flat_map(FacetHolder::conflicts)
    }

    /// Deterministic textual dump of every holder's active facets. Two
    /// introspections of the same class produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({}) extends {}",
            self.class_name(),
            self.kind,
            self.superclass.as_deref().unwrap_or("-")
        );
        for holder in self.holders() {
            let _ = writeln!(out, "{} [{}]", holder.identifier(), holder.feature_type());
            for facet in holder.facets() {
                let _ = writeln!(out, "  {facet}");
            }
            for superseded in holder.all_superseded() {
                let _ = writeln!(
                    out,
                    "  - {} ({} by {})",
                    superseded.facet,
                    superseded.reason.as_str(),
                    superseded.winner
                );
            }
        }
        out
    }
}
