//! Facets: typed units of behaviour and metadata attached to model elements.
//!
//! # Design
//!
//! Each capability (title, visibility, defaults, ...) is one variant of the
//! closed [`FacetData`] sum type. The payload of each variant is itself a small
//! enum or struct whose variants name where the facet came from: an
//! annotation, a naming-convention method or a computed fallback. Competing
//! facets of the same [`FacetType`] are resolved by [`Precedence`] in
//! [`FacetHolder::add_facet`](holder::FacetHolder::add_facet).
//!
//! Facets are immutable once constructed. Two facets are *semantically equal*
//! when their payloads are equal; method handles compare by signature and
//! regular expressions by pattern.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::entities::InvocationError;
use crate::domain::value_objects::Precedence;

pub mod holder;
pub mod member;
pub mod object;

pub use holder::{FacetConflict, FacetHolder, FacetOutcome, SupersededFacet, SupersessionReason};
pub use member::{
    ActionInvocationFacet, ActionSemanticsFacet, AutoCompleteFacet, ChoicesFacet,
    CollectionAccessorFacet, DefaultFacet, DisableForContextFacet, DisabledFacet,
    HiddenFacet, HideForContextFacet, MandatoryFacet, MaxLengthFacet, MemberOrderFacet,
    PropertyAccessorFacet, PropertyClearFacet, PropertySetterFacet, RegExFacet, TypeOfFacet,
    ValidateFacet,
};
pub use object::{
    BoundedFacet, CssClassFacet, DescribedAsFacet, IconFacet, ImmutableFacet, MixinFacet,
    NamedFacet, NatureFacet, NavigableParentFacet, PluralFacet, TitleComponent, TitleFacet,
};

/// Typed access to a facet payload: `holder.get::<TitleFacet>()`.
pub trait TypedFacet: Sized {
    const TYPE: FacetType;

    fn from_data(data: &FacetData) -> Option<&Self>;
}

macro_rules! facet_types {
    ($( $variant:ident($payload:ty) => $name:literal ),+ $(,)?) => {
        /// Capability tag. One active facet per tag per holder.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum FacetType {
            $( $variant, )+
        }

        impl FacetType {
            pub const ALL: &'static [FacetType] = &[$( Self::$variant ),+];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )+
                }
            }
        }

        /// Facet payload, one variant per capability.
        #[derive(Debug, Clone, PartialEq)]
        pub enum FacetData {
            $( $variant($payload), )+
        }

        impl FacetData {
            pub fn facet_type(&self) -> FacetType {
                match self {
                    $( Self::$variant(_) => FacetType::$variant, )+
                }
            }
        }

        impl fmt::Display for FacetData {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( Self::$variant(payload) => write!(f, "{payload}"), )+
                }
            }
        }

        $(
            impl TypedFacet for $payload {
                const TYPE: FacetType = FacetType::$variant;

                fn from_data(data: &FacetData) -> Option<&Self> {
                    match data {
                        FacetData::$variant(payload) => Some(payload),
                        _ => None,
                    }
                }
            }

            impl From<$payload> for FacetData {
                fn from(payload: $payload) -> Self {
                    Self::$variant(payload)
                }
            }
        )+
    };
}

facet_types! {
    // object
    Title(TitleFacet) => "title",
    Plural(PluralFacet) => "plural",
    CssClass(CssClassFacet) => "css-class",
    Icon(IconFacet) => "icon",
    Immutable(ImmutableFacet) => "immutable",
    Bounded(BoundedFacet) => "bounded",
    Nature(NatureFacet) => "nature",
    Mixin(MixinFacet) => "mixin",
    NavigableParent(NavigableParentFacet) => "navigable-parent",
    // shared
    Named(NamedFacet) => "named",
    DescribedAs(DescribedAsFacet) => "described-as",
    // members
    PropertyAccessor(PropertyAccessorFacet) => "property-accessor",
    PropertySetter(PropertySetterFacet) => "property-setter",
    PropertyClear(PropertyClearFacet) => "property-clear",
    CollectionAccessor(CollectionAccessorFacet) => "collection-accessor",
    TypeOf(TypeOfFacet) => "type-of",
    ActionInvocation(ActionInvocationFacet) => "action-invocation",
    ActionSemantics(ActionSemanticsFacet) => "action-semantics",
    MemberOrder(MemberOrderFacet) => "member-order",
    Hidden(HiddenFacet) => "hidden",
    HideForContext(HideForContextFacet) => "hide-for-context",
    Disabled(DisabledFacet) => "disabled",
    DisableForContext(DisableForContextFacet) => "disable-for-context",
    Validate(ValidateFacet) => "validate",
    MaxLength(MaxLengthFacet) => "max-length",
    RegEx(RegExFacet) => "regex",
    Mandatory(MandatoryFacet) => "mandatory",
    Default(DefaultFacet) => "default",
    Choices(ChoicesFacet) => "choices",
    AutoComplete(AutoCompleteFacet) => "auto-complete",
}

impl fmt::Display for FacetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FacetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ── Origin ───────────────────────────────────────────────────────────────────

/// What a facet was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FacetSource {
    /// An explicit annotation, by name.
    Annotation(String),
    /// A naming-convention method, by signature.
    Convention(String),
    /// Derived from another facet already on the holder (or its owner).
    Derived(FacetType),
    /// Debug metadata such as recovered parameter names.
    Metadata,
    /// Computed when nothing more specific is present.
    Fallback,
    /// Installed directly by code.
    Programmatic,
}

impl fmt::Display for FacetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annotation(name) => write!(f, "@{name}"),
            Self::Convention(signature) => write!(f, "convention {signature}"),
            Self::Derived(facet_type) => write!(f, "derived from {facet_type}"),
            Self::Metadata => f.write_str("metadata"),
            Self::Fallback => f.write_str("fallback"),
            Self::Programmatic => f.write_str("programmatic"),
        }
    }
}

/// Which factory produced a facet and from what.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FacetOrigin {
    pub factory: String,
    pub source: FacetSource,
}

impl FacetOrigin {
    pub fn new(factory: impl Into<String>, source: FacetSource) -> Self {
        Self {
            factory: factory.into(),
            source,
        }
    }

    pub fn annotation(factory: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self::new(factory, FacetSource::Annotation(annotation.into()))
    }

    pub fn convention(factory: impl Into<String>, signature: impl fmt::Display) -> Self {
        Self::new(factory, FacetSource::Convention(signature.to_string()))
    }

    pub fn derived(factory: impl Into<String>, from: FacetType) -> Self {
        Self::new(factory, FacetSource::Derived(from))
    }

    pub fn fallback(factory: impl Into<String>) -> Self {
        Self::new(factory, FacetSource::Fallback)
    }
}

impl fmt::Display for FacetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {}", self.source, self.factory)
    }
}

impl Serialize for FacetOrigin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Facet ────────────────────────────────────────────────────────────────────

/// An immutable facet: payload, precedence and origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    data: FacetData,
    precedence: Precedence,
    origin: FacetOrigin,
}

impl Facet {
    pub fn new(data: impl Into<FacetData>, precedence: Precedence, origin: FacetOrigin) -> Self {
        Self {
            data: data.into(),
            precedence,
            origin,
        }
    }

    pub fn facet_type(&self) -> FacetType {
        self.data.facet_type()
    }

    pub fn data(&self) -> &FacetData {
        &self.data
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub fn origin(&self) -> &FacetOrigin {
        &self.origin
    }

    pub fn payload<T: TypedFacet>(&self) -> Option<&T> {
        T::from_data(&self.data)
    }

    /// Whether both facets would behave identically at runtime.
    pub fn semantically_equals(&self, other: &Facet) -> bool {
        self.data == other.data
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}, {}]",
            self.facet_type(),
            self.data,
            self.precedence,
            self.origin
        )
    }
}

/// Degrade a failed support-method call to "no value".
///
/// Support methods run opportunistically while a model is being used, so a
/// failing one must never reach the caller.
pub(crate) fn recover<T>(what: &str, result: Result<T, InvocationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %err, "{what} failed, treating as absent");
            None
        }
    }
}
