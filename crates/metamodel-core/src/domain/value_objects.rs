//! Domain value objects: FeatureType, Precedence, TypeRef, Where, DeweyOrder
//! and SemanticsOf.
//!
//! # Design
//!
//! These are pure value types: equality by value, no identity. Each has a
//! canonical string representation and a `FromStr` parser so it can appear in
//! annotations, manifests and CLI output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::identifier::is_valid_class_name;

// ── FeatureType ──────────────────────────────────────────────────────────────

/// The kind of model element a facet holder describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureType {
    Object,
    Property,
    Collection,
    Action,
    ActionParameter,
}

impl FeatureType {
    pub const OBJECTS_ONLY: &'static [FeatureType] = &[Self::Object];
    pub const PROPERTIES_ONLY: &'static [FeatureType] = &[Self::Property];
    pub const COLLECTIONS_ONLY: &'static [FeatureType] = &[Self::Collection];
    pub const ACTIONS_ONLY: &'static [FeatureType] = &[Self::Action];
    pub const PARAMETERS_ONLY: &'static [FeatureType] = &[Self::ActionParameter];
    pub const PROPERTIES_AND_COLLECTIONS: &'static [FeatureType] =
        &[Self::Property, Self::Collection];
    pub const PROPERTIES_AND_ACTIONS: &'static [FeatureType] = &[Self::Property, Self::Action];
    pub const PROPERTIES_AND_PARAMETERS: &'static [FeatureType] =
        &[Self::Property, Self::ActionParameter];
    pub const ACTIONS_AND_PARAMETERS: &'static [FeatureType] =
        &[Self::Action, Self::ActionParameter];
    pub const MEMBERS: &'static [FeatureType] = &[Self::Property, Self::Collection, Self::Action];
    pub const MEMBERS_AND_PARAMETERS: &'static [FeatureType] =
        &[Self::Property, Self::Collection, Self::Action, Self::ActionParameter];
    pub const EVERYTHING_BUT_PARAMETERS: &'static [FeatureType] =
        &[Self::Object, Self::Property, Self::Collection, Self::Action];
    pub const EVERYTHING: &'static [FeatureType] = &[
        Self::Object,
        Self::Property,
        Self::Collection,
        Self::Action,
        Self::ActionParameter,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Property => "property",
            Self::Collection => "collection",
            Self::Action => "action",
            Self::ActionParameter => "action-parameter",
        }
    }

    pub const fn is_association(&self) -> bool {
        matches!(self, Self::Property | Self::Collection)
    }

    pub const fn is_member(&self) -> bool {
        matches!(self, Self::Property | Self::Collection | Self::Action)
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Precedence ───────────────────────────────────────────────────────────────

/// Ranking used to resolve competing facets of the same type.
///
/// The order is total: `Fallback < Inferred < Default < High < Override`.
///
/// | Source                                  | Precedence |
/// |-----------------------------------------|------------|
/// | computed fallback (toString, natural name) | `Fallback` |
/// | derived from another facet, marker      | `Inferred` |
/// | naming-convention method, debug metadata | `Default`  |
/// | explicit annotation                     | `High`     |
/// | programmatic override                   | `Override` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precedence {
    Fallback,
    Inferred,
    Default,
    High,
    Override,
}

impl Precedence {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fallback => "fallback",
            Self::Inferred => "inferred",
            Self::Default => "default",
            Self::High => "high",
            Self::Override => "override",
        }
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── TypeRef ──────────────────────────────────────────────────────────────────

/// A declared type of a field, method return value or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeRef {
    Void,
    Boolean,
    Int,
    Long,
    Decimal,
    Text,
    Date,
    /// A domain class, by fully qualified name.
    Class(String),
    /// An ordered collection of the element type.
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    pub fn list_of(element: TypeRef) -> Self {
        Self::List(Box::new(element))
    }

    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }

    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Primitives cannot hold "no value" and are therefore always mandatory.
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Boolean | Self::Int | Self::Long | Self::Decimal)
    }

    /// Element type of a list, `None` for scalars.
    pub fn element_type(&self) -> Option<&TypeRef> {
        match self {
            Self::List(element) => Some(element),
            _ => None,
        }
    }

    /// The domain class referenced by this type, looking through lists.
    pub fn referenced_class(&self) -> Option<&str> {
        match self {
            Self::Class(name) => Some(name),
            Self::List(element) => element.referenced_class(),
            _ => None,
        }
    }

    /// Simple (unqualified) name, used to derive parameter names.
    pub fn simple_name(&self) -> String {
        match self {
            Self::Class(name) => name.rsplit('.').next().unwrap_or(name).to_string(),
            Self::List(element) => format!("{}List", element.simple_name()),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Boolean => f.write_str("boolean"),
            Self::Int => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Decimal => f.write_str("decimal"),
            Self::Text => f.write_str("string"),
            Self::Date => f.write_str("date"),
            Self::Class(name) => f.write_str(name),
            Self::List(element) => write!(f, "List<{element}>"),
        }
    }
}

impl FromStr for TypeRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s
            .strip_prefix("List<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return Ok(Self::list_of(inner.parse()?));
        }
        if let Some(inner) = s.strip_suffix("[]") {
            return Ok(Self::list_of(inner.parse()?));
        }

        match s {
            "void" => Ok(Self::Void),
            "boolean" | "bool" => Ok(Self::Boolean),
            "int" | "i32" => Ok(Self::Int),
            "long" | "i64" => Ok(Self::Long),
            "decimal" | "double" | "f64" => Ok(Self::Decimal),
            "string" | "String" | "java.lang.String" => Ok(Self::Text),
            "date" | "LocalDate" => Ok(Self::Date),
            name if is_valid_class_name(name) => Ok(Self::Class(name.to_string())),
            other => Err(DomainError::InvalidTypeRef(other.to_string())),
        }
    }
}

impl Serialize for TypeRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ── Where ────────────────────────────────────────────────────────────────────

/// Where in the user interface a hidden member is suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Where {
    Everywhere,
    ObjectForms,
    AllTables,
    ParentedTables,
    StandaloneTables,
    Nowhere,
}

impl Where {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Everywhere => "everywhere",
            Self::ObjectForms => "object_forms",
            Self::AllTables => "all_tables",
            Self::ParentedTables => "parented_tables",
            Self::StandaloneTables => "standalone_tables",
            Self::Nowhere => "nowhere",
        }
    }

    /// Whether hiding in `self` also covers `context`.
    pub fn includes(&self, context: Where) -> bool {
        match self {
            Self::Everywhere => context != Self::Nowhere,
            Self::Nowhere => false,
            Self::AllTables => matches!(
                context,
                Self::AllTables | Self::ParentedTables | Self::StandaloneTables
            ),
            other => *other == context,
        }
    }
}

impl fmt::Display for Where {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Where {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "everywhere" | "anywhere" => Ok(Self::Everywhere),
            "object_forms" => Ok(Self::ObjectForms),
            "all_tables" => Ok(Self::AllTables),
            "parented_tables" => Ok(Self::ParentedTables),
            "standalone_tables" => Ok(Self::StandaloneTables),
            "nowhere" => Ok(Self::Nowhere),
            other => Err(DomainError::InvalidValue {
                what: "where",
                value: other.to_string(),
            }),
        }
    }
}

// ── MemberOrder sequence ─────────────────────────────────────────────────────

/// A Dewey-decimal member ordering key such as `1.2.10`.
///
/// Components compare numerically, so `1.10` sorts after `1.9`, and a
/// prefix sorts before its extensions (`1` < `1.1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeweyOrder(Vec<u32>);

impl DeweyOrder {
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidMemberOrder(input.to_string());
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }
        trimmed
            .split('.')
            .map(|part| part.trim().parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for DeweyOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl FromStr for DeweyOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ── SemanticsOf ──────────────────────────────────────────────────────────────

/// Side-effect semantics of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticsOf {
    Safe,
    Idempotent,
    NonIdempotent,
    NonIdempotentAreYouSure,
}

impl SemanticsOf {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Idempotent => "idempotent",
            Self::NonIdempotent => "non_idempotent",
            Self::NonIdempotentAreYouSure => "non_idempotent_are_you_sure",
        }
    }

    pub const fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }
}

impl fmt::Display for SemanticsOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticsOf {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "safe" | "safe_and_request_cacheable" => Ok(Self::Safe),
            "idempotent" | "idempotent_are_you_sure" => Ok(Self::Idempotent),
            "non_idempotent" => Ok(Self::NonIdempotent),
            "non_idempotent_are_you_sure" => Ok(Self::NonIdempotentAreYouSure),
            other => Err(DomainError::InvalidValue {
                what: "action semantics",
                value: other.to_string(),
            }),
        }
    }
}
