//! Object-level facet payloads, plus `Named` and `DescribedAs` which every
//! kind of holder can carry.

use std::fmt;
use std::sync::Arc;

use crate::domain::entities::{ClassKind, DomainObject, MethodHandle, Value};
use crate::domain::facet::recover;
use crate::domain::value_objects::DeweyOrder;

// ── Title ────────────────────────────────────────────────────────────────────

/// One `@Title` property contributing to an object's title.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleComponent {
    pub accessor: MethodHandle,
    pub sequence: DeweyOrder,
    pub prepend: String,
    pub append: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TitleFacet {
    /// A `title()` method.
    Method(MethodHandle),
    /// `@Title` components, sorted by sequence.
    Annotated(Vec<TitleComponent>),
    /// An overridden `toString()`.
    ToString(MethodHandle),
}

impl TitleFacet {
    /// Title of `obj`; `None` when the source yields nothing or fails.
    pub fn title(&self, obj: &DomainObject) -> Option<String> {
        let raw = match self {
            Self::Method(handle) | Self::ToString(handle) => {
                recover("title", handle.invoke_text(obj, &[])).flatten()?
            }
            Self::Annotated(components) => {
                let mut title = String::new();
                for component in components {
                    let value = recover("title component", component.accessor.invoke(obj, &[]));
                    match value {
                        None | Some(Value::Null) => continue,
                        Some(value) => {
                            title.push_str(&component.prepend);
                            title.push_str(&value.to_string());
                            title.push_str(&component.append);
                        }
                    }
                }
                title
            }
        };

        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

impl fmt::Display for TitleFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(handle) => write!(f, "method {handle}"),
            Self::ToString(handle) => write!(f, "toString {handle}"),
            Self::Annotated(components) => {
                f.write_str("@Title on [")?;
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}@{}", component.accessor.signature().name, component.sequence)?;
                }
                f.write_str("]")
            }
        }
    }
}

// ── Named / DescribedAs / Plural ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum NamedFacet {
    Literal(String),
    /// A `named<Member>()` method, evaluated per object.
    Method(MethodHandle),
}

impl NamedFacet {
    pub fn literal(&self) -> Option<&str> {
        match self {
            Self::Literal(name) => Some(name),
            Self::Method(_) => None,
        }
    }

    /// Name of the element, consulting `obj` when the name is computed.
    pub fn name(&self, obj: Option<&DomainObject>) -> Option<String> {
        match self {
            Self::Literal(name) => Some(name.clone()),
            Self::Method(handle) => {
                let obj = obj?;
                recover("named", handle.invoke_text(obj, &[])).flatten()
            }
        }
    }
}

impl fmt::Display for NamedFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(name) => write!(f, "\"{name}\""),
            Self::Method(handle) => write!(f, "method {handle}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribedAsFacet {
    pub value: String,
}

impl DescribedAsFacet {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl fmt::Display for DescribedAsFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralFacet {
    pub value: String,
}

impl PluralFacet {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl fmt::Display for PluralFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.value)
    }
}

// ── Icon / CssClass ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum IconFacet {
    Literal(String),
    /// An `iconName()` method.
    Method(MethodHandle),
}

impl IconFacet {
    /// Icon name for `obj`. A failing `iconName()` yields `None`.
    pub fn icon_name(&self, obj: &DomainObject) -> Option<String> {
        match self {
            Self::Literal(name) => Some(name.clone()),
            Self::Method(handle) => recover("iconName", handle.invoke_text(obj, &[])).flatten(),
        }
    }
}

impl fmt::Display for IconFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(name) => write!(f, "\"{name}\""),
            Self::Method(handle) => write!(f, "method {handle}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CssClassFacet {
    Literal(String),
    Method(MethodHandle),
}

impl CssClassFacet {
    pub fn css_class(&self, obj: &DomainObject) -> Option<String> {
        match self {
            Self::Literal(class) => Some(class.clone()),
            Self::Method(handle) => recover("cssClass", handle.invoke_text(obj, &[])).flatten(),
        }
    }
}

impl fmt::Display for CssClassFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(class) => write!(f, "\"{class}\""),
            Self::Method(handle) => write!(f, "method {handle}"),
        }
    }
}

// ── Structural object facets ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmutableFacet {
    pub reason: Option<String>,
}

impl ImmutableFacet {
    pub const DEFAULT_REASON: &'static str = "Immutable";

    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(Self::DEFAULT_REASON)
    }
}

impl fmt::Display for ImmutableFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "immutable ({})", self.reason())
    }
}

/// Instances form a small fixed set, so references can be chosen from a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedFacet;

impl fmt::Display for BoundedFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bounded")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatureFacet {
    pub kind: ClassKind,
}

impl fmt::Display for NatureFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Marks a mixin class and the member it contributes to its mixee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinFacet {
    pub mixee: String,
    pub member: String,
}

impl fmt::Display for MixinFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contributes '{}' to {}", self.member, self.mixee)
    }
}

/// Navigates from an object to its parent through a `@Parent` property.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigableParentFacet {
    pub accessor: MethodHandle,
}

impl NavigableParentFacet {
    /// Parent of `obj`; a failing or non-object accessor yields `None`.
    pub fn parent(&self, obj: &DomainObject) -> Option<Arc<DomainObject>> {
        match recover("navigable parent", self.accessor.invoke(obj, &[]))? {
            Value::Object(parent) => Some(parent),
            _ => None,
        }
    }
}

impl fmt::Display for NavigableParentFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "via {}", self.accessor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{InvocationError, MethodSignature};
    use crate::domain::value_objects::TypeRef;

    fn handle<F>(name: &str, body: F) -> MethodHandle
    where
        F: Fn(&DomainObject, &[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        MethodHandle::new("Customer", MethodSignature::new(name, vec![]), Some(Arc::new(body)))
    }

    fn field_reader(field: &'static str) -> MethodHandle {
        handle(field, move |obj, _| Ok(obj.field(field).cloned().unwrap_or(Value::Null)))
    }

    #[test]
    fn annotated_title_joins_components_and_skips_nulls() {
        let facet = TitleFacet::Annotated(vec![
            TitleComponent {
                accessor: field_reader("lastName"),
                sequence: DeweyOrder::parse("1").unwrap(),
                prepend: String::new(),
                append: ",".into(),
            },
            TitleComponent {
                accessor: field_reader("middleName"),
                sequence: DeweyOrder::parse("1.5").unwrap(),
                prepend: " ".into(),
                append: String::new(),
            },
            TitleComponent {
                accessor: field_reader("firstName"),
                sequence: DeweyOrder::parse("2").unwrap(),
                prepend: " ".into(),
                append: String::new(),
            },
        ]);
        let obj = DomainObject::new("Customer", "1")
            .with_field("firstName", "Ada")
            .with_field("lastName", "Lovelace");

        assert_eq!(facet.title(&obj), Some("Lovelace, Ada".into()));
    }

    #[test]
    fn empty_title_is_none() {
        let facet = TitleFacet::Method(handle("title", |_, _| Ok(Value::from("   "))));
        assert_eq!(facet.title(&DomainObject::new("Customer", "1")), None);
    }

    #[test]
    fn throwing_icon_name_degrades_to_none() {
        let facet = IconFacet::Method(handle("iconName", |_, _| {
            Err(InvocationError::Failed {
                method: "iconName".into(),
                message: "boom".into(),
            })
        }));
        assert_eq!(facet.icon_name(&DomainObject::new("Customer", "1")), None);

        let panicking = IconFacet::Method(handle("iconName", |_, _| panic!("boom")));
        assert_eq!(panicking.icon_name(&DomainObject::new("Customer", "1")), None);
    }

    #[test]
    fn computed_name_needs_an_object() {
        let facet = NamedFacet::Method(handle("namedFoo", |_, _| Ok(Value::from("Foo"))));
        assert_eq!(facet.name(None), None);
        assert_eq!(facet.name(Some(&DomainObject::new("Customer", "1"))), Some("Foo".into()));
        assert_eq!(facet.literal(), None);
    }

    #[test]
    fn navigable_parent_ignores_non_objects() {
        let facet = NavigableParentFacet {
            accessor: handle("getParent", |_, _| Ok(Value::from("not an object"))),
        };
        assert!(facet.parent(&DomainObject::new("Order", "1")).is_none());

        let facet = NavigableParentFacet {
            accessor: handle("getParent", |_, _| Ok(Value::from(DomainObject::new("Customer", "7")))),
        };
        let parent = facet.parent(&DomainObject::new("Order", "1")).unwrap();
        assert_eq!(parent.identity(), "Customer:7");
    }

    #[test]
    fn handles_with_same_signature_are_semantically_equal() {
        let a = TitleFacet::Method(handle("title", |_, _| Ok(Value::from("a"))));
        let b = TitleFacet::Method(MethodHandle::new(
            "Customer",
            MethodSignature::new("title", Vec::<TypeRef>::new()),
            None,
        ));
        assert_eq!(a, b);
    }
}
