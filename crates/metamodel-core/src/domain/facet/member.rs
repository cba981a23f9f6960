//! Member-level facet payloads: properties, collections, actions and
//! action parameters.

use std::fmt;

use regex::Regex;

use crate::domain::entities::{DomainObject, InvocationError, MethodHandle, Value};
use crate::domain::facet::recover;
use crate::domain::value_objects::{DeweyOrder, SemanticsOf, TypeRef, Where};

// ── Accessors & mutators ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccessorFacet {
    pub accessor: MethodHandle,
    pub ty: TypeRef,
}

impl PropertyAccessorFacet {
    /// Current value; `None` if unset or the getter fails.
    pub fn get(&self, obj: &DomainObject) -> Option<Value> {
        recover("property accessor", self.accessor.invoke(obj, &[])).filter(|v| !v.is_null())
    }
}

impl fmt::Display for PropertyAccessorFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.accessor, self.ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertySetterFacet {
    /// A plain `set<Name>(value)`.
    Setter(MethodHandle),
    /// A `modify<Name>(value)` that replaces the setter.
    Modify(MethodHandle),
}

impl PropertySetterFacet {
    pub fn handle(&self) -> &MethodHandle {
        match self {
            Self::Setter(handle) | Self::Modify(handle) => handle,
        }
    }

    pub fn set(&self, obj: &DomainObject, value: Value) -> Result<Value, InvocationError> {
        self.handle().invoke(obj, &[value])
    }
}

impl fmt::Display for PropertySetterFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setter(handle) => write!(f, "setter {handle}"),
            Self::Modify(handle) => write!(f, "modify {handle}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyClearFacet {
    pub handle: MethodHandle,
}

impl fmt::Display for PropertyClearFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clear {}", self.handle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionAccessorFacet {
    pub accessor: MethodHandle,
    pub ty: TypeRef,
}

impl CollectionAccessorFacet {
    pub fn get(&self, obj: &DomainObject) -> Vec<Value> {
        recover("collection accessor", self.accessor.invoke(obj, &[]))
            .map(Value::into_list)
            .unwrap_or_default()
    }
}

impl fmt::Display for CollectionAccessorFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.accessor, self.ty)
    }
}

/// Element type of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOfFacet {
    pub element: TypeRef,
}

impl fmt::Display for TypeOfFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.element)
    }
}

// ── Actions ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ActionInvocationFacet {
    pub handle: MethodHandle,
    pub return_type: TypeRef,
}

impl ActionInvocationFacet {
    /// Invoke the action. Unlike support methods, failures are returned.
    pub fn invoke(&self, obj: &DomainObject, args: &[Value]) -> Result<Value, InvocationError> {
        self.handle.invoke(obj, args)
    }
}

impl fmt::Display for ActionInvocationFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.handle, self.return_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSemanticsFacet {
    pub semantics: SemanticsOf,
}

impl fmt::Display for ActionSemanticsFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.semantics)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberOrderFacet {
    pub sequence: DeweyOrder,
    pub group: Option<String>,
}

impl fmt::Display for MemberOrderFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{} in '{group}'", self.sequence),
            None => write!(f, "{}", self.sequence),
        }
    }
}

// ── Visibility & usability ───────────────────────────────────────────────────

/// Statically hidden, e.g. `@Hidden(where = "all_tables")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenFacet {
    pub hidden_in: Where,
}

impl HiddenFacet {
    pub fn hides(&self, context: Where) -> bool {
        self.hidden_in.includes(context)
    }
}

impl fmt::Display for HiddenFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hidden {}", self.hidden_in)
    }
}

/// A `hide<Member>()` method.
#[derive(Debug, Clone, PartialEq)]
pub struct HideForContextFacet {
    pub handle: MethodHandle,
}

impl HideForContextFacet {
    /// A failing method leaves the member visible.
    pub fn hides(&self, obj: &DomainObject) -> bool {
        recover("hide", self.handle.invoke_bool(obj, &[])).unwrap_or(false)
    }
}

impl fmt::Display for HideForContextFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method {}", self.handle)
    }
}

/// Statically disabled, by annotation or because the object is immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisabledFacet {
    pub reason: Option<String>,
}

impl DisabledFacet {
    pub const DEFAULT_REASON: &'static str = "Disabled";

    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(Self::DEFAULT_REASON)
    }
}

impl fmt::Display for DisabledFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "disabled ({})", self.reason())
    }
}

/// A `disable<Member>()` method returning a reason or a flag.
#[derive(Debug, Clone, PartialEq)]
pub struct DisableForContextFacet {
    pub handle: MethodHandle,
}

impl DisableForContextFacet {
    /// Why the member is disabled for `obj`, if it is.
    pub fn disabled_reason(&self, obj: &DomainObject) -> Option<String> {
        match recover("disable", self.handle.invoke(obj, &[]))? {
            Value::Bool(true) => Some(DisabledFacet::DEFAULT_REASON.to_string()),
            Value::Text(reason) if !reason.trim().is_empty() => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for DisableForContextFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method {}", self.handle)
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

/// A `validate<Member>(...)` method, or an object's `validate()`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidateFacet {
    pub handle: MethodHandle,
}

impl ValidateFacet {
    /// Reason the proposed `args` are invalid, if any.
    pub fn invalid_reason(&self, obj: &DomainObject, args: &[Value]) -> Option<String> {
        recover("validate", self.handle.invoke_text(obj, args))
            .flatten()
            .filter(|reason| !reason.trim().is_empty())
    }
}

impl fmt::Display for ValidateFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method {}", self.handle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxLengthFacet {
    pub max: usize,
}

impl MaxLengthFacet {
    pub fn check(&self, proposed: &str) -> Option<String> {
        let len = proposed.chars().count();
        (len > self.max).then(|| format!("Too long ({len} > {})", self.max))
    }
}

impl fmt::Display for MaxLengthFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "max {}", self.max)
    }
}

/// Proposed text values must match `pattern` in full.
#[derive(Debug, Clone)]
pub struct RegExFacet {
    pub pattern: String,
    regex: Regex,
}

impl RegExFacet {
    pub fn new(pattern: impl Into<String>) -> Result<Self, regex::Error> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self { pattern, regex })
    }

    pub fn matches(&self, proposed: &str) -> bool {
        self.regex.is_match(proposed)
    }

    pub fn check(&self, proposed: &str) -> Option<String> {
        (!self.matches(proposed)).then(|| format!("Doesn't match pattern {}", self.pattern))
    }
}

impl PartialEq for RegExFacet {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl fmt::Display for RegExFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.pattern)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandatoryFacet {
    Required,
    Optional,
}

impl MandatoryFacet {
    pub const fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }
}

impl fmt::Display for MandatoryFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Required => "required",
            Self::Optional => "optional",
        })
    }
}

// ── Defaults, choices & autocomplete ─────────────────────────────────────────

/// A `default<Member>()` / `default<N><Action>()` method.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultFacet {
    pub handle: MethodHandle,
}

impl DefaultFacet {
    pub fn default_value(&self, obj: &DomainObject, args: &[Value]) -> Option<Value> {
        recover("default", self.handle.invoke(obj, args)).filter(|v| !v.is_null())
    }
}

impl fmt::Display for DefaultFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method {}", self.handle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChoicesFacet {
    /// A `choices<Member>()` / `choices<N><Action>()` method.
    Method(MethodHandle),
    /// The member's type is bounded; its instances are the choices. They
    /// are enumerated by the persistence layer, not by the metamodel.
    Bounded { class: String },
}

impl ChoicesFacet {
    pub fn choices(&self, obj: &DomainObject, args: &[Value]) -> Vec<Value> {
        match self {
            Self::Method(handle) => recover("choices", handle.invoke(obj, args))
                .map(Value::into_list)
                .unwrap_or_default(),
            Self::Bounded { .. } => Vec::new(),
        }
    }
}

impl fmt::Display for ChoicesFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(handle) => write!(f, "method {handle}"),
            Self::Bounded { class } => write!(f, "instances of bounded {class}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutoCompleteFacet {
    pub handle: MethodHandle,
    pub min_length: usize,
}

impl AutoCompleteFacet {
    pub const DEFAULT_MIN_LENGTH: usize = 1;

    /// Matches for `search`; empty until `min_length` characters are typed.
    pub fn auto_complete(&self, obj: &DomainObject, search: &str) -> Vec<Value> {
        if search.chars().count() < self.min_length {
            return Vec::new();
        }
        recover("autoComplete", self.handle.invoke(obj, &[Value::from(search)]))
            .map(Value::into_list)
            .unwrap_or_default()
    }
}

impl fmt::Display for AutoCompleteFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method {} (min {})", self.handle, self.min_length)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::entities::MethodSignature;

    fn handle<F>(name: &str, params: Vec<TypeRef>, body: F) -> MethodHandle
    where
        F: Fn(&DomainObject, &[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        MethodHandle::new("Customer", MethodSignature::new(name, params), Some(Arc::new(body)))
    }

    fn obj() -> DomainObject {
        DomainObject::new("Customer", "1")
    }

    #[test]
    fn disable_accepts_flags_and_reasons() {
        let flag = DisableForContextFacet {
            handle: handle("disableName", vec![], |_, _| Ok(Value::Bool(true))),
        };
        assert_eq!(flag.disabled_reason(&obj()), Some("Disabled".into()));

        let reason = DisableForContextFacet {
            handle: handle("disableName", vec![], |_, _| Ok(Value::from("Locked"))),
        };
        assert_eq!(reason.disabled_reason(&obj()), Some("Locked".into()));

        let enabled = DisableForContextFacet {
            handle: handle("disableName", vec![], |_, _| Ok(Value::Null)),
        };
        assert_eq!(enabled.disabled_reason(&obj()), None);
    }

    #[test]
    fn failing_hide_leaves_member_visible() {
        let facet = HideForContextFacet {
            handle: handle("hideName", vec![], |_, _| panic!("boom")),
        };
        assert!(!facet.hides(&obj()));
    }

    #[test]
    fn validate_passes_arguments() {
        let facet = ValidateFacet {
            handle: handle("validateName", vec![TypeRef::Text], |_, args| {
                let proposed = args[0].as_text().unwrap_or_default();
                Ok(if proposed.is_empty() {
                    Value::from("Required")
                } else {
                    Value::Null
                })
            }),
        };
        assert_eq!(facet.invalid_reason(&obj(), &[Value::from("")]), Some("Required".into()));
        assert_eq!(facet.invalid_reason(&obj(), &[Value::from("Ada")]), None);
    }

    #[test]
    fn regex_matches_whole_value_and_compares_by_pattern() {
        let facet = RegExFacet::new("[A-Z]{3}").unwrap();
        assert!(facet.matches("ABC"));
        assert!(!facet.matches("ABCD"));
        assert!(facet.check("abc").is_some());
        assert_eq!(facet, RegExFacet::new("[A-Z]{3}").unwrap());
        assert!(RegExFacet::new("(").is_err());
    }

    #[test]
    fn max_length_counts_characters() {
        let facet = MaxLengthFacet { max: 3 };
        assert_eq!(facet.check("äöü"), None);
        assert!(facet.check("abcd").is_some());
    }

    #[test]
    fn auto_complete_respects_min_length() {
        let facet = AutoCompleteFacet {
            handle: handle("autoCompleteName", vec![TypeRef::Text], |_, args| {
                Ok(Value::List(vec![args[0].clone()]))
            }),
            min_length: 2,
        };
        assert!(facet.auto_complete(&obj(), "a").is_empty());
        assert_eq!(facet.auto_complete(&obj(), "ab"), vec![Value::from("ab")]);
    }

    #[test]
    fn choices_from_method_flatten_lists() {
        let facet = ChoicesFacet::Method(handle("choicesName", vec![], |_, _| {
            Ok(Value::List(vec![Value::from("a"), Value::from("b")]))
        }));
        assert_eq!(facet.choices(&obj(), &[]).len(), 2);
        let bounded = ChoicesFacet::Bounded {
            class: "Country".into(),
        };
        assert!(bounded.choices(&obj(), &[]).is_empty());
    }

    #[test]
    fn hidden_respects_where() {
        let facet = HiddenFacet {
            hidden_in: Where::AllTables,
        };
        assert!(facet.hides(Where::StandaloneTables));
        assert!(!facet.hides(Where::ObjectForms));
    }
}
