//! Declarative metadata attached to classes, methods, fields and parameters.
//!
//! Annotations are plain data: a name plus typed attributes. Facet factories
//! read them; nothing else interprets them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Well-known annotation names read by the default programming model.
pub mod names {
    pub const ACTION: &str = "Action";
    pub const ACTION_LAYOUT: &str = "ActionLayout";
    pub const COLLECTION: &str = "Collection";
    pub const CSS_CLASS: &str = "CssClass";
    pub const DESCRIBED_AS: &str = "DescribedAs";
    pub const DISABLED: &str = "Disabled";
    pub const DOMAIN_OBJECT: &str = "DomainObject";
    pub const DOMAIN_OBJECT_LAYOUT: &str = "DomainObjectLayout";
    pub const HIDDEN: &str = "Hidden";
    pub const MANDATORY: &str = "Mandatory";
    pub const MEMBER_ORDER: &str = "MemberOrder";
    pub const MIN_LENGTH: &str = "MinLength";
    pub const MIXIN: &str = "Mixin";
    pub const NAMED: &str = "Named";
    pub const OPTIONAL: &str = "Optional";
    pub const PARAMETER: &str = "Parameter";
    pub const PARAMETER_LAYOUT: &str = "ParameterLayout";
    pub const PARENT: &str = "Parent";
    pub const PLURAL: &str = "Plural";
    pub const PROGRAMMATIC: &str = "Programmatic";
    pub const PROPERTY: &str = "Property";
    pub const PROPERTY_LAYOUT: &str = "PropertyLayout";
    pub const TITLE: &str = "Title";
}

/// A single annotation attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// An annotation: `@Property(maxLength = 30, editing = "disabled")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Fluent attribute setter for builder chains.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Shorthand for the conventional `value` attribute.
    pub fn value(&self) -> Option<&str> {
        self.text("value")
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(AttrValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Integer attribute; numeric strings are accepted too.
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.attributes.get(key) {
            Some(AttrValue::Int(n)) => Some(*n),
            Some(AttrValue::Text(text)) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.attributes.get(key) {
            Some(AttrValue::Bool(b)) => Some(*b),
            Some(AttrValue::Text(text)) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }
}

/// The annotations on one element, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.0.push(annotation);
    }

    /// First annotation with the given name.
    pub fn find(&self, name: &str) -> Option<&Annotation> {
        self.0.iter().find(|a| a.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Annotation>> for Annotations {
    fn from(annotations: Vec<Annotation>) -> Self {
        Self(annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_attribute_access() {
        let a = Annotation::new(names::PROPERTY)
            .with("maxLength", 30)
            .with("editing", "disabled")
            .with("optional", true);

        assert_eq!(a.int("maxLength"), Some(30));
        assert_eq!(a.text("editing"), Some("disabled"));
        assert_eq!(a.bool("optional"), Some(true));
        assert_eq!(a.text("maxLength"), None);
    }

    #[test]
    fn numeric_strings_are_ints() {
        let a = Annotation::new(names::PROPERTY).with("maxLength", "12");
        assert_eq!(a.int("maxLength"), Some(12));
    }

    #[test]
    fn find_returns_first_match() {
        let annotations: Annotations = vec![
            Annotation::new(names::NAMED).with("value", "First"),
            Annotation::new(names::NAMED).with("value", "Second"),
        ]
        .into();

        assert_eq!(annotations.find(names::NAMED).unwrap().value(), Some("First"));
        assert!(!annotations.has(names::TITLE));
    }
}
