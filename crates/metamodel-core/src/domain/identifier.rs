//! Identifiers for classes, members and action parameters.
//!
//! An [`Identifier`] is the lookup and diagnostic key used everywhere in the
//! metamodel. Its canonical text form is stable and round-trips losslessly:
//!
//! | Kind      | Canonical form                               |
//! |-----------|----------------------------------------------|
//! | Class     | `com.acme.Customer`                          |
//! | Member    | `com.acme.Customer#name`                     |
//! | Action    | `com.acme.Customer#findByName(java.lang.String)` |
//! | Parameter | `com.acme.Customer#findByName(java.lang.String)[0]` |
//!
//! Properties and collections share the member form; the feature type of the
//! holder carrying the identifier says which one it is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::DomainError;

/// What an [`Identifier`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Class,
    Member,
    Action,
    Parameter(usize),
}

/// Immutable value naming a class, a member of a class, or an action parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    class_name: String,
    member: Option<String>,
    params: Option<Vec<String>>,
    param_index: Option<usize>,
}

impl Identifier {
    /// Identifier of a class.
    pub fn class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            member: None,
            params: None,
            param_index: None,
        }
    }

    /// Identifier of a property or collection.
    pub fn member(class_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            member: Some(member.into()),
            params: None,
            param_index: None,
        }
    }

    /// Identifier of an action with its parameter type names.
    pub fn action<I, S>(class_name: impl Into<String>, action: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            class_name: class_name.into(),
            member: Some(action.into()),
            params: Some(params.into_iter().map(Into::into).collect()),
            param_index: None,
        }
    }

    /// Identifier of the `index`-th parameter of this action.
    ///
    /// # Panics
    /// Panics if `self` is not an action identifier.
    pub fn parameter(&self, index: usize) -> Self {
        assert!(
            self.params.is_some() && self.param_index.is_none(),
            "parameter identifiers can only be derived from action identifiers: {self}"
        );
        Self {
            param_index: Some(index),
            ..self.clone()
        }
    }

    /// Identifier of the class owning this identifier.
    pub fn class_identifier(&self) -> Self {
        Self::class(self.class_name.clone())
    }

    /// Parse the canonical string form.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let input = input.trim();
        let invalid = |reason: &str| DomainError::InvalidIdentifier {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(invalid("identifier is empty"));
        }

        let (class_part, rest) = match input.split_once('#') {
            Some((class, rest)) => (class.trim(), Some(rest.trim())),
            None => (input, None),
        };

        if !is_valid_class_name(class_part) {
            return Err(invalid("class name is not a dotted name"));
        }

        let Some(rest) = rest else {
            return Ok(Self::class(class_part));
        };

        let Some(open) = rest.find('(') else {
            if !is_valid_java_name(rest) {
                return Err(invalid("member name is not a valid name"));
            }
            return Ok(Self::member(class_part, rest));
        };

        let member = rest[..open].trim();
        if !is_valid_java_name(member) {
            return Err(invalid("action name is not a valid name"));
        }

        let close = rest
            .rfind(')')
            .filter(|&close| close > open)
            .ok_or_else(|| invalid("unbalanced parentheses"))?;

        let params = split_params(&rest[open + 1..close]).ok_or_else(|| invalid("malformed parameter list"))?;

        let suffix = rest[close + 1..].trim();
        let param_index = if suffix.is_empty() {
            None
        } else {
            let index = suffix
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
                .and_then(|s| s.trim().parse::<usize>().ok())
                .ok_or_else(|| invalid("expected a parameter index like [0]"))?;
            if index >= params.len() {
                return Err(invalid("parameter index out of range"));
            }
            Some(index)
        };

        Ok(Self {
            class_name: class_part.to_string(),
            member: Some(member.to_string()),
            params: Some(params),
            param_index,
        })
    }

    /// The canonical string form; `Identifier::parse` inverts it.
    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }

    pub fn kind(&self) -> IdentifierKind {
        match (&self.member, &self.params, self.param_index) {
            (None, _, _) => IdentifierKind::Class,
            (Some(_), None, _) => IdentifierKind::Member,
            (Some(_), Some(_), None) => IdentifierKind::Action,
            (Some(_), Some(_), Some(index)) => IdentifierKind::Parameter(index),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Class name without its package prefix.
    pub fn simple_class_name(&self) -> &str {
        self.class_name
            .rsplit_once('.')
            .map_or(self.class_name.as_str(), |(_, simple)| simple)
    }

    pub fn member_name(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// Parameter type names; empty for non-action identifiers.
    pub fn param_types(&self) -> &[String] {
        self.params.as_deref().unwrap_or(&[])
    }

    pub fn param_index(&self) -> Option<usize> {
        self.param_index
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_name)?;
        if let Some(member) = &self.member {
            write!(f, "#{member}")?;
        }
        if let Some(params) = &self.params {
            write!(f, "({})", params.join(","))?;
        }
        if let Some(index) = self.param_index {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}

impl FromStr for Identifier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ── parsing helpers ───────────────────────────────────────────────────────────

/// A Java-style simple name: letter, `_` or `$`, followed by alphanumerics.
pub(crate) fn is_valid_java_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

pub(crate) fn is_valid_class_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_valid_java_name)
}

/// Split a parameter list on top-level commas, so `Map<K,V>` stays whole.
/// Whitespace inside type names is dropped; the canonical form has none.
fn split_params(inner: &str) -> Option<Vec<String>> {
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }

    let mut params = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();

    for c in inner.chars() {
        match c {
            '<' | '[' => {
                depth += 1;
                current.push(c);
            }
            '>' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
                current.push(c);
            }
            ',' if depth == 0 => {
                if current.is_empty() {
                    return None;
                }
                params.push(std::mem::take(&mut current));
            }
            c if c.is_whitespace() => {}
            c => current.push(c),
        }
    }

    if depth != 0 || current.is_empty() {
        return None;
    }
    params.push(current);
    Some(params)
}
