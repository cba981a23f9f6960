//! Runtime values and bound callables.
//!
//! Support methods (`title()`, `iconName()`, `hideFoo()`, ...) are user code.
//! The metamodel never calls them directly: each one is wrapped in a
//! [`MethodHandle`] that returns `Result<Value, InvocationError>` and turns a
//! panic inside the callable into an error, so a facet can always degrade to
//! "no value" instead of crashing its caller.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use thiserror::Error;

use super::class::MethodSignature;

/// A runtime value passed to or returned from a support method.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Text(String),
    Object(Arc<DomainObject>),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<DomainObject>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Elements of a list; a scalar is treated as a one-element list and
    /// `Null` as an empty one.
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Self::List(items) => items,
            Self::Null => Vec::new(),
            other => vec![other],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Text(text) => f.write_str(text),
            Self::Object(obj) => write!(f, "{}", obj.identity()),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<DomainObject> for Value {
    fn from(value: DomainObject) -> Self {
        Self::Object(Arc::new(value))
    }
}

/// An instance of a domain class: its class name, an identity and its state.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainObject {
    class_name: String,
    id: String,
    fields: BTreeMap<String, Value>,
}

impl DomainObject {
    pub fn new(class_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// `Class:id`, unique per object.
    pub fn identity(&self) -> String {
        format!("{}:{}", self.class_name, self.id)
    }
}

/// Failure of a support-method invocation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvocationError {
    #[error("{method} failed: {message}")]
    Failed { method: String, message: String },

    #[error("{method} panicked: {message}")]
    Panicked { method: String, message: String },

    #[error("{method} expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("{method} has no implementation bound")]
    NotBound { method: String },

    #[error("{method} returned {actual}, expected {expected}")]
    UnexpectedReturn {
        method: String,
        expected: &'static str,
        actual: String,
    },
}

/// The body of a support method.
pub type Callable = dyn Fn(&DomainObject, &[Value]) -> Result<Value, InvocationError> + Send + Sync;

/// A resolved method bound to a callable body.
///
/// Two handles are equal when they name the same method of the same class;
/// the callable itself never takes part in comparisons.
#[derive(Clone)]
pub struct MethodHandle {
    declaring_class: String,
    signature: MethodSignature,
    body: Option<Arc<Callable>>,
}

impl MethodHandle {
    pub fn new(
        declaring_class: impl Into<String>,
        signature: MethodSignature,
        body: Option<Arc<Callable>>,
    ) -> Self {
        Self {
            declaring_class: declaring_class.into(),
            signature,
            body,
        }
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    /// Invoke the bound body against `target`.
    ///
    /// Never panics: a panicking body is reported as
    /// [`InvocationError::Panicked`].
    pub fn invoke(&self, target: &DomainObject, args: &[Value]) -> Result<Value, InvocationError> {
        let method = self.to_string();

        let expected = self.signature.params.len();
        if args.len() != expected {
            return Err(InvocationError::ArityMismatch {
                method,
                expected,
                actual: args.len(),
            });
        }

        let Some(body) = &self.body else {
            return Err(InvocationError::NotBound { method });
        };

        catch_unwind(AssertUnwindSafe(|| body(target, args))).unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(InvocationError::Panicked { method, message })
        })
    }

    /// Invoke and expect a text (or null) result.
    pub fn invoke_text(
        &self,
        target: &DomainObject,
        args: &[Value],
    ) -> Result<Option<String>, InvocationError> {
        match self.invoke(target, args)? {
            Value::Null => Ok(None),
            Value::Text(text) => Ok(Some(text)),
            other => Err(InvocationError::UnexpectedReturn {
                method: self.to_string(),
                expected: "string",
                actual: other.to_string(),
            }),
        }
    }

    /// Invoke and expect a boolean result; null counts as `false`.
    pub fn invoke_bool(&self, target: &DomainObject, args: &[Value]) -> Result<bool, InvocationError> {
        match self.invoke(target, args)? {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(b),
            other => Err(InvocationError::UnexpectedReturn {
                method: self.to_string(),
                expected: "boolean",
                actual: other.to_string(),
            }),
        }
    }
}

impl PartialEq for MethodHandle {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_class == other.declaring_class && self.signature == other.signature
    }
}

impl fmt::Debug for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandle")
            .field("method", &self.to_string())
            .field("bound", &self.body.is_some())
            .finish()
    }
}

impl fmt::Display for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.declaring_class, self.signature)
    }
}
