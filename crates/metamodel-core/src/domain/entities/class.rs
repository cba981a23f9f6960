//! Class descriptors: the structural input to introspection.
//!
//! A [`ClassDescriptor`] is what a reflective runtime would report about a
//! class: its superclass, annotations, fields and methods. Each method may
//! carry a bound body so facets built from it can be invoked later.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::domain::entities::annotation::{Annotation, Annotations};
use crate::domain::entities::invocation::{Callable, DomainObject, InvocationError, MethodHandle, Value};
use crate::domain::error::DomainError;
use crate::domain::identifier::{Identifier, is_valid_class_name, is_valid_java_name};
use crate::domain::value_objects::TypeRef;

/// Name of the implicit root class every class inherits from.
pub const ROOT_CLASS_NAME: &str = "java.lang.Object";

// ── MethodSignature ──────────────────────────────────────────────────────────

/// Name plus parameter types: the identity of a method within a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<TypeRef>,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, params: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn param_type_names(&self) -> Vec<String> {
        self.params.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

// ── Visibility & ClassKind ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

impl std::str::FromStr for Visibility {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "protected" => Ok(Self::Protected),
            "private" => Ok(Self::Private),
            other => Err(DomainError::InvalidValue {
                what: "visibility",
                value: other.to_string(),
            }),
        }
    }
}

/// What sort of domain type a class is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ClassKind {
    #[default]
    Entity,
    ViewModel,
    Value,
    Abstract,
    /// Contributes a single member to `mixee`.
    Mixin { mixee: String },
}

impl ClassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::ViewModel => "view-model",
            Self::Value => "value",
            Self::Abstract => "abstract",
            Self::Mixin { .. } => "mixin",
        }
    }

    /// Parse a non-mixin kind (`entity`, `view_model`, `value`, `abstract`).
    pub fn parse_nature(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "entity" | "jpa_entity" | "jdo_entity" => Ok(Self::Entity),
            "view_model" | "viewmodel" => Ok(Self::ViewModel),
            "value" => Ok(Self::Value),
            "abstract" => Ok(Self::Abstract),
            other => Err(DomainError::InvalidValue {
                what: "nature",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mixin { mixee } => write!(f, "mixin of {mixee}"),
            other => f.write_str(other.as_str()),
        }
    }
}

// ── Fields & parameters ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeRef,
    pub annotations: Annotations,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Annotations::new(),
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A method parameter.
///
/// `name` is debug metadata: it may be missing, or a synthetic placeholder
/// such as `arg0` when the class was compiled without parameter names.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    pub name: Option<String>,
    pub ty: TypeRef,
    pub annotations: Annotations,
}

impl ParamDescriptor {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            name: None,
            ty,
            annotations: Annotations::new(),
        }
    }

    pub fn named(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(ty)
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

// ── MethodDescriptor ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub params: Vec<ParamDescriptor>,
    pub return_type: TypeRef,
    pub annotations: Annotations,
    pub visibility: Visibility,
    pub is_static: bool,
    /// Class that declares the method; set when the method is added to a
    /// [`ClassDescriptor`].
    pub declared_in: String,
    body: Option<Arc<Callable>>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type,
            annotations: Annotations::new(),
            visibility: Visibility::Public,
            is_static: false,
            declared_in: String::new(),
            body: None,
        }
    }

    /// A getter `get<Name>()` / `is<Name>()` returning `field` of the target.
    pub fn getter(name: impl Into<String>, return_type: TypeRef, field: impl Into<String>) -> Self {
        Self::new(name, return_type).returns_field(field)
    }

    pub fn param(mut self, ty: TypeRef) -> Self {
        self.params.push(ParamDescriptor::new(ty));
        self
    }

    pub fn named_param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(ParamDescriptor::named(name, ty));
        self
    }

    pub fn param_with(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Bind the method body.
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&DomainObject, &[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    /// Body returning a constant.
    pub fn returns(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.body(move |_, _| Ok(value.clone()))
    }

    /// Body returning a field of the target, or null when it is unset.
    pub fn returns_field(self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.body(move |obj, _| Ok(obj.field(&field).cloned().unwrap_or(Value::Null)))
    }

    /// Body that always fails with `message`.
    pub fn throws(self, message: impl Into<String>) -> Self {
        let message = message.into();
        let method = self.name.clone();
        self.body(move |_, _| {
            Err(InvocationError::Failed {
                method: method.clone(),
                message: message.clone(),
            })
        })
    }

    pub fn signature(&self) -> MethodSignature {
        MethodSignature::new(
            self.name.clone(),
            self.params.iter().map(|p| p.ty.clone()).collect(),
        )
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn is_bound(&self) -> bool {
        self.body.is_some()
    }

    /// Bound callable for this method.
    pub fn handle(&self) -> MethodHandle {
        MethodHandle::new(self.declared_in.clone(), self.signature(), self.body.clone())
    }

    /// Identifier of this method as an action of `class_name`.
    pub fn action_identifier(&self, class_name: &str) -> Identifier {
        Identifier::action(
            class_name,
            self.name.clone(),
            self.params.iter().map(|p| p.ty.to_string()),
        )
    }
}

impl PartialEq for MethodDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.params == other.params
            && self.return_type == other.return_type
            && self.annotations == other.annotations
            && self.visibility == other.visibility
            && self.is_static == other.is_static
            && self.declared_in == other.declared_in
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("signature", &self.signature().to_string())
            .field("return_type", &self.return_type)
            .field("annotations", &self.annotations)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .field("declared_in", &self.declared_in)
            .field("bound", &self.body.is_some())
            .finish()
    }
}

// ── ClassDescriptor ──────────────────────────────────────────────────────────

/// Structural description of one class.
///
/// `superclass: None` means the class extends [`ROOT_CLASS_NAME`] directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    pub name: String,
    pub superclass: Option<String>,
    pub kind: ClassKind,
    pub annotations: Annotations,
    pub fields: Vec<FieldDescriptor>,
    pub methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            kind: ClassKind::Entity,
            annotations: Annotations::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Mark this class as a mixin contributing to `mixee`.
    pub fn mixin_for(self, mixee: impl Into<String>) -> Self {
        self.kind(ClassKind::Mixin {
            mixee: mixee.into(),
        })
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, mut method: MethodDescriptor) -> Self {
        method.declared_in = self.name.clone();
        self.methods.push(method);
        self
    }

    pub fn identifier(&self) -> Identifier {
        Identifier::class(self.name.clone())
    }

    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(_, simple)| simple)
    }

    pub fn is_root(&self) -> bool {
        self.name == ROOT_CLASS_NAME
    }

    /// Direct superclass, with the implicit root filled in.
    pub fn effective_superclass(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        Some(self.superclass.as_deref().unwrap_or(ROOT_CLASS_NAME))
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn mixee(&self) -> Option<&str> {
        match &self.kind {
            ClassKind::Mixin { mixee } => Some(mixee),
            _ => None,
        }
    }

    /// Member name a mixin contributes: the part of the simple class name
    /// after its last underscore (`Customer_placeOrder` → `placeOrder`).
    pub fn mixin_member_name(&self) -> Option<&str> {
        self.mixee()?;
        self.simple_name()
            .rsplit_once('_')
            .map(|(_, member)| member)
            .filter(|member| !member.is_empty())
    }

    /// Structural checks that must pass before the class is introspected.
    pub fn validate(&self) -> Result<(), DomainError> {
        let malformed = |reason: String| DomainError::MalformedClass {
            class: self.name.clone(),
            reason,
        };

        if !is_valid_class_name(&self.name) {
            return Err(malformed("class name is not a dotted name".into()));
        }
        if let Some(superclass) = &self.superclass {
            if !is_valid_class_name(superclass) {
                return Err(malformed(format!("superclass '{superclass}' is not a valid name")));
            }
            if superclass == &self.name {
                return Err(DomainError::CyclicHierarchy {
                    chain: format!("{} -> {}", self.name, self.name),
                });
            }
        }
        if self.mixee().is_some() && self.mixin_member_name().is_none() {
            return Err(malformed(
                "mixin class names must end in _<memberName>".into(),
            ));
        }

        let mut seen = BTreeSet::new();
        for method in &self.methods {
            if !is_valid_java_name(&method.name) {
                return Err(malformed(format!("'{}' is not a valid method name", method.name)));
            }
            let signature = method.signature();
            if !seen.insert(signature.clone()) {
                return Err(DomainError::DuplicateMethod {
                    class: self.name.clone(),
                    signature: signature.to_string(),
                });
            }
        }

        Ok(())
    }

    /// The implicit root class.
    pub fn object_root() -> Self {
        Self::new(ROOT_CLASS_NAME)
            .kind(ClassKind::Abstract)
            .method(
                MethodDescriptor::new("toString", TypeRef::Text)
                    .body(|obj, _| Ok(Value::from(obj.identity()))),
            )
            .method(
                MethodDescriptor::new("equals", TypeRef::Boolean)
                    .param(TypeRef::class(ROOT_CLASS_NAME))
                    .body(|obj, args| {
                        let same = args
                            .first()
                            .and_then(Value::as_object)
                            .is_some_and(|other| other.identity() == obj.identity());
                        Ok(Value::Bool(same))
                    }),
            )
            .method(MethodDescriptor::new("hashCode", TypeRef::Int).body(|obj, _| {
                let hash = obj
                    .identity()
                    .bytes()
                    .fold(17i64, |acc, b| acc.wrapping_mul(31).wrapping_add(i64::from(b)));
                Ok(Value::Int(hash))
            }))
            .method(
                MethodDescriptor::new("getClass", TypeRef::Text)
                    .body(|obj, _| Ok(Value::from(obj.class_name()))),
            )
    }
}
