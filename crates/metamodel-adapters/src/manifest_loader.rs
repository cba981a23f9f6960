//! TOML class manifests.
//!
//! Discovers `*.toml` files under a directory tree and turns their
//! `[[class]]` tables into [`ClassDescriptor`]s. A manifest may declare any
//! number of classes.
//!
//! # Manifest format
//!
//! ```toml
//! [[class]]
//! name       = "com.acme.Customer"
//! extends    = "com.acme.Party"     # optional
//! kind       = "entity"             # entity | view_model | value | abstract
//! mixin_for  = "com.acme.Party"     # optional; makes the class a mixin
//! annotations = [{ name = "DomainObjectLayout", attributes = { plural = "Clients" } }]
//!
//! [[class.field]]
//! name = "name"
//! type = "string"
//!
//! [[class.method]]
//! name          = "getName"
//! type          = "string"          # return type, defaults to void
//! returns_field = "name"            # or: returns = <constant>, throws = "message"
//! params        = [{ name = "value", type = "string" }]
//! annotations   = [{ name = "Property", attributes = { maxLength = 40 } }]
//! visibility    = "public"          # public | protected | private
//! static        = false
//! ```
//!
//! A file that cannot be read, parsed or turned into valid classes is
//! skipped with a `WARN` log; it never prevents other files from loading.

use std::{
    fs,
    path::{Path, PathBuf},
};

use metamodel_core::{
    application::{ApplicationError, ports::ClassSource},
    domain::{
        Annotation, ClassDescriptor, ClassKind, FieldDescriptor, MethodDescriptor, ParamDescriptor,
        TypeRef, Value, Visibility,
    },
    error::{MetamodelError, MetamodelResult},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::class_registry::InMemoryClassRegistry;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("class '{class}' in '{}' is invalid: {reason}", path.display())]
    InvalidClass {
        path: PathBuf,
        class: String,
        reason: String,
    },
}

impl From<ManifestError> for MetamodelError {
    fn from(err: ManifestError) -> Self {
        ApplicationError::SourceUnavailable {
            reason: err.to_string(),
        }
        .into()
    }
}

// ── Manifest types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(default, rename = "class")]
    classes: Vec<ClassEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassEntry {
    name: String,
    extends: Option<String>,
    kind: Option<String>,
    mixin_for: Option<String>,
    #[serde(default)]
    annotations: Vec<Annotation>,
    #[serde(default, rename = "field")]
    fields: Vec<FieldEntry>,
    #[serde(default, rename = "method")]
    methods: Vec<MethodEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldEntry {
    name: String,
    #[serde(rename = "type")]
    ty: TypeRef,
    #[serde(default)]
    annotations: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamEntry {
    name: Option<String>,
    #[serde(rename = "type")]
    ty: TypeRef,
    #[serde(default)]
    annotations: Vec<Annotation>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MethodEntry {
    name: String,
    #[serde(rename = "type", default = "void")]
    ty: TypeRef,
    #[serde(default)]
    params: Vec<ParamEntry>,
    #[serde(default)]
    annotations: Vec<Annotation>,
    visibility: Option<String>,
    #[serde(default, rename = "static")]
    is_static: bool,
    returns: Option<toml::Value>,
    returns_field: Option<String>,
    throws: Option<String>,
}

fn void() -> TypeRef {
    TypeRef::Void
}

// ── Conversion ────────────────────────────────────────────────────────────────

fn constant(value: toml::Value) -> Result<Value, String> {
    match value {
        toml::Value::String(s) => Ok(Value::Text(s)),
        toml::Value::Integer(n) => Ok(Value::Int(n)),
        toml::Value::Float(f) => Ok(Value::Decimal(f)),
        toml::Value::Boolean(b) => Ok(Value::Bool(b)),
        toml::Value::Array(items) => items
            .into_iter()
            .map(constant)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => Err(format!("unsupported constant {other}")),
    }
}

impl MethodEntry {
    fn into_descriptor(self) -> Result<MethodDescriptor, String> {
        let mut method = MethodDescriptor::new(self.name, self.ty);
        for param in self.params {
            let mut descriptor = match param.name {
                Some(name) => ParamDescriptor::named(name, param.ty),
                None => ParamDescriptor::new(param.ty),
            };
            for annotation in param.annotations {
                descriptor = descriptor.annotate(annotation);
            }
            method = method.param_with(descriptor);
        }
        for annotation in self.annotations {
            method = method.annotate(annotation);
        }
        if let Some(visibility) = self.visibility {
            let visibility: Visibility = visibility.parse().map_err(|e| format!("{e}"))?;
            method = method.visibility(visibility);
        }
        if self.is_static {
            method = method.static_method();
        }

        match (self.returns, self.returns_field, self.throws) {
            (None, None, None) => Ok(method),
            (Some(value), None, None) => Ok(method.returns(constant(value)?)),
            (None, Some(field), None) => Ok(method.returns_field(field)),
            (None, None, Some(message)) => Ok(method.throws(message)),
            _ => Err(format!(
                "method '{}' declares more than one of returns, returns_field and throws",
                method.name
            )),
        }
    }
}

impl ClassEntry {
    fn into_descriptor(self) -> Result<ClassDescriptor, String> {
        let mut class = ClassDescriptor::new(self.name);
        if let Some(superclass) = self.extends {
            class = class.extends(superclass);
        }
        match (self.kind, self.mixin_for) {
            (Some(_), Some(_)) => return Err("a mixin cannot also declare a kind".into()),
            (Some(kind), None) => class = class.kind(ClassKind::parse_nature(&kind).map_err(|e| e.to_string())?),
            (None, Some(mixee)) => class = class.mixin_for(mixee),
            (None, None) => {}
        }
        for annotation in self.annotations {
            class = class.annotate(annotation);
        }
        for field in self.fields {
            let mut descriptor = FieldDescriptor::new(field.name, field.ty);
            for annotation in field.annotations {
                descriptor = descriptor.annotate(annotation);
            }
            class = class.field(descriptor);
        }
        for method in self.methods {
            class = class.method(method.into_descriptor()?);
        }
        class.validate().map_err(|e| e.to_string())?;
        Ok(class)
    }
}

/// Parse the classes of one manifest. `path` is only used in errors.
pub fn parse_manifest(raw: &str, path: &Path) -> Result<Vec<ClassDescriptor>, ManifestError> {
    let manifest: Manifest = toml::from_str(raw).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    manifest
        .classes
        .into_iter()
        .map(|entry| {
            let class = entry.name.clone();
            entry.into_descriptor().map_err(|reason| ManifestError::InvalidClass {
                path: path.to_path_buf(),
                class,
                reason,
            })
        })
        .collect()
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// [`ClassSource`] backed by a directory of class manifests.
///
/// Manifests are read when the loader is opened and again on
/// [`reload`](Self::reload); lookups in between are served from memory.
pub struct ManifestClassLoader {
    dir: PathBuf,
    registry: InMemoryClassRegistry,
}

impl ManifestClassLoader {
    /// Create a loader pointed at `dir` without reading anything yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            registry: InMemoryClassRegistry::new(),
        }
    }

    /// Create a loader and read every manifest under `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> MetamodelResult<Self> {
        let loader = Self::new(dir);
        loader.reload()?;
        Ok(loader)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Classes loaded so far.
    pub fn registry(&self) -> &InMemoryClassRegistry {
        &self.registry
    }

    /// Parse every manifest under the directory, in path order.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::DirectoryNotFound`] when the directory is
    /// missing. Individual manifests that fail to load are skipped.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn load_all(&self) -> Result<Vec<ClassDescriptor>, ManifestError> {
        if !self.dir.is_dir() {
            return Err(ManifestError::DirectoryNotFound(self.dir.clone()));
        }

        let mut classes = Vec::new();
        for entry in WalkDir::new(&self.dir).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "toml") {
                continue;
            }

            match Self::load_file(path) {
                Ok(loaded) => {
                    debug!(file = %path.display(), count = loaded.len(), "loaded manifest");
                    classes.extend(loaded);
                }
                Err(e) => {
                    // One bad manifest must not block the others.
                    warn!(file = %path.display(), error = %e, "skipping class manifest");
                }
            }
        }
        Ok(classes)
    }

    /// Parse a single manifest file.
    pub fn load_file(path: &Path) -> Result<Vec<ClassDescriptor>, ManifestError> {
        let raw = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_manifest(&raw, path)
    }

    /// Re-read the directory, replacing everything loaded before. Returns
    /// the number of classes now available.
    pub fn reload(&self) -> MetamodelResult<usize> {
        let classes = self.load_all()?;
        self.registry.clear()?;
        for class in classes {
            if self.registry.class(&class.name)?.is_some() {
                warn!(class = %class.name, "class declared in more than one manifest, keeping the last");
            }
            self.registry.register(class)?;
        }
        info!(count = self.registry.len(), dir = %self.dir.display(), "class manifests loaded");
        Ok(self.registry.len())
    }
}

impl ClassSource for ManifestClassLoader {
    fn class(&self, name: &str) -> MetamodelResult<Option<ClassDescriptor>> {
        self.registry.class(name)
    }

    fn class_names(&self) -> MetamodelResult<Vec<String>> {
        self.registry.class_names()
    }

    fn mixins_for(&self, mixee: &str) -> MetamodelResult<Vec<String>> {
        self.registry.mixins_for(mixee)
    }
}
