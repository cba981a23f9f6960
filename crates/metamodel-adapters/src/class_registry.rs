//! In-memory class registry.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use metamodel_core::{
    application::{ApplicationError, ports::ClassSource},
    domain::ClassDescriptor,
    error::{MetamodelError, MetamodelResult},
};
use tracing::debug;

use crate::builtin_classes;

/// Thread-safe in-memory [`ClassSource`].
///
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct InMemoryClassRegistry {
    inner: Arc<RwLock<BTreeMap<String, ClassDescriptor>>>,
}

impl InMemoryClassRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the demo domain.
    pub fn with_builtin() -> MetamodelResult<Self> {
        let registry = Self::new();
        registry.register_all(builtin_classes::all_classes())?;
        Ok(registry)
    }

    /// Add or replace a class after checking it is well-formed.
    pub fn register(&self, class: ClassDescriptor) -> MetamodelResult<()> {
        class.validate().map_err(MetamodelError::Domain)?;

        let mut inner = self.inner.write().map_err(|_| ApplicationError::CacheLockError)?;
        if inner.insert(class.name.clone(), class).is_some() {
            debug!("replaced an already registered class");
        }
        Ok(())
    }

    pub fn register_all(&self, classes: impl IntoIterator<Item = ClassDescriptor>) -> MetamodelResult<()> {
        for class in classes {
            self.register(class)?;
        }
        Ok(())
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every class.
    pub fn clear(&self) -> MetamodelResult<()> {
        let mut inner = self.inner.write().map_err(|_| ApplicationError::CacheLockError)?;
        inner.clear();
        Ok(())
    }
}

impl ClassSource for InMemoryClassRegistry {
    fn class(&self, name: &str) -> MetamodelResult<Option<ClassDescriptor>> {
        let inner = self.inner.read().map_err(|_| ApplicationError::CacheLockError)?;
        Ok(inner.get(name).cloned())
    }

    fn class_names(&self) -> MetamodelResult<Vec<String>> {
        let inner = self.inner.read().map_err(|_| ApplicationError::CacheLockError)?;
        Ok(inner.keys().cloned().collect())
    }

    fn mixins_for(&self, mixee: &str) -> MetamodelResult<Vec<String>> {
        let inner = self.inner.read().map_err(|_| ApplicationError::CacheLockError)?;
        // BTreeMap keys are already sorted
        Ok(inner
            .values()
            .filter(|class| class.mixee() == Some(mixee))
            .map(|class| class.name.clone())
            .collect())
    }
}
