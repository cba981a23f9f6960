//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `metamodel-adapters` crate provides implementations.

use crate::domain::ClassDescriptor;
use crate::error::MetamodelResult;

/// Port for discovering class descriptors.
///
/// Implemented by:
/// - `metamodel_adapters::InMemoryClassRegistry` (programmatic registration)
/// - `metamodel_adapters::ManifestClassLoader` (TOML class manifests)
///
/// ## Design Notes
///
/// - The implicit root class need not be provided; the loader supplies it
/// - Implementations must return the same descriptor for the same name
///   until they are explicitly reloaded
#[cfg_attr(test, mockall::automock)]
pub trait ClassSource: Send + Sync {
    /// Look up a class by fully qualified name.
    fn class(&self, name: &str) -> MetamodelResult<Option<ClassDescriptor>>;

    /// Names of every known class.
    fn class_names(&self) -> MetamodelResult<Vec<String>>;

    /// Mixin classes contributing to `mixee`, sorted by name.
    fn mixins_for(&self, mixee: &str) -> MetamodelResult<Vec<String>> {
        let mut mixins = Vec::new();
        for name in self.class_names()? {
            if let Some(class) = self.class(&name)? {
                if class.mixee() == Some(mixee) {
                    mixins.push(name);
                }
            }
        }
        mixins.sort();
        Ok(mixins)
    }
}
