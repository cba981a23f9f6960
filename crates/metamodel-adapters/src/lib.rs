//! Infrastructure adapters for the metamodel.
//!
//! This crate implements the ports defined in `metamodel-core::application::ports`.
//! It contains all file-system access and the demo domain shipped with the CLI.

pub mod builtin_classes;
pub mod class_registry;
pub mod manifest_loader;

// Re-export commonly used adapters
pub use class_registry::InMemoryClassRegistry;
pub use manifest_loader::{ManifestClassLoader, ManifestError};
