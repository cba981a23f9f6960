//! Wiring: configuration in, a ready [`MetamodelService`] out.

use std::sync::Arc;

use tracing::{debug, instrument};

use metamodel_adapters::{InMemoryClassRegistry, ManifestClassLoader};
use metamodel_core::error::MetamodelError;
use metamodel_core::prelude::*;

use crate::config::AppConfig;
use crate::error::{CliError, CliResult, IntoCli};

/// Build the class source described by `[classes]`.
///
/// With only a manifest directory the loader is used directly; otherwise
/// the built-in domain and the manifest classes share one registry.
pub fn class_source(config: &AppConfig) -> CliResult<Arc<dyn ClassSource>> {
    let classes = &config.classes;
    match (&classes.directory, classes.builtin) {
        (None, false) => Err(CliError::InvalidInput {
            message: "no class source configured: set classes.directory or classes.builtin".into(),
            source: None,
        }),
        (Some(dir), false) => {
            let loader = ManifestClassLoader::open(dir)
                .with_cli_context(|| format!("loading class manifests from {}", dir.display()))?;
            Ok(Arc::new(loader))
        }
        (dir, true) => {
            let registry = InMemoryClassRegistry::with_builtin()?;
            if let Some(dir) = dir {
                let classes = ManifestClassLoader::new(dir)
                    .load_all()
                    .map_err(MetamodelError::from)?;
                debug!(count = classes.len(), dir = %dir.display(), "adding manifest classes");
                registry.register_all(classes)?;
            }
            Ok(Arc::new(registry))
        }
    }
}

/// Create the service. An invalid introspection policy fails here, before
/// any class is introspected.
#[instrument(skip_all)]
pub fn open(config: &AppConfig) -> CliResult<MetamodelService> {
    let loader = SpecificationLoader::new(
        class_source(config)?,
        Arc::new(ProgrammingModel::default_model()),
        config.introspection,
    )?;
    Ok(MetamodelService::new(Arc::new(loader)))
}
