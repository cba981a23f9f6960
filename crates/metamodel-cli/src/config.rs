//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate only sees the pieces it needs
//! (the introspection policy and the deployment mode).
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `METAMODEL_<SECTION>__<KEY>`, e.g.
//!    `METAMODEL_VALIDATION__MODE=production`
//! 3. Config file (`--config FILE`, else the platform default path)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use metamodel_core::application::{DeploymentMode, IntrospectionPolicy};

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "METAMODEL";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Which methods become members.
    pub introspection: IntrospectionPolicy,
    pub validation: ValidationConfig,
    /// Where classes come from.
    pub classes: ClassesConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub mode: DeploymentMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassesConfig {
    /// Directory of `*.toml` class manifests.
    pub directory: Option<PathBuf>,
    /// Register the bundled demo domain.
    pub builtin: bool,
}

impl Default for ClassesConfig {
    fn default() -> Self {
        Self {
            directory: None,
            builtin: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write log events to this file.
    pub file: Option<PathBuf>,
    /// Write the log file as JSON lines.
    pub json: bool,
}

impl AppConfig {
    /// Load configuration: defaults, then the file, then the environment.
    ///
    /// An explicit `config_file` must exist; the default path is optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required)
    }

    fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        if required && !path.is_file() {
            anyhow::bail!("configuration file {} does not exist", path.display());
        }

        let settings = Config::builder()
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        let mut config: Self = settings
            .try_deserialize()
            .context("invalid configuration values")?;

        // Relative manifest directories are relative to the config file.
        if let Some(dir) = config.classes.directory.take() {
            config.classes.directory = Some(match path.parent() {
                Some(base) if dir.is_relative() && path.is_file() => base.join(dir),
                _ => dir,
            });
        }
        Ok(config)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.metamodel.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "metamodel", "metamodel")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".metamodel.toml"))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use metamodel_core::application::programming_model::MemberAnnotations;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_load_builtins_in_prototype_mode() {
        let cfg = AppConfig::default();
        assert!(cfg.classes.builtin);
        assert_eq!(cfg.classes.directory, None);
        assert_eq!(cfg.validation.mode, DeploymentMode::Prototype);
        assert_eq!(cfg.introspection, IntrospectionPolicy::default());
    }

    #[test]
    fn missing_optional_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let cfg = AppConfig::load_from(&temp.path().join("absent.toml"), false).unwrap();
        assert_eq!(cfg.classes, ClassesConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn file_values_override_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("metamodel.toml");
        fs::write(
            &path,
            r#"
                [introspection]
                member_annotations = "required"

                [validation]
                mode = "production"

                [classes]
                directory = "domain"
                builtin = false
            "#,
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.introspection.member_annotations, MemberAnnotations::Required);
        assert_eq!(cfg.validation.mode, DeploymentMode::Production);
        assert!(!cfg.classes.builtin);
        assert_eq!(cfg.classes.directory, Some(temp.path().join("domain")));
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("metamodel.toml");
        fs::write(&path, "[validation]\nmode = \"staging\"\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
