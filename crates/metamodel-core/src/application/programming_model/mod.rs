//! The programming model: an ordered set of facet factories.
//!
//! A [`FacetFactory`] inspects one model element (a class, a member or an
//! action parameter) and contributes facets to its holder. The
//! [`ProgrammingModel`] runs every applicable factory in phase order, so
//! method-removing factories always see the raw method set and fallbacks
//! always run after annotations and conventions have had their say.
//!
//! Factories never fail the whole build unless they return
//! [`FactoryError::MetaModel`]. Any other error, and any panic, becomes an
//! error-severity validation failure against the element being processed.

use std::collections::BTreeSet;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use thiserror::Error;
use tracing::{debug, trace};

use crate::application::ApplicationError;
use crate::domain::{FeatureType, Identifier, ValidationFailure, ValidationFailures};
use crate::error::MetamodelResult;

pub mod context;
pub mod factories;
pub mod method_pool;
pub mod naming;
pub mod policy;

pub use context::{IntrospectionEnv, ProcessClassContext, ProcessMethodContext, ProcessParameterContext};
pub use method_pool::MethodPool;
pub use policy::{Encapsulation, IntrospectionPolicy, MemberAnnotations};

// ── Phases ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcessingPhase {
    /// Strip methods that can never be members.
    MethodRemoving,
    /// Accessors, mutators and invocations.
    MemberModelling,
    /// Annotations and naming conventions.
    Annotations,
    /// Computed defaults for anything still missing.
    Fallback,
    /// Facets derived from other facets.
    PostProcessing,
}

impl ProcessingPhase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MethodRemoving => "method-removing",
            Self::MemberModelling => "member-modelling",
            Self::Annotations => "annotations",
            Self::Fallback => "fallback",
            Self::PostProcessing => "post-processing",
        }
    }
}

impl fmt::Display for ProcessingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FacetFactory ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    /// The element is malformed; recorded as a validation failure.
    #[error("{0}")]
    Invalid(String),

    /// The metamodel cannot be built at all; aborts the build.
    #[error("{0}")]
    MetaModel(String),
}

pub type FactoryResult = Result<(), FactoryError>;

/// A unit of introspection logic.
///
/// Implementations must be deterministic: the same element must always
/// yield the same facets.
pub trait FacetFactory: Send + Sync {
    /// Unique, kebab-case name; recorded in facet origins and failures.
    fn name(&self) -> &'static str;

    fn phase(&self) -> ProcessingPhase;

    /// Element kinds this factory applies to.
    fn feature_types(&self) -> &'static [FeatureType];

    fn process_class(&self, _ctx: &mut ProcessClassContext<'_>) -> FactoryResult {
        Ok(())
    }

    fn process_method(&self, _ctx: &mut ProcessMethodContext<'_>) -> FactoryResult {
        Ok(())
    }

    fn process_param(&self, _ctx: &mut ProcessParameterContext<'_>) -> FactoryResult {
        Ok(())
    }
}

// ── ProgrammingModel ─────────────────────────────────────────────────────────

pub struct ProgrammingModel {
    factories: Vec<Box<dyn FacetFactory>>,
}

impl ProgrammingModel {
    /// The standard factory set.
    pub fn default_model() -> Self {
        Self::from_factories(factories::defaults())
    }

    pub fn builder() -> ProgrammingModelBuilder {
        ProgrammingModelBuilder::default()
    }

    fn from_factories(mut factories: Vec<Box<dyn FacetFactory>>) -> Self {
        // Stable: registration order is kept within a phase.
        factories.sort_by_key(|f| f.phase());
        Self { factories }
    }

    pub fn factory_names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn applicable(&self, feature_type: FeatureType) -> impl Iterator<Item = &dyn FacetFactory> {
        self.factories
            .iter()
            .map(AsRef::as_ref)
            .filter(move |f| f.feature_types().contains(&feature_type))
    }

    pub fn run_class(&self, ctx: &mut ProcessClassContext<'_>) -> MetamodelResult<()> {
        for factory in self.applicable(FeatureType::Object) {
            let outcome = catch_unwind(AssertUnwindSafe(|| factory.process_class(ctx)));
            settle(factory, ctx.identifier(), ctx.env.failures, outcome)?;
        }
        Ok(())
    }

    pub fn run_method(&self, ctx: &mut ProcessMethodContext<'_>) -> MetamodelResult<()> {
        for factory in self.applicable(ctx.feature_type) {
            let outcome = catch_unwind(AssertUnwindSafe(|| factory.process_method(ctx)));
            settle(factory, ctx.identifier(), ctx.env.failures, outcome)?;
        }
        Ok(())
    }

    pub fn run_param(&self, ctx: &mut ProcessParameterContext<'_>) -> MetamodelResult<()> {
        for factory in self.applicable(FeatureType::ActionParameter) {
            let outcome = catch_unwind(AssertUnwindSafe(|| factory.process_param(ctx)));
            settle(factory, ctx.identifier(), ctx.env.failures, outcome)?;
        }
        Ok(())
    }
}

impl Default for ProgrammingModel {
    fn default() -> Self {
        Self::default_model()
    }
}

impl fmt::Debug for ProgrammingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgrammingModel")
            .field("factories", &self.factory_names())
            .finish()
    }
}

type Outcome = std::thread::Result<FactoryResult>;

fn settle(
    factory: &dyn FacetFactory,
    identifier: &Identifier,
    failures: &ValidationFailures,
    outcome: Outcome,
) -> MetamodelResult<()> {
    match outcome {
        Ok(Ok(())) => {
            trace!(factory = factory.name(), %identifier, "processed");
            Ok(())
        }
        Ok(Err(FactoryError::Invalid(message))) => {
            debug!(factory = factory.name(), %identifier, %message, "factory reported a failure");
            failures.add(ValidationFailure::error(identifier.clone(), message, factory.name()));
            Ok(())
        }
        Ok(Err(FactoryError::MetaModel(reason))) => Err(ApplicationError::MetaModelAborted {
            factory: factory.name().to_string(),
            identifier: identifier.to_string(),
            reason,
        }
        .into()),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            failures.add(ValidationFailure::error(
                identifier.clone(),
                format!("factory panicked: {message}"),
                factory.name(),
            ));
            Ok(())
        }
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct ProgrammingModelBuilder {
    factories: Vec<Box<dyn FacetFactory>>,
}

impl ProgrammingModelBuilder {
    pub fn with_defaults(mut self) -> Self {
        self.factories.extend(factories::defaults());
        self
    }

    pub fn add(mut self, factory: impl FacetFactory + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Drop every factory registered under `name`.
    pub fn remove(mut self, name: &str) -> Self {
        self.factories.retain(|f| f.name() != name);
        self
    }

    pub fn build(self) -> MetamodelResult<ProgrammingModel> {
        let mut seen = BTreeSet::new();
        for factory in &self.factories {
            if !seen.insert(factory.name()) {
                return Err(ApplicationError::DuplicateFactory {
                    name: factory.name().to_string(),
                }
                .into());
            }
        }
        Ok(ProgrammingModel::from_factories(self.factories))
    }
}
