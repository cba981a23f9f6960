//! Metamodel Core - facet-based domain metamodel
//!
//! This crate provides the domain and application layers of a
//! metadata-driven metamodel: classes are described structurally, a
//! programming model of facet factories turns each class into an
//! [`ObjectSpecification`](domain::ObjectSpecification), and the
//! specifications are cached and validated as a whole.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          metamodel-cli (CLI)            │
//! │     (inspect, validate, list, ...)      │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (MetamodelService, SpecificationLoader) │
//! │   ProgrammingModel + FacetFactories     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │            (ClassSource)                │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   metamodel-adapters (Infrastructure)   │
//! │ (InMemoryClassRegistry, ManifestLoader) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (Identifier, Facet, FacetHolder, ...)  │
//! │          No I/O, no discovery           │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use metamodel_core::prelude::*;
//!
//! # fn run(source: Arc<dyn ClassSource>) -> MetamodelResult<()> {
//! // 1. Create a loader over some class source
//! let loader = SpecificationLoader::new(
//!     source,
//!     Arc::new(ProgrammingModel::default_model()),
//!     IntrospectionPolicy::default(),
//! )?;
//!
//! // 2. Build and validate everything
//! let service = MetamodelService::new(Arc::new(loader));
//! let report = service.build(DeploymentMode::Prototype)?;
//! println!("{} error(s)", report.error_count());
//!
//! // 3. Look at one class
//! let customer = service.loader().load_specification("com.acme.Customer")?;
//! println!("{}", customer.plural_name());
//! # Ok(())
//! # }
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ClassInfo, DeploymentMode, IntrospectionState, MetamodelService, ParentChain,
        SpecificationLoader, SpecificationSummary,
        ports::ClassSource,
        programming_model::{FacetFactory, IntrospectionPolicy, ProgrammingModel},
    };
    pub use crate::domain::{
        ClassDescriptor, ClassKind, DomainObject, Facet, FacetHolder, FacetType, FeatureType,
        Identifier, MethodDescriptor, ObjectMember, ObjectSpecification, Precedence, TypeRef,
        ValidationFailure, ValidationReport, Value,
    };
    pub use crate::error::{MetamodelError, MetamodelResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
