//! Application layer for the metamodel.
//!
//! This layer contains:
//! - **Programming model**: facet factories and the order they run in
//! - **Services**: use case orchestration (SpecificationLoader, MetamodelService)
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: application-specific error types
//!
//! The application layer decides *when* facets are created; what a facet
//! means lives in `crate::domain`.

pub mod error;
pub mod ports;
pub mod programming_model;
pub mod services;

// Re-export main services
pub use services::{
    ClassInfo, // DTO for `metamodel list`
    DeploymentMode, IntrospectionState, MetamodelService, ParentChain, SpecificationLoader,
    SpecificationSummary,
};

pub use programming_model::{
    FacetFactory, FactoryError, IntrospectionPolicy, ProcessingPhase, ProgrammingModel,
};

// Re-export port traits (for adapter implementation)
pub use ports::ClassSource;

pub use error::ApplicationError;
