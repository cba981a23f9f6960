//! Application services - orchestrate use cases.
//!
//! Services drive the programming model over classes from a
//! [`ClassSource`](crate::application::ports::ClassSource): introspect one
//! class, build and validate the whole metamodel, navigate parent chains.

pub mod introspector;
pub mod metamodel_service;
pub mod parent_chain;
pub mod specification_loader;
pub mod validators;

pub use metamodel_service::{
    ClassInfo, DeploymentMode, FacetSummary, MemberSummary, MetamodelService, ParameterSummary,
    SpecificationSummary, SupersededSummary,
};
pub use parent_chain::{MAX_PARENT_CHAIN_LENGTH, ParentChain};
pub use specification_loader::{IntrospectionState, MAX_INTROSPECTION_DEPTH, SpecificationLoader};
pub use validators::{MetaModelValidator, ValidationContext};
