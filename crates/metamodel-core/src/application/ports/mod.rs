//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `metamodel-adapters` implement
//! these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `ClassSource`: class descriptors to introspect
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (`SpecificationLoader` and `MetamodelService` are used directly)

pub mod output;

pub use output::ClassSource;
