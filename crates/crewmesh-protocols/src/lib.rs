//! # crewmesh Protocols
//!
//! Wire-facing definitions for the crewmesh coordination service:
//!
//! - Data model types (instances, tasks, resource claims, memory graph)
//! - The closed [`Method`] dispatch enum with per-method parameter and
//!   result payloads
//! - The [`CoordError`] error taxonomy
//! - Pure payload validation applied before any state mutation

pub mod error;
pub mod method;
pub mod types;
pub mod validate;

pub use error::CoordError;
pub use method::Method;
pub use types::{
    Instance, InstanceKind, InstanceStatus, MemoryEntity, MemoryRelation, Metadata, RelationType,
    ResourceClaim, ResourceKind, TaskAssignment, TaskKind, TaskPriority, TaskSpecification,
    TaskStatus,
};
