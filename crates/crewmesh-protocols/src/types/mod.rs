//! Data model types shared across the coordination service.

mod common;
mod instance;
mod memory;
mod resource;
mod task;

pub use common::{merge_metadata, Metadata};
pub use instance::{Instance, InstanceKind, InstanceStatus};
pub use memory::{MemoryEntity, MemoryRelation, RelationType};
pub use resource::{ResourceClaim, ResourceKind};
pub use task::{TaskAssignment, TaskKind, TaskPriority, TaskSpecification, TaskStatus};
