//! # crewmesh Core
//!
//! The stateful heart of the coordination service:
//!
//! - One lock-protected [`CoordState`] aggregate owning every collection
//! - Component logic for the instance registry, resource leases, task
//!   ledger, and knowledge graph
//! - The [`Coordinator`] dispatcher serializing every operation
//! - A background sweep loop for claim expiry and stale-instance detection
//!
//! State lives entirely in memory; a process restart starts empty.

pub mod config;
pub mod coordinator;
pub mod graph;
pub mod ledger;
pub mod leases;
pub mod registry;
pub mod state;
pub mod sweeper;

pub use config::CoordConfig;
pub use coordinator::{Coordinator, SweepReport};
pub use state::CoordState;
pub use sweeper::spawn_sweeper;
