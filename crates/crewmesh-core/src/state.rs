//! The owned state aggregate.
//!
//! Every collection the service tracks lives here, and only the
//! [`Coordinator`](crate::Coordinator) holds it (behind one lock). No
//! component keeps an independent reference to any collection.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crewmesh_protocols::types::{
    Instance, MemoryEntity, MemoryRelation, ResourceClaim, ResourceKind, TaskAssignment,
};

/// Identity of a claim: resource kind, resource id, holder.
///
/// Keying claims by the full triple makes a re-claim by the current holder
/// an upsert (lease refresh) rather than a stacked duplicate.
pub type ClaimKey = (ResourceKind, String, String);

/// All mutable coordination state.
pub struct CoordState {
    pub(crate) instances: HashMap<String, Instance>,
    /// Registration order of instance ids. Re-registration keeps the
    /// original position; first-match selection walks this list.
    pub(crate) instance_order: Vec<String>,
    pub(crate) tasks: HashMap<String, TaskAssignment>,
    pub(crate) claims: HashMap<ClaimKey, ResourceClaim>,
    pub(crate) entities: HashMap<String, MemoryEntity>,
    pub(crate) relations: HashMap<String, MemoryRelation>,
    pub(crate) started_at: DateTime<Utc>,
}

impl CoordState {
    /// Create an empty aggregate stamped with the current time.
    pub fn new() -> Self {
        Self {
            instances: HashMap::new(),
            instance_order: Vec::new(),
            tasks: HashMap::new(),
            claims: HashMap::new(),
            entities: HashMap::new(),
            relations: HashMap::new(),
            started_at: Utc::now(),
        }
    }

    /// When this state was created.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of registered instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of tasks in the ledger.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of resource claims, live or expired-but-unswept.
    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    /// Number of knowledge graph entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of knowledge graph relations.
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }
}

impl Default for CoordState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_starts_empty() {
        let state = CoordState::new();
        assert_eq!(state.instance_count(), 0);
        assert_eq!(state.task_count(), 0);
        assert_eq!(state.claim_count(), 0);
        assert_eq!(state.entity_count(), 0);
        assert_eq!(state.relation_count(), 0);
    }
}
