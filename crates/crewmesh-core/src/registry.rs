//! Instance registry operations.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crewmesh_protocols::error::CoordError;
use crewmesh_protocols::method::{HeartbeatResult, InstanceSpec, RegisterResult, UnregisterResult};
use crewmesh_protocols::types::{
    merge_metadata, Instance, InstanceKind, InstanceStatus, Metadata, TaskKind,
};

use crate::state::CoordState;

impl CoordState {
    /// Register or re-register an instance. Re-registration overwrites in
    /// place and keeps the original registration-order position; it is an
    /// informational event, never an error.
    pub fn register_instance(&mut self, spec: InstanceSpec, now: DateTime<Utc>) -> RegisterResult {
        let instance = Instance {
            id: spec.id.clone(),
            kind: spec.kind,
            status: spec.status,
            capabilities: spec.capabilities,
            metadata: spec.metadata,
            last_seen: now,
        };

        if self.instances.insert(spec.id.clone(), instance).is_some() {
            info!("Re-registered instance {}", spec.id);
        } else {
            self.instance_order.push(spec.id.clone());
            info!("Registered instance {}", spec.id);
        }

        RegisterResult {
            registered: true,
            instance_id: spec.id,
        }
    }

    /// Record a liveness/status refresh from an instance.
    pub fn heartbeat(
        &mut self,
        instance_id: &str,
        status: InstanceStatus,
        metadata: Option<Metadata>,
        now: DateTime<Utc>,
    ) -> Result<HeartbeatResult, CoordError> {
        let instance = self
            .instances
            .get_mut(instance_id)
            .ok_or_else(|| CoordError::NotFound(format!("instance {}", instance_id)))?;

        instance.status = status;
        instance.last_seen = now;
        if let Some(incoming) = metadata {
            merge_metadata(&mut instance.metadata, incoming);
        }

        debug!("Heartbeat from {} ({:?})", instance_id, status);
        Ok(HeartbeatResult {
            acknowledged: true,
            last_seen: now,
        })
    }

    /// Remove an instance and cascade-release every claim it holds.
    /// Idempotent: unknown ids report `removed: false`.
    pub fn unregister_instance(&mut self, instance_id: &str) -> UnregisterResult {
        let removed = self.instances.remove(instance_id).is_some();
        if !removed {
            return UnregisterResult {
                removed: false,
                released_claims: 0,
            };
        }

        self.instance_order.retain(|id| id != instance_id);

        let before = self.claims.len();
        self.claims
            .retain(|_, claim| claim.claimed_by != instance_id);
        let released_claims = before - self.claims.len();

        info!(
            "Unregistered instance {} (released {} claims)",
            instance_id, released_claims
        );
        UnregisterResult {
            removed: true,
            released_claims,
        }
    }

    /// List instances matching all provided filters, in registration order.
    pub fn list_instances(
        &self,
        kind: Option<InstanceKind>,
        status: Option<InstanceStatus>,
    ) -> Vec<Instance> {
        self.instance_order
            .iter()
            .filter_map(|id| self.instances.get(id))
            .filter(|i| kind.is_none_or(|k| i.kind == k))
            .filter(|i| status.is_none_or(|s| i.status == s))
            .cloned()
            .collect()
    }

    /// First idle instance (in registration order) whose capability set
    /// contains the task kind's name, skipping excluded ids. No load or
    /// recency ranking.
    pub fn find_available(&self, task_kind: TaskKind, exclude: &[String]) -> Option<&Instance> {
        let capability = task_kind.capability();
        self.instance_order
            .iter()
            .filter(|id| !exclude.contains(id))
            .filter_map(|id| self.instances.get(id))
            .find(|i| i.status == InstanceStatus::Idle && i.has_capability(capability))
    }

    /// Mark instances whose last heartbeat is older than `stale_after` as
    /// offline. Returns the number flipped. Instances already offline are
    /// left alone.
    pub fn mark_stale_offline(&mut self, now: DateTime<Utc>, stale_after: Duration) -> usize {
        let cutoff = now - stale_after;
        let mut flipped = 0;
        for instance in self.instances.values_mut() {
            if instance.status != InstanceStatus::Offline && instance.last_seen < cutoff {
                instance.status = InstanceStatus::Offline;
                info!("Marking instance {} offline (stale heartbeat)", instance.id);
                flipped += 1;
            }
        }
        flipped
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
