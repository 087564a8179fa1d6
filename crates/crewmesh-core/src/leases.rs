//! Resource lease operations.
//!
//! Claims are mutually exclusive locks on a `(kind, id)` pair: any live
//! claim held by a different instance conflicts, whatever the operation
//! strings say. A claim's life is absent -> held -> (released | expired),
//! and both terminal transitions converge back to absent.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crewmesh_protocols::method::{ClaimResult, ReleaseResult};
use crewmesh_protocols::types::{ResourceClaim, ResourceKind};

use crate::state::CoordState;

impl CoordState {
    /// Attempt to claim a resource for an instance.
    ///
    /// Conflicting live claims produce a `claimed: false` outcome carrying
    /// the conflicting holder ids, with no state change. Otherwise a claim
    /// expiring at `now + ttl` is upserted; re-claiming by the current
    /// holder refreshes the lease.
    pub fn claim_resource(
        &mut self,
        resource_kind: ResourceKind,
        resource_id: impl Into<String>,
        instance_id: impl Into<String>,
        operation: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> ClaimResult {
        let resource_id = resource_id.into();
        let instance_id = instance_id.into();

        let conflicts: Vec<String> = self
            .claims
            .values()
            .filter(|c| {
                c.resource_kind == resource_kind
                    && c.resource_id == resource_id
                    && c.claimed_by != instance_id
                    && c.is_live(now)
            })
            .map(|c| c.claimed_by.clone())
            .collect();

        if !conflicts.is_empty() {
            debug!(
                "Claim denied for {} on {:?}:{} (held by {:?})",
                instance_id, resource_kind, resource_id, conflicts
            );
            return ClaimResult::denied(conflicts);
        }

        let claim = ResourceClaim::new(
            resource_kind,
            resource_id.clone(),
            instance_id.clone(),
            operation,
            now,
            ttl,
        );
        debug!(
            "Claim granted for {} on {:?}:{} until {}",
            instance_id, resource_kind, resource_id, claim.expires_at
        );
        self.claims
            .insert((resource_kind, resource_id, instance_id), claim);
        ClaimResult::granted()
    }

    /// Release the claim keyed by the exact `(kind, id, holder)` triple.
    /// Idempotent: reports whether a claim existed.
    pub fn release_resource(
        &mut self,
        resource_kind: ResourceKind,
        resource_id: &str,
        instance_id: &str,
    ) -> ReleaseResult {
        let key = (
            resource_kind,
            resource_id.to_string(),
            instance_id.to_string(),
        );
        let released = self.claims.remove(&key).is_some();
        if released {
            debug!(
                "Released claim by {} on {:?}:{}",
                instance_id, resource_kind, resource_id
            );
        }
        ReleaseResult { released }
    }

    /// Drop every claim whose expiry has passed. Returns the count removed
    /// (diagnostics only).
    pub fn sweep_expired_claims(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.claims.len();
        self.claims.retain(|_, claim| claim.is_live(now));
        let removed = before - self.claims.len();
        if removed > 0 {
            info!("Swept {} expired resource claims", removed);
        }
        removed
    }
}

#[cfg(test)]
#[path = "leases_tests.rs"]
mod tests;
