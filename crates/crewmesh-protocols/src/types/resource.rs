//! Resource lease records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of contested resource a claim covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Branch,
    File,
    Issue,
    Pr,
}

/// A time-bounded lease on a named resource.
///
/// Claims are treated as mutually exclusive locks: the `operation` string is
/// recorded but does not soften the conflict rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceClaim {
    /// Server-generated unique id.
    pub id: String,
    pub resource_kind: ResourceKind,
    pub resource_id: String,
    /// Instance holding the lease.
    pub claimed_by: String,
    /// Free-form operation description (e.g. "write", "read").
    pub operation: String,
    pub claimed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ResourceClaim {
    /// Create a claim starting at `now`, expiring after `ttl`.
    pub fn new(
        resource_kind: ResourceKind,
        resource_id: impl Into<String>,
        claimed_by: impl Into<String>,
        operation: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            resource_kind,
            resource_id: resource_id.into(),
            claimed_by: claimed_by.into(),
            operation: operation.into(),
            claimed_at: now,
            expires_at: now + ttl,
        }
    }

    /// Whether the claim has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the claim is still live as of `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now)
    }
}
