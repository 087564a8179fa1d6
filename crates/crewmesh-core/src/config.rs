//! Coordinator configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Coordination service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordConfig {
    /// Lifetime of a resource claim in seconds.
    #[serde(default = "default_claim_ttl")]
    pub claim_ttl_secs: u64,

    /// Interval between background sweep runs in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Age of the last heartbeat after which an instance is marked offline,
    /// in seconds.
    #[serde(default = "default_instance_stale")]
    pub instance_stale_secs: u64,

    /// Whether the background sweep runs at all. Disabled in tests and
    /// other ephemeral contexts so no timer leaks.
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,
}

fn default_claim_ttl() -> u64 {
    30 * 60
}

fn default_sweep_interval() -> u64 {
    5 * 60
}

fn default_instance_stale() -> u64 {
    10 * 60
}

fn default_sweep_enabled() -> bool {
    true
}

impl Default for CoordConfig {
    fn default() -> Self {
        Self {
            claim_ttl_secs: default_claim_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            instance_stale_secs: default_instance_stale(),
            sweep_enabled: default_sweep_enabled(),
        }
    }
}

impl CoordConfig {
    /// Claim TTL as a chrono duration.
    pub fn claim_ttl(&self) -> Duration {
        Duration::seconds(self.claim_ttl_secs as i64)
    }

    /// Staleness cutoff as a chrono duration.
    pub fn instance_stale(&self) -> Duration {
        Duration::seconds(self.instance_stale_secs as i64)
    }

    /// Sweep interval as a std duration, for `tokio::time::interval`.
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }

    /// Configuration for tests: sweep disabled.
    pub fn ephemeral() -> Self {
        Self {
            sweep_enabled: false,
            ..Self::default()
        }
    }
}
