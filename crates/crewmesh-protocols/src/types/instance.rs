//! Worker instance registration records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::Metadata;

/// Role a worker instance fills in the coordination mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceKind {
    /// Bootstraps a repository or work area.
    Initializer,
    /// Implements features and fixes.
    Developer,
    /// Reviews changes produced by developers.
    Reviewer,
    /// Runs and extends test suites.
    Tester,
}

/// Liveness/availability state reported by an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Available for new work.
    Idle,
    /// Currently working on an assignment.
    Busy,
    /// Not responding; excluded from selection.
    Offline,
}

/// A registered worker instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Caller-chosen unique identifier.
    pub id: String,
    /// Role of the instance.
    pub kind: InstanceKind,
    /// Current availability.
    pub status: InstanceStatus,
    /// Declared capabilities. Always non-empty for a registered instance.
    pub capabilities: Vec<String>,
    /// Open metadata map.
    #[serde(default)]
    pub metadata: Metadata,
    /// Last time the instance registered or heartbeated.
    pub last_seen: DateTime<Utc>,
}

impl Instance {
    /// Create a new instance record stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        kind: InstanceKind,
        status: InstanceStatus,
        capabilities: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            status,
            capabilities,
            metadata: Metadata::new(),
            last_seen: Utc::now(),
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Whether the instance advertises the given capability.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}
