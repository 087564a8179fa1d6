//! Knowledge graph records: entities and typed, weighted relations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::Metadata;

/// Typed relation categories between entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    RelatesTo,
    CausedBy,
    Enables,
    Contradicts,
    Supports,
    Implements,
    DependsOn,
}

/// A named fact record with an append-only observation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEntity {
    /// Globally unique name.
    pub name: String,
    /// Free-form entity category (e.g. "Component", "Decision").
    pub entity_type: String,
    /// Ordered observations; duplicates are suppressed on append.
    pub observations: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Starts at 1, incremented on every update.
    pub version: u32,
}

impl MemoryEntity {
    /// Create a version-1 entity stamped at `now`. Duplicate observations
    /// are suppressed from the start, matching the append path.
    pub fn new(
        name: impl Into<String>,
        entity_type: impl Into<String>,
        observations: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut deduped: Vec<String> = Vec::with_capacity(observations.len());
        for obs in observations {
            if !deduped.contains(&obs) {
                deduped.push(obs);
            }
        }
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            observations: deduped,
            metadata: Metadata::new(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Append observations that are not already present, preserving order.
    /// Returns the number actually added.
    pub fn append_observations(&mut self, observations: Vec<String>) -> usize {
        let mut added = 0;
        for obs in observations {
            if !self.observations.contains(&obs) {
                self.observations.push(obs);
                added += 1;
            }
        }
        added
    }
}

/// A directed, typed, weighted edge between two entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRelation {
    /// Server-generated unique id.
    pub id: String,
    pub from: String,
    pub to: String,
    pub relation_type: RelationType,
    /// Edge weight in [0, 1]. Out-of-range input is clamped, not rejected.
    pub strength: f64,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl MemoryRelation {
    /// Create a relation stamped at `now`, clamping `strength` into [0, 1].
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        relation_type: RelationType,
        strength: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from: from.into(),
            to: to.into(),
            relation_type,
            strength: strength.clamp(0.0, 1.0),
            metadata: Metadata::new(),
            created_at: now,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Whether the relation touches the named entity on either end.
    pub fn touches(&self, name: &str) -> bool {
        self.from == name || self.to == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_starts_at_version_one() {
        let entity = MemoryEntity::new("UserService", "Component", vec![], Utc::now());
        assert_eq!(entity.version, 1);
        assert_eq!(entity.created_at, entity.updated_at);
    }

    #[test]
    fn test_new_suppresses_duplicate_observations() {
        let entity = MemoryEntity::new(
            "UserService",
            "Component",
            vec!["o1".to_string(), "o1".to_string(), "o2".to_string()],
            Utc::now(),
        );
        assert_eq!(entity.observations, vec!["o1", "o2"]);
    }

    #[test]
    fn test_append_observations_suppresses_duplicates() {
        let mut entity = MemoryEntity::new(
            "UserService",
            "Component",
            vec!["o1".to_string()],
            Utc::now(),
        );
        let added = entity.append_observations(vec![
            "o1".to_string(),
            "o2".to_string(),
            "o2".to_string(),
        ]);
        assert_eq!(added, 1);
        assert_eq!(entity.observations, vec!["o1", "o2"]);
    }

    #[test]
    fn test_relation_strength_clamped() {
        let now = Utc::now();
        let high = MemoryRelation::new("A", "B", RelationType::Supports, 1.5, now);
        assert_eq!(high.strength, 1.0);
        let low = MemoryRelation::new("A", "B", RelationType::Contradicts, -0.3, now);
        assert_eq!(low.strength, 0.0);
        let mid = MemoryRelation::new("A", "B", RelationType::RelatesTo, 0.5, now);
        assert_eq!(mid.strength, 0.5);
    }

    #[test]
    fn test_relation_touches() {
        let relation = MemoryRelation::new("A", "B", RelationType::Enables, 0.5, Utc::now());
        assert!(relation.touches("A"));
        assert!(relation.touches("B"));
        assert!(!relation.touches("C"));
    }

    #[test]
    fn test_relation_type_wire_format() {
        let json = serde_json::to_string(&RelationType::DependsOn).unwrap();
        assert_eq!(json, "\"depends_on\"");
        let parsed: RelationType = serde_json::from_str("\"caused_by\"").unwrap();
        assert_eq!(parsed, RelationType::CausedBy);
    }
}
