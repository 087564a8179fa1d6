use chrono::{Duration, Utc};
use serde_json::json;

use crewmesh_protocols::types::{Metadata, RelationType};
use crewmesh_protocols::CoordError;

use super::*;

fn entity_params(name: &str, entity_type: &str, observations: Vec<&str>) -> CreateEntityParams {
    CreateEntityParams {
        name: name.to_string(),
        entity_type: entity_type.to_string(),
        observations: observations.into_iter().map(String::from).collect(),
        metadata: Metadata::new(),
    }
}

fn relation_params(from: &str, to: &str, strength: f64) -> CreateRelationParams {
    CreateRelationParams {
        from: from.to_string(),
        to: to.to_string(),
        relation_type: RelationType::RelatesTo,
        strength,
        metadata: Metadata::new(),
    }
}

#[test]
fn test_create_entity_twice_is_conflict() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state
        .create_entity(entity_params("X", "Component", vec![]), now)
        .unwrap();

    let err = state
        .create_entity(entity_params("X", "Decision", vec![]), now)
        .unwrap_err();
    assert!(matches!(err, CoordError::Conflict(_)));
    assert_eq!(state.entity_count(), 1);
}

#[test]
fn test_create_entity_suppresses_duplicate_observations() {
    let mut state = CoordState::new();
    state
        .create_entity(entity_params("X", "Component", vec!["o1", "o1", "o2"]), Utc::now())
        .unwrap();

    let entity = state.get_entity("X").entity.unwrap();
    assert_eq!(entity.observations, vec!["o1", "o2"]);
}

#[test]
fn test_update_entity_suppresses_duplicate_observations_across_calls() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state
        .create_entity(entity_params("X", "Component", vec![]), now)
        .unwrap();

    let first = state
        .update_entity("X", vec!["o1".to_string(), "o1".to_string()], None, now)
        .unwrap();
    assert_eq!(first.observations_added, 1);
    assert_eq!(first.version, 2);

    let second = state
        .update_entity("X", vec!["o1".to_string()], None, now)
        .unwrap();
    assert_eq!(second.observations_added, 0);
    // Version still bumps on every update.
    assert_eq!(second.version, 3);

    let entity = state.get_entity("X").entity.unwrap();
    assert_eq!(entity.observations, vec!["o1"]);
}

#[test]
fn test_update_entity_absent_is_not_found() {
    let mut state = CoordState::new();
    let err = state
        .update_entity("ghost", vec![], None, Utc::now())
        .unwrap_err();
    assert!(matches!(err, CoordError::NotFound(_)));
}

#[test]
fn test_update_entity_merges_metadata_and_touches_updated_at() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state
        .create_entity(entity_params("X", "Component", vec![]), now)
        .unwrap();

    let later = now + Duration::seconds(10);
    let metadata = Metadata::from([("source".to_string(), json!("review"))]);
    state.update_entity("X", vec![], Some(metadata), later).unwrap();

    let entity = state.get_entity("X").entity.unwrap();
    assert_eq!(entity.updated_at, later);
    assert_eq!(entity.created_at, now);
    assert_eq!(entity.metadata["source"], json!("review"));
}

#[test]
fn test_create_relation_requires_both_endpoints() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state
        .create_entity(entity_params("A", "Component", vec![]), now)
        .unwrap();

    let err = state.create_relation(relation_params("A", "B", 0.5), now).unwrap_err();
    assert!(matches!(err, CoordError::NotFound(_)));
    let err = state.create_relation(relation_params("B", "A", 0.5), now).unwrap_err();
    assert!(matches!(err, CoordError::NotFound(_)));
    assert_eq!(state.relation_count(), 0);
}

#[test]
fn test_create_relation_clamps_strength() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state.create_entity(entity_params("A", "Component", vec![]), now).unwrap();
    state.create_entity(entity_params("B", "Component", vec![]), now).unwrap();

    let high = state.create_relation(relation_params("A", "B", 1.5), now).unwrap();
    assert_eq!(high.strength, 1.0);
    let low = state.create_relation(relation_params("A", "B", -0.3), now).unwrap();
    assert_eq!(low.strength, 0.0);
}

#[test]
fn test_delete_entity_cascades_relations() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state.create_entity(entity_params("X", "Component", vec![]), now).unwrap();
    state.create_entity(entity_params("Y", "Component", vec![]), now).unwrap();
    state.create_entity(entity_params("Z", "Component", vec![]), now).unwrap();
    state.create_relation(relation_params("X", "Y", 0.5), now).unwrap();
    state.create_relation(relation_params("Y", "X", 0.5), now).unwrap();
    state.create_relation(relation_params("Y", "Z", 0.5), now).unwrap();

    let result = state.delete_entity("X");
    assert!(result.deleted);
    assert_eq!(result.relations_removed, 2);

    // Y keeps only its relation to Z.
    let y = state.get_entity("Y");
    assert_eq!(y.relations.len(), 1);
    assert_eq!(y.relations[0].to, "Z");
}

#[test]
fn test_delete_entity_is_idempotent() {
    let mut state = CoordState::new();
    let result = state.delete_entity("nothing");
    assert!(!result.deleted);
    assert_eq!(result.relations_removed, 0);
}

#[test]
fn test_search_entity_type_is_exact_and_case_sensitive() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state.create_entity(entity_params("A", "Component", vec![]), now).unwrap();
    state.create_entity(entity_params("B", "component", vec![]), now).unwrap();

    let result = state.search_entities(&SearchEntitiesParams {
        entity_type: Some("Component".to_string()),
        ..Default::default()
    });
    assert_eq!(result.total_results, 1);
    assert_eq!(result.entities[0].name, "A");
}

#[test]
fn test_search_entity_name_is_case_insensitive_substring() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state.create_entity(entity_params("UserService", "Component", vec![]), now).unwrap();
    state.create_entity(entity_params("Billing", "Component", vec![]), now).unwrap();

    let result = state.search_entities(&SearchEntitiesParams {
        entity_name: Some("user".to_string()),
        ..Default::default()
    });
    assert_eq!(result.total_results, 1);
    assert_eq!(result.entities[0].name, "UserService");
}

#[test]
fn test_search_observation_text_matches_any_observation() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state
        .create_entity(
            entity_params("A", "Component", vec!["uses Postgres", "owns billing"]),
            now,
        )
        .unwrap();
    state
        .create_entity(entity_params("B", "Component", vec!["uses Redis"]), now)
        .unwrap();

    let result = state.search_entities(&SearchEntitiesParams {
        observations: Some("postgres".to_string()),
        ..Default::default()
    });
    assert_eq!(result.total_results, 1);
    assert_eq!(result.entities[0].name, "A");
}

#[test]
fn test_search_filters_before_truncating() {
    let mut state = CoordState::new();
    let now = Utc::now();
    for i in 0..5 {
        state
            .create_entity(entity_params(&format!("match-{}", i), "Component", vec![]), now)
            .unwrap();
        state
            .create_entity(entity_params(&format!("other-{}", i), "Decision", vec![]), now)
            .unwrap();
    }

    let result = state.search_entities(&SearchEntitiesParams {
        entity_type: Some("Component".to_string()),
        limit: 3,
        ..Default::default()
    });
    // Truncation happens after filtering, so all three are Components, and
    // the reported total is the truncated count.
    assert_eq!(result.entities.len(), 3);
    assert!(result.entities.iter().all(|e| e.entity_type == "Component"));
    assert_eq!(result.total_results, 3);
}

#[test]
fn test_search_returns_relations_for_result_set() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state.create_entity(entity_params("A", "Component", vec![]), now).unwrap();
    state.create_entity(entity_params("B", "Decision", vec![]), now).unwrap();
    state.create_relation(relation_params("A", "B", 0.5), now).unwrap();

    let result = state.search_entities(&SearchEntitiesParams {
        entity_type: Some("Component".to_string()),
        ..Default::default()
    });
    assert_eq!(result.entities.len(), 1);
    // The relation touches A, which is in the result set.
    assert_eq!(result.relations.len(), 1);
}

#[test]
fn test_get_entity_absent() {
    let state = CoordState::new();
    let result = state.get_entity("nothing");
    assert!(result.entity.is_none());
    assert!(result.relations.is_empty());
}
