//! Knowledge graph operations.
//!
//! Entities are keyed by globally unique name; relations are directed,
//! typed, weighted edges that only exist while both endpoints do.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crewmesh_protocols::error::CoordError;
use crewmesh_protocols::method::{
    CreateEntityParams, CreateEntityResult, CreateRelationParams, CreateRelationResult,
    DeleteEntityResult, GetEntityResult, SearchEntitiesParams, SearchEntitiesResult,
    UpdateEntityResult,
};
use crewmesh_protocols::types::{merge_metadata, MemoryEntity, MemoryRelation, Metadata};

use crate::state::CoordState;

impl CoordState {
    /// Create an entity. Names are unique forever: re-creating an existing
    /// name is a conflict.
    pub fn create_entity(
        &mut self,
        params: CreateEntityParams,
        now: DateTime<Utc>,
    ) -> Result<CreateEntityResult, CoordError> {
        if self.entities.contains_key(&params.name) {
            return Err(CoordError::Conflict(format!(
                "entity {} already exists",
                params.name
            )));
        }

        let entity = MemoryEntity::new(
            params.name.clone(),
            params.entity_type,
            params.observations,
            now,
        )
        .with_metadata(params.metadata);

        info!("Created entity {}", params.name);
        self.entities.insert(params.name.clone(), entity);
        Ok(CreateEntityResult {
            created: true,
            name: params.name,
            version: 1,
        })
    }

    /// Append unseen observations and merge metadata. Every successful
    /// update bumps the version, even when nothing new was appended.
    pub fn update_entity(
        &mut self,
        name: &str,
        observations: Vec<String>,
        metadata: Option<Metadata>,
        now: DateTime<Utc>,
    ) -> Result<UpdateEntityResult, CoordError> {
        let entity = self
            .entities
            .get_mut(name)
            .ok_or_else(|| CoordError::NotFound(format!("entity {}", name)))?;

        let observations_added = entity.append_observations(observations);
        if let Some(incoming) = metadata {
            merge_metadata(&mut entity.metadata, incoming);
        }
        entity.version += 1;
        entity.updated_at = now;

        debug!(
            "Updated entity {} to v{} (+{} observations)",
            name, entity.version, observations_added
        );
        Ok(UpdateEntityResult {
            updated: true,
            version: entity.version,
            observations_added,
        })
    }

    /// Create a relation between two existing entities. Strength is clamped
    /// into [0, 1], never rejected.
    pub fn create_relation(
        &mut self,
        params: CreateRelationParams,
        now: DateTime<Utc>,
    ) -> Result<CreateRelationResult, CoordError> {
        if !self.entities.contains_key(&params.from) {
            return Err(CoordError::NotFound(format!("entity {}", params.from)));
        }
        if !self.entities.contains_key(&params.to) {
            return Err(CoordError::NotFound(format!("entity {}", params.to)));
        }

        let relation = MemoryRelation::new(
            params.from.clone(),
            params.to.clone(),
            params.relation_type,
            params.strength,
            now,
        )
        .with_metadata(params.metadata);
        let relation_id = relation.id.clone();
        let strength = relation.strength;

        debug!(
            "Created relation {} -{:?}-> {} ({})",
            params.from, params.relation_type, params.to, strength
        );
        self.relations.insert(relation_id.clone(), relation);
        Ok(CreateRelationResult {
            created: true,
            relation_id,
            strength,
        })
    }

    /// Search entities by name/observation substring (case-insensitive) and
    /// exact entity type, AND of whatever filters are present. Results are
    /// filtered, sorted by name, then truncated to `limit`; the reported
    /// total is the truncated count, and returned relations cover only the
    /// truncated set.
    pub fn search_entities(&self, params: &SearchEntitiesParams) -> SearchEntitiesResult {
        let name_needle = params.entity_name.as_ref().map(|s| s.to_lowercase());
        let obs_needle = params.observations.as_ref().map(|s| s.to_lowercase());

        let mut entities: Vec<MemoryEntity> = self
            .entities
            .values()
            .filter(|e| {
                name_needle
                    .as_ref()
                    .is_none_or(|needle| e.name.to_lowercase().contains(needle))
            })
            .filter(|e| {
                params
                    .entity_type
                    .as_ref()
                    .is_none_or(|t| &e.entity_type == t)
            })
            .filter(|e| {
                obs_needle.as_ref().is_none_or(|needle| {
                    e.observations
                        .iter()
                        .any(|o| o.to_lowercase().contains(needle))
                })
            })
            .cloned()
            .collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        entities.truncate(params.limit);

        let relations = self.relations_touching(entities.iter().map(|e| e.name.as_str()));
        let total_results = entities.len();
        SearchEntitiesResult {
            entities,
            relations,
            total_results,
        }
    }

    /// Fetch an entity with every relation touching it. Absence is a null
    /// result, not an error.
    pub fn get_entity(&self, name: &str) -> GetEntityResult {
        let entity = self.entities.get(name).cloned();
        let relations = if entity.is_some() {
            self.relations_touching(std::iter::once(name))
        } else {
            Vec::new()
        };
        GetEntityResult { entity, relations }
    }

    /// Delete an entity and every relation referencing it. Idempotent.
    pub fn delete_entity(&mut self, name: &str) -> DeleteEntityResult {
        let deleted = self.entities.remove(name).is_some();
        if !deleted {
            return DeleteEntityResult {
                deleted: false,
                relations_removed: 0,
            };
        }

        let before = self.relations.len();
        self.relations.retain(|_, r| !r.touches(name));
        let relations_removed = before - self.relations.len();

        info!(
            "Deleted entity {} ({} relations cascaded)",
            name, relations_removed
        );
        DeleteEntityResult {
            deleted: true,
            relations_removed,
        }
    }

    /// All relations touching any of the given entity names, oldest first.
    fn relations_touching<'a>(&self, names: impl Iterator<Item = &'a str>) -> Vec<MemoryRelation> {
        let names: Vec<&str> = names.collect();
        let mut relations: Vec<MemoryRelation> = self
            .relations
            .values()
            .filter(|r| names.iter().any(|n| r.touches(n)))
            .cloned()
            .collect();
        relations.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        relations
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
