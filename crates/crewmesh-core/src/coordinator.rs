//! The method dispatcher.
//!
//! One [`Coordinator`] owns all coordination state behind a single
//! `tokio::sync::RwLock`. Every mutating operation takes the write lock, so
//! no two mutations can observe state mismatched by a concurrent write;
//! reads share the read lock. Background sweeps go through the same lock —
//! there is no separate lock tier.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crewmesh_protocols::error::CoordError;
use crewmesh_protocols::method::{
    AssignResult, AssignTaskParams, ClaimResourceParams, ClaimResult, CreateEntityParams,
    CreateEntityResult, CreateRelationParams, CreateRelationResult, DeleteEntityParams,
    DeleteEntityResult, DumpResult, GetEntityParams, GetEntityResult, GetTaskParams,
    GetTaskResult, HeartbeatParams, HeartbeatResult, InstanceListResult, ListInstancesParams,
    ListTasksParams, Method, RegisterParams, RegisterResult, ReleaseResourceParams, ReleaseResult,
    RequestDeveloperParams, RequestDeveloperResult, SearchEntitiesParams, SearchEntitiesResult,
    StatsResult, TaskListResult, UnregisterParams, UnregisterResult, UpdateEntityParams,
    UpdateEntityResult, UpdateTaskStatusParams, UpdateTaskStatusResult,
};
use crewmesh_protocols::validate;

use crate::config::CoordConfig;
use crate::state::CoordState;

/// Outcome of one background sweep pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepReport {
    pub expired_claims: usize,
    pub stale_instances: usize,
}

/// The single entry point for every coordination operation.
pub struct Coordinator {
    state: RwLock<CoordState>,
    config: CoordConfig,
}

// Serializing these result payloads cannot fail: they contain only maps
// with string keys, strings, numbers, and timestamps.
fn to_value<T: Serialize>(result: T) -> serde_json::Value {
    serde_json::to_value(result).unwrap_or(serde_json::Value::Null)
}

impl Coordinator {
    /// Create a coordinator with empty state.
    pub fn new(config: CoordConfig) -> Self {
        Self {
            state: RwLock::new(CoordState::new()),
            config,
        }
    }

    pub fn config(&self) -> &CoordConfig {
        &self.config
    }

    /// Parse and dispatch a wire `(name, params)` pair.
    pub async fn dispatch_raw(
        &self,
        name: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, CoordError> {
        let method = Method::parse(name, params)?;
        self.dispatch(method).await
    }

    /// Route a typed method to its handler and serialize the result.
    pub async fn dispatch(&self, method: Method) -> Result<serde_json::Value, CoordError> {
        debug!("Dispatching {}", method.name());
        match method {
            Method::Register(p) => self.register(p).await.map(to_value),
            Method::Heartbeat(p) => self.heartbeat(p).await.map(to_value),
            Method::Unregister(p) => self.unregister(p).await.map(to_value),
            Method::ListInstances(p) => self.list_instances(p).await.map(to_value),
            Method::AssignTask(p) => self.assign_task(p).await.map(to_value),
            Method::UpdateTaskStatus(p) => self.update_task_status(p).await.map(to_value),
            Method::GetTask(p) => self.get_task(p).await.map(to_value),
            Method::ListTasks(p) => self.list_tasks(p).await.map(to_value),
            Method::RequestDeveloper(p) => self.request_developer(p).await.map(to_value),
            Method::ClaimResource(p) => self.claim_resource(p).await.map(to_value),
            Method::ReleaseResource(p) => self.release_resource(p).await.map(to_value),
            Method::CreateEntity(p) => self.create_entity(p).await.map(to_value),
            Method::UpdateEntity(p) => self.update_entity(p).await.map(to_value),
            Method::CreateRelation(p) => self.create_relation(p).await.map(to_value),
            Method::SearchEntities(p) => self.search_entities(p).await.map(to_value),
            Method::GetEntity(p) => self.get_entity(p).await.map(to_value),
            Method::DeleteEntity(p) => self.delete_entity(p).await.map(to_value),
            Method::GetStats => Ok(to_value(self.stats().await)),
            Method::DumpState => Ok(to_value(self.dump().await)),
        }
    }

    // -- Instance registry ---------------------------------------------

    pub async fn register(
        &self,
        params: RegisterParams,
    ) -> Result<RegisterResult, CoordError> {
        validate::validate_instance(&params.instance)?;
        let mut state = self.state.write().await;
        Ok(state.register_instance(params.instance, Utc::now()))
    }

    pub async fn heartbeat(
        &self,
        params: HeartbeatParams,
    ) -> Result<HeartbeatResult, CoordError> {
        validate::validate_instance_id(&params.instance_id)?;
        let mut state = self.state.write().await;
        state.heartbeat(&params.instance_id, params.status, params.metadata, Utc::now())
    }

    pub async fn unregister(
        &self,
        params: UnregisterParams,
    ) -> Result<UnregisterResult, CoordError> {
        validate::validate_instance_id(&params.instance_id)?;
        let mut state = self.state.write().await;
        Ok(state.unregister_instance(&params.instance_id))
    }

    pub async fn list_instances(
        &self,
        params: ListInstancesParams,
    ) -> Result<InstanceListResult, CoordError> {
        let state = self.state.read().await;
        let instances = state.list_instances(params.kind, params.status);
        let count = instances.len();
        Ok(InstanceListResult { instances, count })
    }

    // -- Task ledger ---------------------------------------------------

    pub async fn assign_task(
        &self,
        params: AssignTaskParams,
    ) -> Result<AssignResult, CoordError> {
        validate::validate_task_input(&params.task)?;
        let mut state = self.state.write().await;
        state.assign_task(params.task, Utc::now())
    }

    pub async fn update_task_status(
        &self,
        params: UpdateTaskStatusParams,
    ) -> Result<UpdateTaskStatusResult, CoordError> {
        let mut state = self.state.write().await;
        state.update_task_status(&params.task_id, params.status, params.metadata, Utc::now())
    }

    pub async fn get_task(&self, params: GetTaskParams) -> Result<GetTaskResult, CoordError> {
        let state = self.state.read().await;
        Ok(GetTaskResult {
            task: state.get_task(&params.task_id),
        })
    }

    pub async fn list_tasks(&self, params: ListTasksParams) -> Result<TaskListResult, CoordError> {
        let state = self.state.read().await;
        let tasks = state.list_tasks(&params);
        let count = tasks.len();
        Ok(TaskListResult { tasks, count })
    }

    pub async fn request_developer(
        &self,
        params: RequestDeveloperParams,
    ) -> Result<RequestDeveloperResult, CoordError> {
        let mut state = self.state.write().await;
        Ok(state.request_developer(
            params.issue_number,
            params.priority,
            params.requirements,
            Utc::now(),
        ))
    }

    // -- Resource leases -----------------------------------------------

    pub async fn claim_resource(
        &self,
        params: ClaimResourceParams,
    ) -> Result<ClaimResult, CoordError> {
        validate::validate_claim(&params)?;
        let mut state = self.state.write().await;
        Ok(state.claim_resource(
            params.resource_kind,
            params.resource_id,
            params.instance_id,
            params.operation,
            Utc::now(),
            self.config.claim_ttl(),
        ))
    }

    pub async fn release_resource(
        &self,
        params: ReleaseResourceParams,
    ) -> Result<ReleaseResult, CoordError> {
        validate::validate_release(&params)?;
        let mut state = self.state.write().await;
        Ok(state.release_resource(
            params.resource_kind,
            &params.resource_id,
            &params.instance_id,
        ))
    }

    // -- Knowledge graph -----------------------------------------------

    pub async fn create_entity(
        &self,
        params: CreateEntityParams,
    ) -> Result<CreateEntityResult, CoordError> {
        validate::validate_entity(&params)?;
        let mut state = self.state.write().await;
        state.create_entity(params, Utc::now())
    }

    pub async fn update_entity(
        &self,
        params: UpdateEntityParams,
    ) -> Result<UpdateEntityResult, CoordError> {
        validate::validate_entity_name(&params.name)?;
        let mut state = self.state.write().await;
        state.update_entity(&params.name, params.observations, params.metadata, Utc::now())
    }

    pub async fn create_relation(
        &self,
        params: CreateRelationParams,
    ) -> Result<CreateRelationResult, CoordError> {
        validate::validate_entity_name(&params.from)?;
        validate::validate_entity_name(&params.to)?;
        let mut state = self.state.write().await;
        state.create_relation(params, Utc::now())
    }

    pub async fn search_entities(
        &self,
        params: SearchEntitiesParams,
    ) -> Result<SearchEntitiesResult, CoordError> {
        let state = self.state.read().await;
        Ok(state.search_entities(&params))
    }

    pub async fn get_entity(
        &self,
        params: GetEntityParams,
    ) -> Result<GetEntityResult, CoordError> {
        validate::validate_entity_name(&params.name)?;
        let state = self.state.read().await;
        Ok(state.get_entity(&params.name))
    }

    pub async fn delete_entity(
        &self,
        params: DeleteEntityParams,
    ) -> Result<DeleteEntityResult, CoordError> {
        validate::validate_entity_name(&params.name)?;
        let mut state = self.state.write().await;
        Ok(state.delete_entity(&params.name))
    }

    // -- Introspection and maintenance ---------------------------------

    /// Aggregate counts. Observability only; never a control input.
    pub async fn stats(&self) -> StatsResult {
        let state = self.state.read().await;
        let now = Utc::now();
        let uptime_secs = (now - state.started_at()).num_seconds().max(0) as u64;
        StatsResult {
            uptime_secs,
            started_at: state.started_at(),
            instances: state.instance_count(),
            tasks: state.task_count(),
            claims: state.claim_count(),
            entities: state.entity_count(),
            relations: state.relation_count(),
        }
    }

    /// Full dump of the coordination collections, for debugging.
    pub async fn dump(&self) -> DumpResult {
        let state = self.state.read().await;
        let instances = state.list_instances(None, None);
        let tasks = state.list_tasks(&ListTasksParams::default());
        let mut claims: Vec<_> = state.claims.values().cloned().collect();
        claims.sort_by(|a, b| a.claimed_at.cmp(&b.claimed_at).then(a.id.cmp(&b.id)));
        DumpResult {
            instances,
            tasks,
            claims,
        }
    }

    /// One maintenance pass: drop expired claims and mark stale instances
    /// offline, under a single write lock acquisition.
    pub async fn sweep(&self) -> SweepReport {
        let mut state = self.state.write().await;
        let now = Utc::now();
        SweepReport {
            expired_claims: state.sweep_expired_claims(now),
            stale_instances: state.mark_stale_offline(now, self.config.instance_stale()),
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
