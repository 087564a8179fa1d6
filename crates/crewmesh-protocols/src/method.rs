//! Method dispatch surface.
//!
//! The wire exposes a method name plus an untyped JSON parameter payload.
//! Internally that pair is parsed into the closed [`Method`] enum, one
//! variant per operation, each carrying a typed parameter struct. An
//! unrecognized name is [`CoordError::UnknownMethod`]; a payload that does
//! not deserialize is [`CoordError::Validation`], rejected before any state
//! is touched.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CoordError;
use crate::types::{
    Instance, InstanceKind, InstanceStatus, MemoryEntity, MemoryRelation, Metadata, RelationType,
    ResourceClaim, ResourceKind, TaskAssignment, TaskKind, TaskPriority, TaskSpecification,
    TaskStatus,
};

/// Instance payload accepted by `register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSpec {
    pub id: String,
    pub kind: InstanceKind,
    pub status: InstanceStatus,
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Task payload accepted by `assign_task`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub kind: TaskKind,
    pub assigned_to: String,
    pub assigned_by: String,
    #[serde(default)]
    pub issue_number: Option<u64>,
    #[serde(default)]
    pub pull_request_number: Option<u64>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub specification: Option<TaskSpecification>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParams {
    pub instance: InstanceSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatParams {
    pub instance_id: String,
    pub status: InstanceStatus,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnregisterParams {
    pub instance_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInstancesParams {
    #[serde(default)]
    pub kind: Option<InstanceKind>,
    #[serde(default)]
    pub status: Option<InstanceStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskParams {
    pub task: TaskInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusParams {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTaskParams {
    pub task_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksParams {
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub assigned_by: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub kind: Option<TaskKind>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDeveloperParams {
    pub issue_number: u64,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResourceParams {
    pub resource_kind: ResourceKind,
    pub resource_id: String,
    pub instance_id: String,
    pub operation: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResourceParams {
    pub resource_kind: ResourceKind,
    pub resource_id: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityParams {
    pub name: String,
    pub entity_type: String,
    pub observations: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntityParams {
    pub name: String,
    #[serde(default)]
    pub observations: Vec<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

fn default_strength() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRelationParams {
    pub from: String,
    pub to: String,
    pub relation_type: RelationType,
    #[serde(default = "default_strength")]
    pub strength: f64,
    #[serde(default)]
    pub metadata: Metadata,
}

fn default_search_limit() -> usize {
    50
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntitiesParams {
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Case-insensitive substring matched against observation text.
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

impl Default for SearchEntitiesParams {
    fn default() -> Self {
        Self {
            entity_name: None,
            entity_type: None,
            observations: None,
            limit: default_search_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEntityParams {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntityParams {
    pub name: String,
}

/// One operation on the coordination surface.
#[derive(Debug, Clone)]
pub enum Method {
    Register(RegisterParams),
    Heartbeat(HeartbeatParams),
    Unregister(UnregisterParams),
    ListInstances(ListInstancesParams),
    AssignTask(AssignTaskParams),
    UpdateTaskStatus(UpdateTaskStatusParams),
    GetTask(GetTaskParams),
    ListTasks(ListTasksParams),
    RequestDeveloper(RequestDeveloperParams),
    ClaimResource(ClaimResourceParams),
    ReleaseResource(ReleaseResourceParams),
    CreateEntity(CreateEntityParams),
    UpdateEntity(UpdateEntityParams),
    CreateRelation(CreateRelationParams),
    SearchEntities(SearchEntitiesParams),
    GetEntity(GetEntityParams),
    DeleteEntity(DeleteEntityParams),
    GetStats,
    DumpState,
}

fn parse_params<T: DeserializeOwned>(
    method: &str,
    params: serde_json::Value,
) -> Result<T, CoordError> {
    // A missing payload is treated as an empty object so that methods with
    // all-optional parameters accept it.
    let params = if params.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params)
        .map_err(|e| CoordError::Validation(format!("{}: {}", method, e)))
}

impl Method {
    /// Parse a wire `(name, params)` pair into a typed method.
    pub fn parse(name: &str, params: serde_json::Value) -> Result<Self, CoordError> {
        match name {
            "register" => Ok(Method::Register(parse_params(name, params)?)),
            "heartbeat" => Ok(Method::Heartbeat(parse_params(name, params)?)),
            "unregister" => Ok(Method::Unregister(parse_params(name, params)?)),
            "list_instances" => Ok(Method::ListInstances(parse_params(name, params)?)),
            "assign_task" => Ok(Method::AssignTask(parse_params(name, params)?)),
            "update_task_status" => Ok(Method::UpdateTaskStatus(parse_params(name, params)?)),
            "get_task" => Ok(Method::GetTask(parse_params(name, params)?)),
            "list_tasks" => Ok(Method::ListTasks(parse_params(name, params)?)),
            "request_developer" => Ok(Method::RequestDeveloper(parse_params(name, params)?)),
            "claim_resource" => Ok(Method::ClaimResource(parse_params(name, params)?)),
            "release_resource" => Ok(Method::ReleaseResource(parse_params(name, params)?)),
            "memory.create_entity" => Ok(Method::CreateEntity(parse_params(name, params)?)),
            "memory.update_entity" => Ok(Method::UpdateEntity(parse_params(name, params)?)),
            "memory.create_relation" => Ok(Method::CreateRelation(parse_params(name, params)?)),
            "memory.search_entities" => Ok(Method::SearchEntities(parse_params(name, params)?)),
            "memory.get_entity" => Ok(Method::GetEntity(parse_params(name, params)?)),
            "memory.delete_entity" => Ok(Method::DeleteEntity(parse_params(name, params)?)),
            "get_stats" => Ok(Method::GetStats),
            "dump_state" => Ok(Method::DumpState),
            other => Err(CoordError::UnknownMethod(other.to_string())),
        }
    }

    /// Wire name of the method, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Register(_) => "register",
            Method::Heartbeat(_) => "heartbeat",
            Method::Unregister(_) => "unregister",
            Method::ListInstances(_) => "list_instances",
            Method::AssignTask(_) => "assign_task",
            Method::UpdateTaskStatus(_) => "update_task_status",
            Method::GetTask(_) => "get_task",
            Method::ListTasks(_) => "list_tasks",
            Method::RequestDeveloper(_) => "request_developer",
            Method::ClaimResource(_) => "claim_resource",
            Method::ReleaseResource(_) => "release_resource",
            Method::CreateEntity(_) => "memory.create_entity",
            Method::UpdateEntity(_) => "memory.update_entity",
            Method::CreateRelation(_) => "memory.create_relation",
            Method::SearchEntities(_) => "memory.search_entities",
            Method::GetEntity(_) => "memory.get_entity",
            Method::DeleteEntity(_) => "memory.delete_entity",
            Method::GetStats => "get_stats",
            Method::DumpState => "dump_state",
        }
    }
}

// ---------------------------------------------------------------------------
// Result payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResult {
    pub registered: bool,
    pub instance_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatResult {
    pub acknowledged: bool,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnregisterResult {
    /// Whether an instance with the given id existed.
    pub removed: bool,
    /// Number of resource claims released by the cascade.
    pub released_claims: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceListResult {
    pub instances: Vec<Instance>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignResult {
    pub task_id: String,
    pub assigned: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusResult {
    pub updated: bool,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTaskResult {
    pub task: Option<TaskAssignment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResult {
    pub tasks: Vec<TaskAssignment>,
    pub count: usize,
}

/// Outcome of `request_developer`. An empty `task_id` with a null
/// `assigned_to` is the "no capacity" soft signal, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDeveloperResult {
    pub task_id: String,
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_start: Option<DateTime<Utc>>,
}

/// Outcome of `claim_resource`. Contention is a successful response with
/// `claimed: false` and the conflicting holder ids.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResult {
    pub claimed: bool,
    pub conflicts_with: Vec<String>,
}

impl ClaimResult {
    pub fn granted() -> Self {
        Self {
            claimed: true,
            conflicts_with: Vec::new(),
        }
    }

    pub fn denied(conflicts_with: Vec<String>) -> Self {
        Self {
            claimed: false,
            conflicts_with,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResult {
    /// Whether a matching claim existed.
    pub released: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityResult {
    pub created: bool,
    pub name: String,
    pub version: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntityResult {
    pub updated: bool,
    pub version: u32,
    pub observations_added: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRelationResult {
    pub created: bool,
    pub relation_id: String,
    pub strength: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntitiesResult {
    pub entities: Vec<MemoryEntity>,
    /// Every relation touching any entity in `entities`.
    pub relations: Vec<MemoryRelation>,
    /// Count after truncation to `limit`.
    pub total_results: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEntityResult {
    pub entity: Option<MemoryEntity>,
    pub relations: Vec<MemoryRelation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntityResult {
    pub deleted: bool,
    pub relations_removed: usize,
}

/// Aggregate counts for observability. Never a control-decision input.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResult {
    pub uptime_secs: u64,
    pub started_at: DateTime<Utc>,
    pub instances: usize,
    pub tasks: usize,
    pub claims: usize,
    pub entities: usize,
    pub relations: usize,
}

/// Full dump of the coordination collections, for debugging only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpResult {
    pub instances: Vec<Instance>,
    pub tasks: Vec<TaskAssignment>,
    pub claims: Vec<ResourceClaim>,
}

#[cfg(test)]
#[path = "method_tests.rs"]
mod tests;
