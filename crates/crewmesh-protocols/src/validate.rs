//! Pure payload validation.
//!
//! Shape checks applied after deserialization and before any state
//! mutation. Enum membership is already enforced by the typed parse; these
//! functions cover the constraints serde cannot express: non-empty
//! identifiers and non-empty collections. A failed check leaves state
//! untouched.

use crate::error::CoordError;
use crate::method::{
    ClaimResourceParams, CreateEntityParams, InstanceSpec, ReleaseResourceParams, TaskInput,
};

fn require_non_empty(field: &str, value: &str) -> Result<(), CoordError> {
    if value.trim().is_empty() {
        return Err(CoordError::Validation(format!(
            "missing required field: {}",
            field
        )));
    }
    Ok(())
}

/// Validate a `register` payload: id present, at least one capability.
pub fn validate_instance(spec: &InstanceSpec) -> Result<(), CoordError> {
    require_non_empty("instance.id", &spec.id)?;
    if spec.capabilities.is_empty() {
        return Err(CoordError::Validation(
            "instance.capabilities must contain at least one entry".to_string(),
        ));
    }
    if spec.capabilities.iter().any(|c| c.trim().is_empty()) {
        return Err(CoordError::Validation(
            "instance.capabilities entries must be non-empty".to_string(),
        ));
    }
    Ok(())
}

/// Validate an `assign_task` payload: both participant ids present.
pub fn validate_task_input(task: &TaskInput) -> Result<(), CoordError> {
    require_non_empty("task.assignedTo", &task.assigned_to)?;
    require_non_empty("task.assignedBy", &task.assigned_by)?;
    Ok(())
}

/// Validate a `claim_resource` payload.
pub fn validate_claim(params: &ClaimResourceParams) -> Result<(), CoordError> {
    require_non_empty("resourceId", &params.resource_id)?;
    require_non_empty("instanceId", &params.instance_id)?;
    require_non_empty("operation", &params.operation)?;
    Ok(())
}

/// Validate a `release_resource` payload.
pub fn validate_release(params: &ReleaseResourceParams) -> Result<(), CoordError> {
    require_non_empty("resourceId", &params.resource_id)?;
    require_non_empty("instanceId", &params.instance_id)?;
    Ok(())
}

/// Validate a `memory.create_entity` payload.
pub fn validate_entity(params: &CreateEntityParams) -> Result<(), CoordError> {
    require_non_empty("name", &params.name)?;
    require_non_empty("entityType", &params.entity_type)?;
    Ok(())
}

/// Validate a bare instance id parameter (heartbeat, unregister).
pub fn validate_instance_id(instance_id: &str) -> Result<(), CoordError> {
    require_non_empty("instanceId", instance_id)
}

/// Validate a bare entity name parameter.
pub fn validate_entity_name(name: &str) -> Result<(), CoordError> {
    require_non_empty("name", name)
}
