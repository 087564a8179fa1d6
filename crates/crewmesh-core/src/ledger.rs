//! Task ledger operations.
//!
//! The ledger records assignment decisions made by callers; it never
//! schedules work itself. Tasks are append-only: status updates mutate them
//! but nothing deletes them.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crewmesh_protocols::error::CoordError;
use crewmesh_protocols::method::{
    AssignResult, ListTasksParams, RequestDeveloperResult, TaskInput, UpdateTaskStatusResult,
};
use crewmesh_protocols::types::{
    merge_metadata, Metadata, TaskAssignment, TaskKind, TaskPriority, TaskSpecification,
    TaskStatus,
};

use crate::state::CoordState;

impl CoordState {
    /// Record a task assignment. The assignee must be registered right now;
    /// it is not re-checked later.
    pub fn assign_task(
        &mut self,
        input: TaskInput,
        now: DateTime<Utc>,
    ) -> Result<AssignResult, CoordError> {
        if !self.instances.contains_key(&input.assigned_to) {
            return Err(CoordError::NotFound(format!(
                "instance {}",
                input.assigned_to
            )));
        }

        let mut task = TaskAssignment::new(input.kind, input.assigned_to, input.assigned_by, now)
            .with_metadata(input.metadata);
        task.issue_number = input.issue_number;
        task.pull_request_number = input.pull_request_number;
        task.specification = input.specification;

        let task_id = task.id.clone();
        info!("Assigned {:?} task {} to {}", task.kind, task_id, task.assigned_to);
        self.tasks.insert(task_id.clone(), task);

        Ok(AssignResult {
            task_id,
            assigned: true,
        })
    }

    /// Update a task's status and merge metadata. Any status may follow any
    /// other; the ledger records transitions without judging them.
    pub fn update_task_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
        metadata: Option<Metadata>,
        now: DateTime<Utc>,
    ) -> Result<UpdateTaskStatusResult, CoordError> {
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| CoordError::NotFound(format!("task {}", task_id)))?;

        task.status = status;
        task.updated_at = now;
        if let Some(incoming) = metadata {
            merge_metadata(&mut task.metadata, incoming);
        }

        debug!("Task {} -> {:?}", task_id, status);
        Ok(UpdateTaskStatusResult {
            updated: true,
            status,
        })
    }

    /// Look up a task. Absence is a null result, not an error.
    pub fn get_task(&self, task_id: &str) -> Option<TaskAssignment> {
        self.tasks.get(task_id).cloned()
    }

    /// List tasks matching all provided filters, oldest first.
    pub fn list_tasks(&self, filter: &ListTasksParams) -> Vec<TaskAssignment> {
        let mut tasks: Vec<TaskAssignment> = self
            .tasks
            .values()
            .filter(|t| {
                filter
                    .assigned_to
                    .as_ref()
                    .is_none_or(|id| &t.assigned_to == id)
            })
            .filter(|t| {
                filter
                    .assigned_by
                    .as_ref()
                    .is_none_or(|id| &t.assigned_by == id)
            })
            .filter(|t| filter.status.is_none_or(|s| t.status == s))
            .filter(|t| filter.kind.is_none_or(|k| t.kind == k))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        tasks
    }

    /// Convenience composite: pick an available developer and assign a
    /// synthesized development task for an issue. No capacity is a soft
    /// signal (empty task id, null assignee), not an error.
    pub fn request_developer(
        &mut self,
        issue_number: u64,
        priority: TaskPriority,
        requirements: Vec<String>,
        now: DateTime<Utc>,
    ) -> RequestDeveloperResult {
        let Some(instance) = self.find_available(TaskKind::Develop, &[]) else {
            info!("No developer available for issue #{}", issue_number);
            return RequestDeveloperResult {
                task_id: String::new(),
                assigned_to: None,
                estimated_start: None,
            };
        };
        let assigned_to = instance.id.clone();

        let specification = TaskSpecification {
            title: format!("Implement issue #{}", issue_number),
            description: format!(
                "Development work requested for issue #{}. See the issue thread for context.",
                issue_number
            ),
            requirements,
            acceptance_criteria: vec![
                format!("Issue #{} requirements are implemented", issue_number),
                "Existing tests pass and new behavior is covered".to_string(),
            ],
            priority,
        };

        let task = TaskAssignment::new(TaskKind::Develop, assigned_to.clone(), "system", now)
            .with_issue_number(issue_number)
            .with_specification(specification);
        let task_id = task.id.clone();
        info!(
            "Requested developer for issue #{}: task {} -> {}",
            issue_number, task_id, assigned_to
        );
        self.tasks.insert(task_id.clone(), task);

        RequestDeveloperResult {
            task_id,
            assigned_to: Some(assigned_to),
            estimated_start: Some(now),
        }
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
