//! Task assignment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::Metadata;

/// Kind of delegated work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Develop,
    Review,
    Test,
}

impl TaskKind {
    /// Capability name an instance must advertise to receive this kind of
    /// task.
    pub fn capability(&self) -> &'static str {
        match self {
            TaskKind::Develop => "develop",
            TaskKind::Review => "review",
            TaskKind::Test => "test",
        }
    }
}

/// Lifecycle status of a task. Transitions are recorded as reported; the
/// ledger does not enforce ordering between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Task priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Specification block attached to developer-requested tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpecification {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub priority: TaskPriority,
}

/// A unit of delegated work recorded in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    /// Server-generated unique id.
    pub id: String,
    pub kind: TaskKind,
    /// Instance the task is assigned to. Checked against the registry at
    /// creation time only; the instance may vanish afterwards.
    pub assigned_to: String,
    /// Instance id or `"system"`.
    pub assigned_by: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specification: Option<TaskSpecification>,
}

impl TaskAssignment {
    /// Create a pending task with a generated id, stamped at `now`.
    pub fn new(
        kind: TaskKind,
        assigned_to: impl Into<String>,
        assigned_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            assigned_to: assigned_to.into(),
            assigned_by: assigned_by.into(),
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            metadata: Metadata::new(),
            issue_number: None,
            pull_request_number: None,
            specification: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_issue_number(mut self, issue: u64) -> Self {
        self.issue_number = Some(issue);
        self
    }

    pub fn with_pull_request_number(mut self, pr: u64) -> Self {
        self.pull_request_number = Some(pr);
        self
    }

    pub fn with_specification(mut self, spec: TaskSpecification) -> Self {
        self.specification = Some(spec);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_new_defaults() {
        let task = TaskAssignment::new(TaskKind::Develop, "dev-1", "system", Utc::now());
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.created_at, task.updated_at);
        assert!(task.issue_number.is_none());
        assert!(!task.id.is_empty());
    }

    #[test]
    fn test_task_ids_are_unique() {
        let now = Utc::now();
        let a = TaskAssignment::new(TaskKind::Test, "t-1", "system", now);
        let b = TaskAssignment::new(TaskKind::Test, "t-1", "system", now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_task_kind_capability() {
        assert_eq!(TaskKind::Develop.capability(), "develop");
        assert_eq!(TaskKind::Review.capability(), "review");
        assert_eq!(TaskKind::Test.capability(), "test");
    }

    #[test]
    fn test_priority_default_and_order() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert!(TaskPriority::Critical > TaskPriority::High);
        assert!(TaskPriority::High > TaskPriority::Medium);
        assert!(TaskPriority::Medium > TaskPriority::Low);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_task_wire_field_names() {
        let task = TaskAssignment::new(TaskKind::Review, "rev-1", "dev-1", Utc::now())
            .with_issue_number(42);
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("assignedTo").is_some());
        assert!(value.get("issueNumber").is_some());
        assert!(value.get("pullRequestNumber").is_none());
    }
}
