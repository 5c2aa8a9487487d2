use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
    Blocked,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default)]
    pub milestone_id: Option<String>,
    pub creator_id: String,
    /// File ids in the attachments bucket
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub attachments: Vec<String>,
}

impl Task {
    pub fn is_pending(&self) -> bool {
        self.status != TaskStatus::Done
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub project_id: String,
    pub assignee_id: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub milestone_id: Option<String>,
    pub creator_id: String,
}

/// Partial update. There is no project field: a task never moves between projects.
/// The nullable references use `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<Option<String>>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSort {
    DueDateAsc,
    DueDateDesc,
}

impl TaskSort {
    /// Unknown keys (e.g. `priorityDesc`) yield `None` and are ignored by listings
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "dueDateAsc" => Some(TaskSort::DueDateAsc),
            "dueDateDesc" => Some(TaskSort::DueDateDesc),
            _ => None,
        }
    }
}

/// Listing filters; all given ones must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<String>,
    pub milestone_id: Option<String>,
    pub sort_by: Option<TaskSort>,
}

impl TaskFilters {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn sorted(mut self, key: &str) -> Self {
        self.sort_by = TaskSort::from_key(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn status_wire_names() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), json!("inprogress"));
        assert_eq!(TaskStatus::from_str("blocked").unwrap(), TaskStatus::Blocked);
        assert_eq!(TaskPriority::Urgent.to_string(), "urgent");
    }

    #[test]
    fn sort_keys() {
        assert_eq!(TaskSort::from_key("dueDateAsc"), Some(TaskSort::DueDateAsc));
        assert_eq!(TaskSort::from_key("priorityDesc"), None);
        assert_eq!(TaskFilters::default().sorted("bogus").sort_by, None);
    }

    #[test]
    fn patch_clears_assignee_with_null() {
        let patch = TaskPatch {
            assignee_id: Some(None),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(patch).unwrap(), json!({"assigneeId": null}));
    }
}
