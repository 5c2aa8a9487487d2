use chrono::{DateTime, Utc};
use validator::Validate;

use crate::error::AppResult;
use crate::models::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};

/// Staged task edits. Empty assignee/milestone strings mean "unassigned".
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct TaskForm {
    #[validate(length(min = 1, message = "Task title is required."))]
    pub title: String,
    pub description: String,
    pub assignee_id: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub milestone_id: String,
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            assignee_id: task.assignee_id.clone().unwrap_or_default(),
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            milestone_id: task.milestone_id.clone().unwrap_or_default(),
        }
    }

    /// Create payload linked to `project_id`, authored by `creator_id`
    pub fn submit(&self, project_id: &str, creator_id: &str) -> AppResult<NewTask> {
        self.validate()?;
        Ok(NewTask {
            title: self.title.clone(),
            description: non_empty(&self.description),
            project_id: project_id.to_string(),
            assignee_id: non_empty(&self.assignee_id),
            due_date: self.due_date,
            priority: self.priority,
            status: self.status,
            milestone_id: non_empty(&self.milestone_id),
            creator_id: creator_id.to_string(),
        })
    }

    /// Edit payload; blank references are sent as explicit nulls
    pub fn submit_patch(&self) -> AppResult<TaskPatch> {
        self.validate()?;
        Ok(TaskPatch {
            title: Some(self.title.clone()),
            description: Some(non_empty(&self.description)),
            assignee_id: Some(non_empty(&self.assignee_id)),
            due_date: Some(self.due_date),
            priority: Some(self.priority),
            status: Some(self.status),
            milestone_id: Some(non_empty(&self.milestone_id)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn title_required() {
        let err = TaskForm::new().submit("p1", "u1").unwrap_err();
        assert_eq!(err.to_string(), "Task title is required.");
    }

    #[test]
    fn defaults_match_new_task_dialog() {
        let form = TaskForm {
            title: "Design".into(),
            ..Default::default()
        };
        let task = form.submit("p1", "u1").unwrap();
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.assignee_id, None);
        assert_eq!(task.project_id, "p1");
    }

    #[test]
    fn patch_clears_blank_references() {
        let form = TaskForm {
            title: "Design".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(form.submit_patch().unwrap()).unwrap();
        assert_eq!(value["assigneeId"], json!(null));
        assert_eq!(value["milestoneId"], json!(null));
        assert_eq!(value["description"], json!(null));
        assert!(value.get("projectId").is_none());
    }
}
