use crate::backend::{document, unique_id, BackendClient, Collection, Query};
use crate::error::{AppError, AppResult};
use crate::models::{NewTask, Task, TaskFilters, TaskPatch, TaskSort};

/// Task CRUD plus the attachment/comment surface, which is not available yet.
#[derive(Clone)]
pub struct TaskService {
    backend: BackendClient,
}

impl TaskService {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn create(&self, data: &NewTask) -> AppResult<Task> {
        let result: AppResult<Task> = async {
            let payload = document::to_data(data)?;
            self.backend
                .collection(Collection::Tasks)
                .create(&unique_id(), payload)
                .await?
                .into_record()
        }
        .await;
        result.inspect_err(|e| tracing::error!("Error creating task: {}", e))
    }

    pub async fn get(&self, id: &str) -> AppResult<Task> {
        let result: AppResult<Task> = async {
            self.backend
                .collection(Collection::Tasks)
                .get(id)
                .await?
                .into_record()
        }
        .await;
        result.inspect_err(|e| tracing::error!("Error fetching task {}: {}", id, e))
    }

    pub async fn list(&self, project_id: &str, filters: &TaskFilters) -> AppResult<Vec<Task>> {
        let queries = Self::list_queries(project_id, filters);
        let result: AppResult<Vec<Task>> = async {
            self.backend
                .collection(Collection::Tasks)
                .list(&queries)
                .await?
                .into_records()
        }
        .await;
        result.inspect_err(|e| tracing::error!("Error listing tasks for project {}: {}", project_id, e))
    }

    pub async fn update(&self, id: &str, patch: &TaskPatch) -> AppResult<Task> {
        let result: AppResult<Task> = async {
            let payload = document::to_data(patch)?;
            self.backend
                .collection(Collection::Tasks)
                .update(id, payload)
                .await?
                .into_record()
        }
        .await;
        result.inspect_err(|e| tracing::error!("Error updating task {}: {}", id, e))
    }

    /// Attachment files go first, best effort: a failed file deletion is logged
    /// and skipped, and never stops the document deletion.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result: AppResult<()> = async {
            let task = self.get(id).await?;
            let bucket = &self.backend.config().attachments_bucket_id;
            for file_id in &task.attachments {
                if let Err(e) = self.backend.storage().delete_file(bucket, file_id).await {
                    tracing::warn!("Could not delete attachment {} for task {}: {}", file_id, id, e);
                }
            }
            self.backend.collection(Collection::Tasks).delete(id).await
        }
        .await;
        result.inspect_err(|e| tracing::error!("Error deleting task {}: {}", id, e))
    }

    pub async fn upload_attachment(&self, _task_id: &str, _file_name: &str, _bytes: &[u8]) -> AppResult<String> {
        tracing::warn!("Attachment upload not fully implemented. Bucket ID needed.");
        Err(AppError::NotImplemented("Attachment upload"))
    }

    pub async fn attachment_url(&self, _file_id: &str) -> AppResult<url::Url> {
        tracing::warn!("Get attachment URL not fully implemented. Bucket ID needed.");
        Err(AppError::NotImplemented("Get attachment URL"))
    }

    pub async fn delete_attachment(&self, _task_id: &str, _file_id: &str) -> AppResult<()> {
        tracing::warn!("Delete attachment not fully implemented. Bucket ID needed.");
        Err(AppError::NotImplemented("Delete attachment"))
    }

    pub async fn add_comment(&self, _task_id: &str, _user_id: &str, _content: &str) -> AppResult<()> {
        tracing::warn!("Add task comment not fully implemented. Comments collection needed.");
        Err(AppError::NotImplemented("Add task comment"))
    }

    pub async fn list_comments(&self, _task_id: &str) -> AppResult<Vec<serde_json::Value>> {
        tracing::warn!("List task comments not fully implemented. Comments collection needed.");
        Err(AppError::NotImplemented("List task comments"))
    }

    fn list_queries(project_id: &str, filters: &TaskFilters) -> Vec<Query> {
        let mut queries = vec![Query::equal("projectId", project_id)];
        if let Some(status) = filters.status {
            queries.push(Query::equal("status", status.to_string()));
        }
        if let Some(assignee) = &filters.assignee_id {
            queries.push(Query::equal("assigneeId", assignee.as_str()));
        }
        if let Some(milestone) = &filters.milestone_id {
            queries.push(Query::equal("milestoneId", milestone.as_str()));
        }
        queries.push(match filters.sort_by {
            Some(TaskSort::DueDateAsc) => Query::order_asc("dueDate"),
            Some(TaskSort::DueDateDesc) => Query::order_desc("dueDate"),
            None => Query::order_desc("$createdAt"),
        });
        tracing::debug!("task list queries: {:?}", queries);
        queries
    }
}
