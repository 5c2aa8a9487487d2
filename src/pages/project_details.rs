use crate::error::AppResult;
use crate::forms::TaskForm;
use crate::models::{Project, Task, TaskFilters, TaskStatus};
use crate::router::Route;

use super::{PageContext, PageData};

/// A project with its task list and the task dialog actions
pub struct ProjectDetailsPage {
    ctx: PageContext,
    project_id: String,
    pub project: PageData<Project>,
    pub tasks: PageData<Vec<Task>>,
    /// `None` shows every status
    status_filter: Option<TaskStatus>,
    redirect: Option<Route>,
}

impl ProjectDetailsPage {
    pub fn new(ctx: PageContext, project_id: impl Into<String>) -> Self {
        Self {
            ctx,
            project_id: project_id.into(),
            project: PageData::new(),
            tasks: PageData::new(),
            status_filter: None,
            redirect: None,
        }
    }

    /// Filter applied from the first load onwards
    pub fn with_status_filter(mut self, status: Option<TaskStatus>) -> Self {
        self.status_filter = status;
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn status_filter(&self) -> Option<TaskStatus> {
        self.status_filter
    }

    /// Set when the project could not be loaded
    pub fn redirect(&self) -> Option<&Route> {
        self.redirect.as_ref()
    }

    /// Project and tasks are fetched concurrently
    pub async fn load(&mut self) -> AppResult<()> {
        let filters = self.filters();
        let services = &self.ctx.services;
        let (project, tasks) = futures::join!(
            self.ctx.load(
                &mut self.project,
                "Failed to load project",
                services.projects.get(&self.project_id)
            ),
            self.ctx.load(
                &mut self.tasks,
                "Failed to load tasks",
                services.tasks.list(&self.project_id, &filters)
            ),
        );
        if project.is_err() {
            self.redirect = Some(Route::Projects);
        }
        project.and(tasks)
    }

    pub async fn load_tasks(&mut self) -> AppResult<()> {
        let filters = self.filters();
        let fetch = self.ctx.services.tasks.list(&self.project_id, &filters);
        self.ctx.load(&mut self.tasks, "Failed to load tasks", fetch).await
    }

    pub async fn set_status_filter(&mut self, status: Option<TaskStatus>) -> AppResult<()> {
        self.status_filter = status;
        self.load_tasks().await
    }

    fn filters(&self) -> TaskFilters {
        TaskFilters {
            status: self.status_filter,
            ..Default::default()
        }
    }

    pub async fn create_task(&mut self, form: &TaskForm) -> AppResult<Task> {
        let ctx = &self.ctx;
        let project_id = &self.project_id;
        let created = ctx
            .mutate("Task created successfully!", "Task operation failed", async {
                let creator = ctx.identity()?;
                let payload = form.submit(project_id, creator.id())?;
                ctx.services.tasks.create(&payload).await
            })
            .await?;
        self.reload_tasks().await;
        Ok(created)
    }

    pub async fn update_task(&mut self, task_id: &str, form: &TaskForm) -> AppResult<Task> {
        let ctx = &self.ctx;
        let updated = ctx
            .mutate("Task updated successfully!", "Task operation failed", async {
                let patch = form.submit_patch()?;
                ctx.services.tasks.update(task_id, &patch).await
            })
            .await?;
        self.reload_tasks().await;
        Ok(updated)
    }

    pub async fn delete_task(&mut self, task_id: &str) -> AppResult<()> {
        self.ctx
            .mutate(
                "Task deleted successfully",
                "Error deleting task",
                self.ctx.services.tasks.delete(task_id),
            )
            .await?;
        self.reload_tasks().await;
        Ok(())
    }

    /// Follow-up fetch after a committed mutation; a failure is only shown
    async fn reload_tasks(&mut self) {
        if let Err(e) = self.load_tasks().await {
            tracing::warn!("Task list for project {} left stale: {}", self.project_id, e);
        }
    }

    /// The edit link is offered to the owner and administrators only
    pub fn can_edit(&self) -> bool {
        match (self.ctx.session.identity(), self.project.data()) {
            (Some(identity), Some(project)) => project.is_managed_by(&identity),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::TaskPriority;
    use crate::testing::{user, MemoryBackend};
    use serde_json::json;
    use std::sync::Arc;

    async fn page(backend: &Arc<MemoryBackend>) -> ProjectDetailsPage {
        backend.sign_in(user("u1", "Ada", &[]));
        backend.seed(
            "projects",
            "p1",
            json!({"name": "Alpha", "startDate": "2024-01-01T00:00:00Z",
                   "endDate": "2024-06-01T00:00:00Z", "status": "active", "ownerId": "u1"}),
        );
        let ctx = PageContext::for_backend(backend);
        ctx.session.initialize().await;
        ProjectDetailsPage::new(ctx, "p1")
    }

    #[tokio::test]
    async fn create_task_and_filter() {
        let backend = MemoryBackend::new();
        let mut page = page(&backend).await;
        page.load().await.unwrap();

        let form = TaskForm {
            title: "Design".into(),
            priority: TaskPriority::High,
            ..Default::default()
        };
        let task = page.create_task(&form).await.unwrap();
        assert_eq!(task.creator_id, "u1");
        assert_eq!(page.tasks.data().unwrap().len(), 1);

        page.set_status_filter(Some(TaskStatus::Done)).await.unwrap();
        assert!(page.tasks.data().unwrap().is_empty());
        page.set_status_filter(None).await.unwrap();
        assert_eq!(page.tasks.data().unwrap()[0].id, task.id);
        assert!(page.can_edit());
    }

    #[tokio::test]
    async fn invalid_task_never_reaches_backend() {
        let backend = MemoryBackend::new();
        let mut page = page(&backend).await;
        page.load().await.unwrap();

        let err = page.create_task(&TaskForm::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert!(!backend.calls().iter().any(|c| c == "create:tasks"));
        assert_eq!(
            page.ctx.app.notification().message,
            "Task operation failed: Task title is required."
        );
    }

    #[tokio::test]
    async fn committed_create_survives_failed_reload() {
        let backend = MemoryBackend::new();
        let mut page = page(&backend).await;
        page.load().await.unwrap();

        backend.fail_call("list:tasks", AppError::remote(503, None, "unavailable"));
        let form = TaskForm {
            title: "Design".into(),
            ..Default::default()
        };
        let task = page.create_task(&form).await.unwrap();

        assert_eq!(task.title, "Design");
        assert_eq!(backend.document_count("tasks"), 1);
        assert!(page.tasks.data().unwrap().is_empty());
        assert_eq!(
            page.ctx.app.notification().message,
            "Failed to load tasks: unavailable"
        );

        page.delete_task(&task.id).await.unwrap();
        assert_eq!(backend.document_count("tasks"), 0);
    }

    #[tokio::test]
    async fn missing_project_redirects_to_list() {
        let backend = MemoryBackend::new();
        backend.sign_in(user("u1", "Ada", &[]));
        let ctx = PageContext::for_backend(&backend);
        ctx.session.initialize().await;
        let mut page = ProjectDetailsPage::new(ctx, "nope");

        assert!(page.load().await.is_err());
        assert_eq!(page.redirect(), Some(&Route::Projects));
        assert!(!page.can_edit());
    }
}
