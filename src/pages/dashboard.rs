use futures::future::try_join_all;
use serde::Serialize;

use crate::backend::Document;
use crate::error::{AppError, AppResult};
use crate::models::{Project, TaskFilters};

use super::{PageContext, PageData};

pub const RECENT_PROJECTS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardData {
    pub recent_projects: Vec<Project>,
    /// Tasks not yet `done` across the recent projects
    pub pending_tasks: usize,
    /// Milestones are not served by any service yet; always empty
    pub upcoming_milestones: Vec<Document>,
}

pub struct DashboardPage {
    ctx: PageContext,
    pub data: PageData<DashboardData>,
}

impl DashboardPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            data: PageData::new(),
        }
    }

    /// No-op without a signed-in user
    pub async fn load(&mut self) -> AppResult<()> {
        let Some(identity) = self.ctx.session.identity() else {
            return Ok(());
        };
        let _busy = self.ctx.app.begin_busy();
        let services = &self.ctx.services;
        let fetch = async {
            let mut projects = services.projects.list(identity.id(), identity.is_admin()).await?;
            projects.truncate(RECENT_PROJECTS);

            let filters = TaskFilters::default();
            let task_lists = try_join_all(projects.iter().map(|p| services.tasks.list(&p.id, &filters))).await?;
            let pending_tasks = task_lists.iter().flatten().filter(|t| t.is_pending()).count();

            Ok::<_, AppError>(DashboardData {
                recent_projects: projects,
                pending_tasks,
                upcoming_milestones: Vec::new(),
            })
        };
        self.ctx
            .load(&mut self.data, "Failed to load dashboard data", fetch)
            .await?;
        self.ctx.app.notify_success("Dashboard data loaded!");
        Ok(())
    }
}
