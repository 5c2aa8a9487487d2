use crate::error::AppResult;
use crate::models::Project;

use super::{PageContext, PageData};

pub struct ProjectListPage {
    ctx: PageContext,
    pub projects: PageData<Vec<Project>>,
    pub search: String,
}

impl ProjectListPage {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            projects: PageData::new(),
            search: String::new(),
        }
    }

    pub async fn load(&mut self) -> AppResult<()> {
        let Some(identity) = self.ctx.session.identity() else {
            return Ok(());
        };
        let fetch = self.ctx.services.projects.list(identity.id(), identity.is_admin());
        self.ctx.load(&mut self.projects, "Failed to load projects", fetch).await
    }

    /// Projects matching the search box; everything when it is empty
    pub fn visible(&self) -> Vec<&Project> {
        let all = self.projects.data().map(Vec::as_slice).unwrap_or_default();
        all.iter().filter(|p| p.matches_search(&self.search)).collect()
    }

    pub async fn delete(&mut self, project_id: &str) -> AppResult<()> {
        self.ctx
            .mutate(
                "Project deleted successfully",
                "Error deleting project",
                self.ctx.services.projects.delete(project_id),
            )
            .await?;
        if let Err(e) = self.load().await {
            tracing::warn!("Project list left stale after deleting {}: {}", project_id, e);
        }
        Ok(())
    }
}
