use crate::error::AppResult;
use crate::forms::ProjectForm;
use crate::router::Route;

use super::PageContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(String),
}

impl EditorMode {
    pub fn from_route(route: &Route) -> Option<Self> {
        match route {
            Route::ProjectNew => Some(EditorMode::Create),
            Route::ProjectEdit(id) => Some(EditorMode::Edit(id.clone())),
            _ => None,
        }
    }
}

/// Create and edit share one form
pub struct ProjectEditorPage {
    ctx: PageContext,
    mode: EditorMode,
    pub form: ProjectForm,
    fetching: bool,
}

impl ProjectEditorPage {
    pub fn new(ctx: PageContext, mode: EditorMode) -> Self {
        Self {
            ctx,
            mode,
            form: ProjectForm::new(),
            fetching: false,
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// Prefills the form in edit mode. On failure the caller should follow
    /// the returned route back to the project list.
    pub async fn load(&mut self) -> Option<Route> {
        let EditorMode::Edit(id) = &self.mode else {
            return None;
        };
        self.fetching = true;
        let _busy = self.ctx.app.begin_busy();
        let result = self.ctx.services.projects.get(id).await;
        self.fetching = false;
        match result {
            Ok(project) => {
                self.form = ProjectForm::from_project(&project);
                None
            }
            Err(e) => {
                self.ctx.report("Failed to load project details", e);
                Some(Route::Projects)
            }
        }
    }

    /// Saves the form and returns the details route of the saved project
    pub async fn submit(&mut self) -> AppResult<Route> {
        let identity = match self.ctx.identity() {
            Ok(identity) => identity,
            Err(e) => {
                self.ctx.app.notify_error(e.to_string());
                return Err(e);
            }
        };
        let ctx = &self.ctx;
        let form = &self.form;
        let project = match &self.mode {
            EditorMode::Create => {
                ctx.mutate("Project created successfully!", "Operation failed", async {
                    let payload = form.submit(identity.id())?;
                    ctx.services.projects.create(&payload).await
                })
                .await?
            }
            EditorMode::Edit(id) => {
                ctx.mutate("Project updated successfully!", "Operation failed", async {
                    let patch = form.submit_patch()?;
                    ctx.services.projects.update(id, &patch).await
                })
                .await?
            }
        };
        Ok(Route::ProjectDetail(project.id))
    }
}
