mod common;

use anyhow::Result;
use chrono::{TimeZone, Utc};

use common::StubBackend;
use projectdesk::cli::context::CliContext;
use projectdesk::forms::TaskForm;
use projectdesk::models::{ProjectStatus, TaskFilters, TaskPriority, TaskStatus};
use projectdesk::pages::{EditorMode, ProjectDetailsPage, ProjectEditorPage};
use projectdesk::router::Route;
use projectdesk::testing::user;

#[tokio::test]
async fn alpha_project_with_design_task() -> Result<()> {
    let stub = StubBackend::start().await?;
    let dir = tempfile::tempdir()?;
    let carrier = stub.sign_in(user("u1", "Ada", &[]));
    std::fs::write(
        dir.path().join("session.json"),
        serde_json::to_string(&serde_json::json!({ "carrier": carrier }))?,
    )?;

    let cli = CliContext::connect(&stub.config(dir.path()))?;
    let identity = cli.require_identity().await?;
    assert_eq!(identity.id(), "u1");
    let ctx = cli.pages.clone();

    let mut editor = ProjectEditorPage::new(ctx.clone(), EditorMode::Create);
    editor.form.name = "Alpha".into();
    editor.form.start_date = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    editor.form.end_date = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    editor.form.status = ProjectStatus::Active;
    let Route::ProjectDetail(alpha_id) = editor.submit().await? else {
        panic!("editor should navigate to the project");
    };

    let mut details = ProjectDetailsPage::new(ctx.clone(), alpha_id.clone());
    details.load().await?;
    let form = TaskForm {
        title: "Design".into(),
        priority: TaskPriority::High,
        status: TaskStatus::Todo,
        ..Default::default()
    };
    let design = details.create_task(&form).await?;
    assert_eq!(design.project_id, alpha_id);
    assert_eq!(design.creator_id, "u1");

    let todo = ctx
        .services
        .tasks
        .list(&alpha_id, &TaskFilters::status(TaskStatus::Todo))
        .await?;
    assert_eq!(todo.len(), 1);
    assert_eq!(todo[0].id, design.id);
    assert_eq!(todo[0].title, "Design");
    assert_eq!(todo[0].priority, TaskPriority::High);

    details.delete_task(&design.id).await?;
    assert!(details.tasks.data().map(Vec::is_empty).unwrap_or(false));
    Ok(())
}
