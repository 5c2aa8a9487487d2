use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::cli::context::CliContext;
use crate::cli::utils::{output_projects, output_success, output_tasks, parse_date, project_line};
use crate::cli::OutputFormat;
use crate::models::{ProjectStatus, TaskStatus};
use crate::pages::{EditorMode, ProjectDetailsPage, ProjectEditorPage, ProjectListPage};
use crate::router::Route;

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "List projects, newest first")]
    List {
        #[arg(long, help = "Case-insensitive match on name or description")]
        search: Option<String>,
    },

    #[command(about = "Show a project with its tasks")]
    Show {
        #[arg(help = "Project ID")]
        id: String,
        #[arg(long, help = "Only tasks with this status")]
        status: Option<TaskStatus>,
    },

    #[command(about = "Create project")]
    Create {
        #[arg(help = "Project name")]
        name: String,
        #[arg(long, value_parser = parse_date, help = "Start date (YYYY-MM-DD)")]
        start: DateTime<Utc>,
        #[arg(long, value_parser = parse_date, help = "End date (YYYY-MM-DD)")]
        end: DateTime<Utc>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = ProjectStatus::Active)]
        status: ProjectStatus,
    },

    #[command(about = "Update project fields")]
    Update {
        #[arg(help = "Project ID")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = parse_date)]
        start: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_date)]
        end: Option<DateTime<Utc>>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<ProjectStatus>,
    },

    #[command(about = "Delete project (tasks are left in place)")]
    Delete {
        #[arg(help = "Project ID")]
        id: String,
    },

    #[command(about = "Add a member to a project")]
    AddMember {
        #[arg(help = "Project ID")]
        id: String,
        #[arg(help = "User ID")]
        user_id: String,
    },

    #[command(about = "Remove a member from a project")]
    RemoveMember {
        #[arg(help = "Project ID")]
        id: String,
        #[arg(help = "User ID")]
        user_id: String,
    },
}

pub async fn handle(cmd: ProjectCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    ctx.require_identity().await?;

    match cmd {
        ProjectCommands::List { search } => {
            let mut page = ProjectListPage::new(ctx.pages.clone());
            page.load().await?;
            page.search = search.unwrap_or_default();
            output_projects(&output_format, &page.visible())
        }
        ProjectCommands::Show { id, status } => {
            let mut page = ProjectDetailsPage::new(ctx.pages.clone(), id).with_status_filter(status);
            page.load().await?;
            let tasks = page.tasks.data().cloned().unwrap_or_default();
            if let Some(project) = page.project.data() {
                match output_format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&json!({ "project": project, "tasks": tasks }))?);
                    }
                    OutputFormat::Text => {
                        println!("{}", project_line(project));
                        if let Some(description) = &project.description {
                            println!("{}", description);
                        }
                        println!();
                        output_tasks(&output_format, &tasks)?;
                    }
                }
            }
            Ok(())
        }
        ProjectCommands::Create {
            name,
            start,
            end,
            description,
            status,
        } => {
            let mut editor = ProjectEditorPage::new(ctx.pages.clone(), EditorMode::Create);
            editor.form.name = name;
            editor.form.start_date = Some(start);
            editor.form.end_date = Some(end);
            editor.form.description = description.unwrap_or_default();
            editor.form.status = status;
            let route = editor.submit().await?;
            ctx.flush_notification(&output_format, Some(json!({ "route": route.path() })))
        }
        ProjectCommands::Update {
            id,
            name,
            start,
            end,
            description,
            status,
        } => {
            let mut editor = ProjectEditorPage::new(ctx.pages.clone(), EditorMode::Edit(id.clone()));
            if let Some(Route::Projects) = editor.load().await {
                anyhow::bail!("{}", ctx.pages.app.notification().message);
            }
            if let Some(name) = name {
                editor.form.name = name;
            }
            if start.is_some() {
                editor.form.start_date = start;
            }
            if end.is_some() {
                editor.form.end_date = end;
            }
            if let Some(description) = description {
                editor.form.description = description;
            }
            if let Some(status) = status {
                editor.form.status = status;
            }
            let route = editor.submit().await?;
            ctx.flush_notification(&output_format, Some(json!({ "route": route.path() })))
        }
        ProjectCommands::Delete { id } => {
            let mut page = ProjectListPage::new(ctx.pages.clone());
            page.delete(&id).await?;
            ctx.flush_notification(&output_format, Some(json!({ "deleted": id })))
        }
        ProjectCommands::AddMember { id, user_id } => {
            let projects = &ctx.pages.services.projects;
            let project = projects.get(&id).await?;
            let updated = projects.add_member(&project, &user_id).await?;
            output_success(
                &output_format,
                &format!("{} is a member of {}", user_id, updated.name),
                Some(json!({ "member_ids": updated.member_ids })),
            )
        }
        ProjectCommands::RemoveMember { id, user_id } => {
            let projects = &ctx.pages.services.projects;
            let project = projects.get(&id).await?;
            let updated = projects.remove_member(&project, &user_id).await?;
            output_success(
                &output_format,
                &format!("{} is not a member of {}", user_id, updated.name),
                Some(json!({ "member_ids": updated.member_ids })),
            )
        }
    }
}
