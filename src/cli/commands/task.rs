use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::cli::context::CliContext;
use crate::cli::utils::{output_tasks, parse_date};
use crate::cli::OutputFormat;
use crate::forms::TaskForm;
use crate::models::{TaskFilters, TaskPriority, TaskStatus};
use crate::pages::ProjectDetailsPage;

#[derive(Subcommand)]
pub enum TaskCommands {
    #[command(about = "List tasks of a project")]
    List {
        #[arg(help = "Project ID")]
        project_id: String,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        milestone: Option<String>,
        #[arg(long, help = "dueDateAsc or dueDateDesc; anything else keeps newest first")]
        sort: Option<String>,
    },

    #[command(about = "Create task in a project")]
    Create {
        #[arg(help = "Project ID")]
        project_id: String,
        #[arg(help = "Task title")]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long, value_parser = parse_date)]
        due: Option<DateTime<Utc>>,
        #[arg(long, default_value_t = TaskPriority::Medium)]
        priority: TaskPriority,
        #[arg(long, default_value_t = TaskStatus::Todo)]
        status: TaskStatus,
        #[arg(long)]
        milestone: Option<String>,
    },

    #[command(about = "Update task fields")]
    Update {
        #[arg(help = "Task ID")]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, help = "Assignee user ID; empty string unassigns")]
        assignee: Option<String>,
        #[arg(long, value_parser = parse_date)]
        due: Option<DateTime<Utc>>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        status: Option<TaskStatus>,
    },

    #[command(about = "Delete task and its attachments")]
    Delete {
        #[arg(help = "Task ID")]
        id: String,
    },
}

pub async fn handle(cmd: TaskCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    ctx.require_identity().await?;
    let tasks = &ctx.pages.services.tasks;

    match cmd {
        TaskCommands::List {
            project_id,
            status,
            assignee,
            milestone,
            sort,
        } => {
            let mut filters = TaskFilters {
                status,
                assignee_id: assignee,
                milestone_id: milestone,
                sort_by: None,
            };
            if let Some(key) = sort {
                filters = filters.sorted(&key);
            }
            let found = tasks.list(&project_id, &filters).await?;
            output_tasks(&output_format, &found)
        }
        TaskCommands::Create {
            project_id,
            title,
            description,
            assignee,
            due,
            priority,
            status,
            milestone,
        } => {
            let form = TaskForm {
                title,
                description: description.unwrap_or_default(),
                assignee_id: assignee.unwrap_or_default(),
                due_date: due,
                priority,
                status,
                milestone_id: milestone.unwrap_or_default(),
            };
            let mut page = ProjectDetailsPage::new(ctx.pages.clone(), project_id);
            let task = page.create_task(&form).await?;
            ctx.flush_notification(&output_format, Some(json!({ "task": task })))
        }
        TaskCommands::Update {
            id,
            title,
            description,
            assignee,
            due,
            priority,
            status,
        } => {
            let task = tasks.get(&id).await?;
            let mut form = TaskForm::from_task(&task);
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(assignee) = assignee {
                form.assignee_id = assignee;
            }
            if due.is_some() {
                form.due_date = due;
            }
            if let Some(priority) = priority {
                form.priority = priority;
            }
            if let Some(status) = status {
                form.status = status;
            }
            let mut page = ProjectDetailsPage::new(ctx.pages.clone(), task.project_id.clone());
            let updated = page.update_task(&id, &form).await?;
            ctx.flush_notification(&output_format, Some(json!({ "task": updated })))
        }
        TaskCommands::Delete { id } => {
            let task = tasks.get(&id).await?;
            let mut page = ProjectDetailsPage::new(ctx.pages.clone(), task.project_id);
            page.delete_task(&id).await?;
            ctx.flush_notification(&output_format, Some(json!({ "deleted": id })))
        }
    }
}
