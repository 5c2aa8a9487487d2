use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::models::{Project, Task};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(object), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

pub fn output_projects(output_format: &OutputFormat, projects: &[&Project]) -> anyhow::Result<()> {
    if projects.is_empty() {
        return output_empty_collection(output_format, "projects", "No projects found");
    }
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "projects": projects }))?);
        }
        OutputFormat::Text => {
            for project in projects {
                println!("{}", project_line(project));
            }
        }
    }
    Ok(())
}

pub fn output_tasks(output_format: &OutputFormat, tasks: &[Task]) -> anyhow::Result<()> {
    if tasks.is_empty() {
        return output_empty_collection(output_format, "tasks", "No tasks found");
    }
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "tasks": tasks }))?);
        }
        OutputFormat::Text => {
            for task in tasks {
                println!("{}", task_line(task));
            }
        }
    }
    Ok(())
}

pub fn project_line(project: &Project) -> String {
    format!(
        "{}  {}  [{}]  {} .. {}",
        project.id,
        project.name,
        project.status,
        project.start_date.format("%Y-%m-%d"),
        project.end_date.format("%Y-%m-%d")
    )
}

pub fn task_line(task: &Task) -> String {
    let due = task
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}  {}  [{}/{}]  due {}",
        task.id, task.title, task.status, task.priority, due
    )
}

/// Accepts a plain `YYYY-MM-DD` date (midnight UTC) or a full RFC 3339 timestamp
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| format!("invalid date '{}': {}", value, e))
}
