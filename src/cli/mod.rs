pub mod commands;
pub mod config;
pub mod context;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::Severity;
use context::CliContext;
use utils::output_error;

#[derive(Parser)]
#[command(name = "projectdesk")]
#[command(about = "ProjectDesk CLI - projects and tasks on an Appwrite backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign-in and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Project operations")]
    Project {
        #[command(subcommand)]
        cmd: commands::project::ProjectCommands,
    },

    #[command(about = "Task operations")]
    Task {
        #[command(subcommand)]
        cmd: commands::task::TaskCommands,
    },

    #[command(about = "Light/dark theme preference")]
    Theme {
        #[command(subcommand)]
        cmd: commands::theme::ThemeCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = CliContext::connect(crate::config::config())?;

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx, output_format.clone()).await,
        Commands::Project { cmd } => commands::project::handle(cmd, &ctx, output_format.clone()).await,
        Commands::Task { cmd } => commands::task::handle(cmd, &ctx, output_format.clone()).await,
        Commands::Theme { cmd } => commands::theme::handle(cmd, &ctx, output_format.clone()).await,
    };

    result.map_err(|e| {
        let code = e.downcast_ref::<AppError>().map(AppError::error_code);
        // Pages leave a fuller message in the notification slot than the raw error
        let note = ctx.pages.app.notification();
        let e = if note.open && note.severity == Severity::Error {
            ctx.pages.app.hide_notification();
            anyhow::anyhow!(note.message)
        } else {
            e
        };
        if let OutputFormat::Json = output_format {
            let _ = output_error(&output_format, &e.to_string(), code);
        }
        e
    })
}
