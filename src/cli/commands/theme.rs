use clap::Subcommand;
use serde_json::json;

use crate::cli::context::CliContext;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::state::ThemeMode;

#[derive(Subcommand)]
pub enum ThemeCommands {
    #[command(about = "Show saved theme mode")]
    Show,

    #[command(about = "Switch between light and dark")]
    Toggle,

    #[command(about = "Set theme mode")]
    Set {
        #[arg(help = "light or dark")]
        mode: ThemeMode,
    },
}

pub async fn handle(cmd: ThemeCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let app = &ctx.pages.app;
    let mode = match cmd {
        ThemeCommands::Show => app.theme(),
        ThemeCommands::Toggle => app.toggle_theme()?,
        ThemeCommands::Set { mode } => {
            app.set_theme(mode)?;
            mode
        }
    };
    output_success(
        &output_format,
        &format!("Theme: {}", mode),
        Some(json!({ "themeMode": mode })),
    )
}
