use clap::Subcommand;
use serde_json::json;

use crate::cli::context::CliContext;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::pages::LoginPage;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Print the Google sign-in URL")]
    LoginUrl,

    #[command(about = "Login with email and password")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
        #[arg(long, help = "Display name")]
        name: Option<String>,
    },

    #[command(about = "Logout from server")]
    Logout,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let auth = &ctx.pages.services.auth;
    match cmd {
        AuthCommands::LoginUrl => {
            let url = LoginPage::new(ctx.pages.clone()).sign_in_with_google()?;
            output_success(
                &output_format,
                &format!("Open {} to sign in", url),
                Some(json!({ "url": url.as_str() })),
            )
        }
        AuthCommands::Login { email, password } => {
            let session = auth.create_email_session(&email, &password).await?;
            ctx.save_session(Some(session.user_id.clone()))?;
            output_success(
                &output_format,
                &format!("Logged in as {}", email),
                Some(json!({ "user_id": session.user_id })),
            )
        }
        AuthCommands::Register { email, password, name } => {
            let user = auth.create_user(&email, &password, name.as_deref()).await?;
            output_success(
                &output_format,
                &format!("Registered {} ({})", user.email, user.id),
                Some(json!({ "user": user })),
            )
        }
        AuthCommands::Logout => {
            ctx.require_identity().await?;
            let next = ctx.pages.session.logout().await?;
            ctx.clear_session()?;
            output_success(&output_format, "Logged out", Some(json!({ "next": next.path() })))
        }
        AuthCommands::Whoami => {
            let identity = ctx.require_identity().await?;
            let user = &identity.user;
            let avatar = auth.avatar_url(user);
            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "id": user.id,
                            "name": user.display_name(),
                            "email": user.email,
                            "admin": identity.is_admin(),
                            "avatar_url": avatar,
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("{} <{}>", user.display_name(), user.email);
                    println!("ID: {}", user.id);
                    println!("Role: {:?}", identity.role);
                    if let Some(avatar) = avatar {
                        println!("Avatar: {}", avatar);
                    }
                }
            }
            Ok(())
        }
    }
}
