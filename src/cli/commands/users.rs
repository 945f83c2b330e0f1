use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{print_done, print_refused, print_users};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::models::Role;
use crate::database::DatabaseManager;
use crate::services::UserService;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a superadmin unless the email is already registered")]
    SeedSuperadmin {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, env = "SUPERADMIN_PASSWORD", help = "Password")]
        password: String,
        #[arg(long, default_value = "Super Admin", help = "Display name")]
        name: String,
    },

    #[command(about = "List accounts, optionally narrowed to one role")]
    List {
        #[arg(long, help = "user, admin or superadmin")]
        role: Option<Role>,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config().clone();
    let store = DatabaseManager::open_persistent_store(&config.database)
        .await
        .context("users commands need a Postgres database")?;
    let state = AppState::with_local_storage(config, store);
    let service = UserService::new(&state);

    match cmd {
        UserCommands::SeedSuperadmin {
            email,
            password,
            name,
        } => match service.seed_superadmin(&name, &email, &password).await? {
            Some(user) => print_done(
                &output_format,
                &format!("Superadmin {} created", user.email),
                &[("id", json!(user.id)), ("email", json!(user.email))],
            ),
            None => print_refused(
                &output_format,
                &format!("An account with email {} already exists", email),
                "ALREADY_EXISTS",
            ),
        },
        UserCommands::List { role } => {
            let mut users = service.list_users().await?;
            if let Some(role) = role {
                users.retain(|u| u.role == role);
            }
            print_users(&output_format, &users)
        }
    }
}
