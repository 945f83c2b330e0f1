use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::auth::{hash_password, JwtKeys};
use crate::cli::utils::print_done;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::store::UserStore;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Hash a password with bcrypt")]
    HashPassword {
        #[arg(help = "Plain text password")]
        password: String,
        #[arg(long, help = "bcrypt cost (defaults to SECURITY_BCRYPT_COST)")]
        cost: Option<u32>,
    },

    #[command(about = "Mint a bearer token for an existing account")]
    IssueToken {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Token lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Decode and verify a bearer token")]
    Verify {
        #[arg(help = "JWT")]
        token: String,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();

    match cmd {
        AuthCommands::HashPassword { password, cost } => {
            let cost = cost.unwrap_or(config.security.bcrypt_cost);
            let hash = hash_password(&password, cost)?;
            match output_format {
                OutputFormat::Json => print_done(&output_format, "Password hashed", &[("hash", json!(hash))]),
                OutputFormat::Text => {
                    println!("{}", hash);
                    Ok(())
                }
            }
        }
        AuthCommands::IssueToken { email, hours } => {
            let store = DatabaseManager::open_persistent_store(&config.database)
                .await
                .context("issue-token needs a Postgres database")?;
            let user = store
                .find_user_by_email(&email.trim().to_lowercase())
                .await?
                .with_context(|| format!("no account with email '{}'", email))?;

            let keys = JwtKeys::new(
                &config.security.jwt_secret,
                hours.unwrap_or(config.security.jwt_expiry_hours),
            );
            let token = keys.issue(user.id, user.role)?;
            match output_format {
                OutputFormat::Json => print_done(
                    &output_format,
                    "Token issued",
                    &[
                        ("token", json!(token)),
                        ("id", json!(user.id)),
                        ("role", json!(user.role)),
                    ],
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        AuthCommands::Verify { token } => {
            let claims = JwtKeys::from_config(&config.security).verify(&token)?;
            print_done(
                &output_format,
                &format!("Token valid for {} ({})", claims.id, claims.role),
                &[
                    ("id", json!(claims.id)),
                    ("role", json!(claims.role)),
                    ("exp", json!(claims.exp)),
                ],
            )
        }
    }
}
