use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::{
    output::{output_fields, output_success},
    OutputFormat,
};
use crate::database::{PgUserDirectory, UserDirectory};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Register a user who can own plots")]
    Add {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Initial password")]
        password: String,
    },

    #[command(about = "Show a user")]
    Show {
        #[arg(help = "Username")]
        username: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Add { username, password } => {
            validate_username(&username)?;
            if password.is_empty() {
                bail!("password must not be empty");
            }

            let pool = super::connect().await?;
            let users = PgUserDirectory::new(pool.clone());
            if users.user_exists(&username).await? {
                bail!("user \"{}\" already exists", username);
            }
            let hash = hash_password(&password)?;
            let user = users
                .create_user(&username, &hash)
                .await
                .with_context(|| format!("failed to create user \"{}\"", username))?;
            pool.close().await;

            output_success(
                output_format,
                &format!("Created user {}", user.username),
                Some(json!({ "username": user.username, "created_at": user.created_at })),
            )
        }
        UserCommands::Show { username } => {
            let pool = super::connect().await?;
            let users = PgUserDirectory::new(pool.clone());
            let user = users.find_user(&username).await?;
            pool.close().await;

            let Some(user) = user else {
                bail!("user \"{}\" not found", username);
            };
            output_fields(
                output_format,
                &[
                    ("username", user.username),
                    ("created_at", user.created_at.to_rfc3339()),
                ],
            )
        }
    }
}

/// Usernames appear in URL paths: 1-150 characters of letters, digits and @.+-_
fn validate_username(username: &str) -> anyhow::Result<()> {
    if username.is_empty() || username.chars().count() > 150 {
        bail!("username must be between 1 and 150 characters");
    }
    if let Some(c) = username
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')))
    {
        bail!("username may not contain {:?}", c);
    }
    Ok(())
}
