use anyhow::Context;
use serde_json::json;

use crate::auth::{Authenticator, CredentialAuthenticator, TokenIssuer};
use crate::cli::{output::output_success, OutputFormat};
use crate::config::config;
use crate::database::PgUserDirectory;
use std::sync::Arc;

pub async fn handle(username: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config().security;
    let tokens = TokenIssuer::from_config(security).context("cannot issue tokens")?;

    let pool = super::connect().await?;
    let users = Arc::new(PgUserDirectory::new(pool.clone()));
    let authenticator = CredentialAuthenticator::new(users, Some(tokens.clone()), security.credential_mode);

    let identity = authenticator.login(username, password).await?;
    let issued = tokens.issue(&identity.username)?;
    pool.close().await;

    match output_format {
        OutputFormat::Text => {
            println!("{}", issued.token);
            Ok(())
        }
        OutputFormat::Json => output_success(
            output_format,
            &format!("Issued token for {}", identity.username),
            Some(json!(issued)),
        ),
    }
}
