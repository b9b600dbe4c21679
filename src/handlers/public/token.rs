use std::collections::HashMap;

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::IssuedToken;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /token_delivery/ - exchange username and password for a bearer token
///
/// Only routed when the deployment accepts token credentials.
pub async fn token_delivery(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<IssuedToken> {
    let Json(request) = payload?;

    let (Some(username), Some(password)) = (request.username.as_deref(), request.password.as_deref()) else {
        let mut missing = HashMap::new();
        if request.username.is_none() {
            missing.insert("username".to_string(), "This field is required.".to_string());
        }
        if request.password.is_none() {
            missing.insert("password".to_string(), "This field is required.".to_string());
        }
        return Err(ApiError::validation_error("Missing required fields", Some(missing)));
    };

    let tokens = state
        .tokens
        .as_ref()
        .ok_or_else(|| ApiError::not_found("Token credentials are disabled"))?;

    let identity = state.authenticator.login(username, password).await.map_err(|e| {
        tracing::warn!("Token request for {} rejected: {}", username, e);
        ApiError::from(e)
    })?;

    let issued = tokens.issue(&identity.username)?;
    tracing::info!("Issued token for {}", identity.username);
    Ok(ApiResponse::success(issued))
}
