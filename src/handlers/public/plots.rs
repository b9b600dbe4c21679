use std::collections::HashMap;

use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    Path, Query, State,
};
use axum::Json;
use serde::Deserialize;

use crate::api::PlotRecord;
use crate::app::AppState;
use crate::database::models::PlotSummary;
use crate::error::ApiError;
use crate::handlers::PageQuery;
use crate::middleware::{ApiResponse, ApiResult, HeaderCredential};
use crate::services::PlotError;

#[derive(Debug, Deserialize)]
pub struct CreatePlotRequest {
    pub plot_name: Option<String>,
    pub plot_geometry: Option<String>,
    pub plot_owner: Option<String>,
    /// Owner's password, only consulted when creation requires credentials
    pub password: Option<String>,
}

/// POST /plots/ - create a plot for an existing user
pub async fn plot_create(
    State(state): State<AppState>,
    credential_header: HeaderCredential,
    payload: Result<Json<CreatePlotRequest>, JsonRejection>,
) -> ApiResult<PlotRecord> {
    let Json(request) = payload?;

    let mut missing = HashMap::new();
    for (field, value) in [
        ("plot_name", &request.plot_name),
        ("plot_geometry", &request.plot_geometry),
        ("plot_owner", &request.plot_owner),
    ] {
        if value.is_none() {
            missing.insert(field.to_string(), "This field is required.".to_string());
        }
    }
    let (Some(name), Some(geometry), Some(owner)) = (request.plot_name, request.plot_geometry, request.plot_owner)
    else {
        return Err(ApiError::validation_error("Missing required fields", Some(missing)));
    };

    let credential = credential_header.into_credential(&owner, request.password);
    let plot = state
        .plots
        .create(&name, &geometry, &owner, credential.as_ref())
        .await
        .map_err(|e| match e {
            // Create reports credential failures as 401; the owner is already known to exist
            PlotError::Unauthenticated(reason) => {
                tracing::debug!("Rejected create for {}: {}", owner, reason);
                ApiError::unauthorized("Authentication credentials were not provided or are invalid")
            }
            other => other.into(),
        })?;

    tracing::info!("Created plot {} for {}", plot.id, plot.owner);
    Ok(ApiResponse::created(PlotRecord::from(&plot)))
}

/// GET /plots/:username - the user's plots in ascending id order
pub async fn plots_list(
    State(state): State<AppState>,
    Path(username): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Vec<PlotSummary>> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let page = query.resolve(&state.config.api)?;

    let plots = state
        .plots
        .list_by_owner(&username, page)
        .await
        .map_err(|e| match e {
            PlotError::UnknownOwner(owner) => ApiError::not_found(format!("User \"{}\" not found", owner)),
            other => other.into(),
        })?;

    Ok(ApiResponse::success(plots))
}
