use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde::Deserialize;

use crate::api::PlotRecord;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, HeaderCredential};
use crate::services::PlotPatch;

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlotRequest {
    pub plot_name: Option<String>,
    pub plot_geometry: Option<String>,
    /// Accepted only when it repeats the path owner; plots never change hands
    pub plot_owner: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeletePlotRequest {
    pub password: Option<String>,
}

// Ids that cannot name a plot are simply not found
fn parse_plot_id(id: &str) -> Result<i64, ApiError> {
    id.parse::<i64>().map_err(|_| ApiError::not_found("Plot not found"))
}

/// PATCH /plots/:username/:id - change name and/or geometry
pub async fn plot_update(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, String)>,
    credential_header: HeaderCredential,
    payload: Result<Json<UpdatePlotRequest>, JsonRejection>,
) -> ApiResult<PlotRecord> {
    let id = parse_plot_id(&id)?;
    let Json(request) = payload?;

    if let Some(owner) = request.plot_owner.as_deref() {
        if owner != username {
            return Err(ApiError::field_error("plot_owner", "Plot owner cannot be changed"));
        }
    }

    let credential = credential_header.into_credential(&username, request.password);
    let patch = PlotPatch {
        name: request.plot_name,
        ring_text: request.plot_geometry,
    };
    let plot = state
        .plots
        .update(&username, id, credential.as_ref(), patch)
        .await?;

    tracing::info!("Updated plot {} for {}", plot.id, plot.owner);
    Ok(ApiResponse::success(PlotRecord::from(&plot)))
}

/// DELETE /plots/:username/:id - 204 on success
///
/// The body is optional; a caller authenticating by header need not send one.
pub async fn plot_delete(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, String)>,
    credential_header: HeaderCredential,
    payload: Option<Json<DeletePlotRequest>>,
) -> ApiResult<()> {
    let id = parse_plot_id(&id)?;
    let password = payload.and_then(|Json(request)| request.password);

    let credential = credential_header.into_credential(&username, password);
    state.plots.delete(&username, id, credential.as_ref()).await?;

    tracing::info!("Deleted plot {} for {}", id, username);
    Ok(ApiResponse::no_content())
}
