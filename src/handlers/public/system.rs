use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service description
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let token_route = if state.tokens.is_some() {
        "/token_delivery/ (public - exchange username and password for a bearer token)"
    } else {
        "disabled"
    };

    Json(json!({
        "success": true,
        "data": {
            "name": "Plots API",
            "version": version,
            "description": "Polygon plots owned by registered users",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "create": "POST /plots/ (public unless creation requires credentials)",
                "list": "GET /plots/:username (public)",
                "update": "PATCH /plots/:username/:id (owner credential)",
                "delete": "DELETE /plots/:username/:id (owner credential)",
                "token": token_route,
            }
        }
    }))
}

/// GET /health - 503 when the store cannot be reached
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.plots.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
