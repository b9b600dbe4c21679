use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{AuthError, Authenticator, CredentialAuthenticator, TokenIssuer};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::{PlotStore, UserDirectory};
use crate::handlers::{protected, public};
use crate::services::{AuthPolicy, PlotService};

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub plots: PlotService,
    pub authenticator: Arc<dyn Authenticator>,
    /// Present only when the deployment accepts token credentials
    pub tokens: Option<TokenIssuer>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the service layer over the given stores. Fails when tokens are
    /// enabled but no signing secret is configured.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn PlotStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Result<Self, AuthError> {
        let security = &config.security;
        let tokens = if security.credential_mode.allows_token() {
            Some(TokenIssuer::from_config(security)?)
        } else {
            None
        };

        let authenticator: Arc<dyn Authenticator> = Arc::new(CredentialAuthenticator::new(
            users.clone(),
            tokens.clone(),
            security.credential_mode,
        ));
        let plots = PlotService::new(store, users, authenticator.clone(), AuthPolicy::from(security));

        Ok(Self {
            plots,
            authenticator,
            tokens,
            config: Arc::new(config),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut app = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(plot_routes());

    if state.tokens.is_some() {
        app = app.merge(token_routes());
    }

    app = app.layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));
    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn plot_routes() -> Router<AppState> {
    Router::new()
        .route("/plots", post(public::plot_create))
        .route("/plots/", post(public::plot_create))
        .route("/plots/:username", get(public::plots_list))
        .route(
            "/plots/:username/:id",
            patch(protected::plot_update).delete(protected::plot_delete),
        )
}

fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/token_delivery", post(public::token_delivery))
        .route("/token_delivery/", post(public::token_delivery))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
