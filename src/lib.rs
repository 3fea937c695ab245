pub mod config;
pub mod modules;
pub mod services;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::Config;
use modules::interactions::interaction_routes;
use services::delivery::JobSender;
use services::discord::{DiscordClient, InteractionVerifier};

pub struct AppState {
    pub config: Config,
    pub jobs: JobSender,
    pub discord: DiscordClient,
    pub verifier: InteractionVerifier,
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(interaction_routes())
        .layer(RequestBodyLimitLayer::new(1024 * 64)) // 64KB max body
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> &'static str {
    "Minecraft Status Relay"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
