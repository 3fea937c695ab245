use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::json;
use std::{num::NonZeroU32, sync::Arc};

use crate::AppState;
use super::controller;

// Inbound budget for the whole endpoint, not per user
const INTERACTIONS_PER_SECOND: u32 = 5;
const INTERACTIONS_BURST: u32 = 20;

type Throttle = Arc<DefaultDirectRateLimiter>;

pub fn interaction_routes() -> Router<Arc<AppState>> {
    let limiter = throttle_quota(INTERACTIONS_PER_SECOND, INTERACTIONS_BURST);

    Router::new()
        .route("/interactions", post(controller::handle_interaction))
        .layer(middleware::from_fn_with_state(limiter, throttle))
}

fn throttle_quota(per_second: u32, burst: u32) -> Throttle {
    let quota = Quota::per_second(NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN))
        .allow_burst(NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

async fn throttle(State(limiter): State<Throttle>, request: Request, next: Next) -> Response {
    if limiter.check().is_err() {
        tracing::warn!("Throttled {} {}", request.method(), request.uri().path());
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Too many requests" })),
        )
            .into_response();
    }
    next.run(request).await
}
