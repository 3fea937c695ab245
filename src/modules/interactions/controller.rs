use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;

use crate::AppState;
use super::schema::{ErrorResponse, Interaction, InteractionResponse, APPLICATION_COMMAND, PING};
use crate::services::delivery::PollJob;
use crate::services::discord::{InteractionError, InteractionReplySink, HELP_COMMAND, STATUS_COMMAND};
use crate::services::presentation::help_message;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

type ControllerResult = Result<(StatusCode, Json<InteractionResponse>), (StatusCode, Json<ErrorResponse>)>;

// =============================================================================
// POST /interactions - Discord interaction webhook
// =============================================================================

pub async fn handle_interaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ControllerResult {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok());

    let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
        return Err(unauthorized(InteractionError::MissingHeaders));
    };

    state
        .verifier
        .verify(signature, timestamp, &body)
        .map_err(unauthorized)?;

    let interaction: Interaction = serde_json::from_slice(&body).map_err(|e| {
        let err = InteractionError::Malformed(e.to_string());
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(err.to_string())))
    })?;

    match interaction.kind {
        PING => Ok((StatusCode::OK, Json(InteractionResponse::pong()))),
        APPLICATION_COMMAND => Ok((StatusCode::OK, Json(dispatch_command(&state, interaction)))),
        other => {
            tracing::warn!("Unsupported interaction type {}", other);
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("Unsupported interaction type {}", other))),
            ))
        }
    }
}

fn dispatch_command(state: &AppState, interaction: Interaction) -> InteractionResponse {
    let requester = interaction.requester();

    match interaction.command_name() {
        Some(STATUS_COMMAND) => {
            tracing::info!("📊 /status requested by {}", requester);

            let sink = InteractionReplySink::new(state.discord.clone(), interaction.token.clone(), requester);
            match state.jobs.try_send(PollJob::OnDemand(Box::new(sink))) {
                Ok(()) => InteractionResponse::deferred(),
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("Job queue full, rejecting /status");
                    InteractionResponse::ephemeral("❌ The monitor is busy, please try again shortly.")
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::error!("❌ Job queue closed, cannot run /status");
                    InteractionResponse::ephemeral("❌ The monitor is shutting down.")
                }
            }
        }
        Some(HELP_COMMAND) => {
            tracing::info!("❓ /help requested by {}", requester);
            InteractionResponse::message(&help_message(&state.config.monitor, &state.config.colors))
        }
        other => {
            tracing::warn!("Unknown command {:?} from {}", other, requester);
            InteractionResponse::ephemeral("❌ Unknown command.")
        }
    }
}

fn unauthorized(err: InteractionError) -> (StatusCode, Json<ErrorResponse>) {
    tracing::debug!("Rejected interaction: {}", err);
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new(err.to_string())))
}
