//! Slack Events API webhook.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, warn};

use crate::event::{Inbound, MirrorEvent, classify};
use crate::response;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub challenge: String,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// POST /slack/events
///
/// Acknowledges as soon as the payload is classified; mirroring runs on a
/// detached task.
pub async fn slack_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(verifier) = &state.verifier
        && let Err(e) = verifier.verify(&headers, &body)
    {
        warn!(error = %e, "Rejected unsigned Slack request");
        return response::unauthorized(e.to_string()).into_response();
    }

    let envelope = match classify(&body) {
        Ok(Inbound::Challenge(challenge)) => {
            debug!("Answered url verification");
            return (StatusCode::OK, Json(ChallengeResponse { challenge })).into_response();
        }
        Ok(Inbound::Envelope(envelope)) => *envelope,
        Err(e) => {
            warn!(error = %e, "Rejected Slack payload");
            return response::bad_request(e.to_string()).into_response();
        }
    };

    let event_id = envelope.event_id;
    let event = match MirrorEvent::from_message(envelope.event) {
        Ok(event) => event,
        Err(e) => {
            warn!(event_id = %event_id, error = %e, "Rejected malformed message event");
            return response::bad_request(e.to_string()).into_response();
        }
    };

    let mirror = state.mirror.clone();
    tokio::spawn(async move {
        mirror.run(&event_id, &event).await;
    });

    (StatusCode::OK, Json(AckResponse { ok: true })).into_response()
}
