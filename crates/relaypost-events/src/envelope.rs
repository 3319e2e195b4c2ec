//! Outer request bodies: the URL verification handshake and the event
//! callback envelope.

use serde::{Deserialize, Serialize};

use crate::message::MessageEvent;

/// Type discriminator Slack uses for the request URL handshake.
pub const URL_VERIFICATION: &str = "url_verification";

/// Handshake sent once when a request URL is configured.
///
/// The `challenge` must be echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlVerification {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub token: Option<String>,
    pub challenge: String,
}

/// An event callback carrying one message event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub team_id: String,
    pub event_id: String,
    pub event_time: i64,
    pub event: MessageEvent,
}
