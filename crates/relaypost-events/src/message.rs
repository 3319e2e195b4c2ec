//! The inner `message` event.

use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::block::Block;

/// A message event as delivered inside an [`EventEnvelope`](crate::EventEnvelope).
///
/// `ts` identifies the message within its channel. `thread_ts` is set on
/// thread replies (pointing at the root) and on roots that already have
/// replies (equal to `ts`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub blocks: Option<Vec<Block>>,
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}
