//! Inbound payload classification.
//!
//! A raw request body is classified exactly once into either a handshake
//! challenge or a message envelope, and the envelope's message is validated
//! into a [`MirrorEvent`]. Nothing downstream looks at the raw JSON again.

use relaypost_events::{
    Attachment, Block, EventEnvelope, MessageEvent, URL_VERIFICATION, UrlVerification,
};
use serde_json::Value;
use thiserror::Error;

/// Subtypes that describe edits, deletions or channel housekeeping rather
/// than new content.
const IGNORED_SUBTYPES: &[&str] = &[
    "message_changed",
    "message_deleted",
    "channel_join",
    "channel_leave",
    "channel_topic",
    "channel_purpose",
    "channel_name",
];

// ============================================================================
// Classification
// ============================================================================

/// A classified inbound request body.
#[derive(Debug)]
pub enum Inbound {
    /// URL verification handshake; the challenge is echoed verbatim.
    Challenge(String),
    /// An event callback.
    Envelope(Box<EventEnvelope>),
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("request body is not valid json: {0}")]
    Json(#[source] serde_json::Error),

    #[error("url verification request without a challenge")]
    MissingChallenge,

    #[error("malformed event envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("unrecognized payload shape")]
    Unrecognized,
}

/// Classify a raw request body.
pub fn classify(body: &[u8]) -> Result<Inbound, ClassifyError> {
    let value: Value = serde_json::from_slice(body).map_err(ClassifyError::Json)?;

    if value.get("type").and_then(Value::as_str) == Some(URL_VERIFICATION) {
        let handshake: UrlVerification =
            serde_json::from_value(value).map_err(|_| ClassifyError::MissingChallenge)?;
        return Ok(Inbound::Challenge(handshake.challenge));
    }

    if !value.get("event").is_some_and(Value::is_object) {
        return Err(ClassifyError::Unrecognized);
    }

    let envelope: EventEnvelope =
        serde_json::from_value(value).map_err(ClassifyError::Envelope)?;
    Ok(Inbound::Envelope(Box::new(envelope)))
}

// ============================================================================
// MirrorEvent
// ============================================================================

/// The message is missing a field the pipeline cannot work without.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedEvent {
    #[error("message event has no ts")]
    MissingTs,
}

/// Content of a message, as handed to the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBody {
    pub text: String,
    pub blocks: Vec<Block>,
    pub attachments: Vec<Attachment>,
}

/// Fields shared by root messages and replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMessage {
    pub channel: Option<String>,
    pub ts: String,
    pub author: Option<String>,
    pub event_kind: Option<String>,
    pub subtype: Option<String>,
    pub from_bot: bool,
    pub body: MessageBody,
}

/// A validated message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorEvent {
    /// A top-level message.
    Root(SourceMessage),
    /// A thread reply; `thread_ts` is the root's `ts`.
    Reply {
        message: SourceMessage,
        thread_ts: String,
    },
}

/// Why a well-formed event is not mirrored at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    NotAMessage,
    Subtype,
    Bot,
}

impl MirrorEvent {
    /// Validate a raw message event.
    ///
    /// A reply is a message whose `thread_ts` is present and differs from its
    /// own `ts`; everything else is a root.
    pub fn from_message(event: MessageEvent) -> Result<Self, MalformedEvent> {
        let ts = non_empty(event.ts).ok_or(MalformedEvent::MissingTs)?;
        let thread_ts = non_empty(event.thread_ts);

        let from_bot =
            event.bot_id.is_some() || event.subtype.as_deref() == Some("bot_message");
        let message = SourceMessage {
            channel: non_empty(event.channel),
            ts,
            author: non_empty(event.user),
            event_kind: event.kind,
            subtype: event.subtype,
            from_bot,
            body: MessageBody {
                text: event.text.unwrap_or_default(),
                blocks: event.blocks.unwrap_or_default(),
                attachments: event.attachments.unwrap_or_default(),
            },
        };

        Ok(match thread_ts {
            Some(thread_ts) if thread_ts != message.ts => MirrorEvent::Reply { message, thread_ts },
            _ => MirrorEvent::Root(message),
        })
    }

    pub fn message(&self) -> &SourceMessage {
        match self {
            MirrorEvent::Root(message) => message,
            MirrorEvent::Reply { message, .. } => message,
        }
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, MirrorEvent::Reply { .. })
    }

    /// Key recorded once this exact message has been mirrored.
    pub fn dedup_key(&self) -> &str {
        &self.message().ts
    }

    /// Key identifying the thread this message belongs to.
    pub fn thread_key(&self) -> &str {
        match self {
            MirrorEvent::Root(message) => &message.ts,
            MirrorEvent::Reply { thread_ts, .. } => thread_ts,
        }
    }

    /// Decide whether the event carries new content worth mirroring.
    pub fn ignored(&self, skip_bot_messages: bool) -> Option<Ignored> {
        let message = self.message();
        if message
            .event_kind
            .as_deref()
            .is_some_and(|kind| kind != "message")
        {
            return Some(Ignored::NotAMessage);
        }
        if message
            .subtype
            .as_deref()
            .is_some_and(|subtype| IGNORED_SUBTYPES.contains(&subtype))
        {
            return Some(Ignored::Subtype);
        }
        if skip_bot_messages && message.from_bot {
            return Some(Ignored::Bot);
        }
        None
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope_body(event: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "type": "event_callback",
            "team_id": "T1",
            "event_id": "Ev1",
            "event_time": 1700000000,
            "event": event,
        }))
        .unwrap()
    }

    fn message(event: Value) -> MessageEvent {
        serde_json::from_value(event).unwrap()
    }

    #[test]
    fn classify_challenge_echoes_token_verbatim() {
        let body = br#"{"type":"url_verification","token":"x","challenge":"abc+/= 123","event":{}}"#;
        match classify(body).unwrap() {
            Inbound::Challenge(challenge) => assert_eq!(challenge, "abc+/= 123"),
            other => panic!("expected challenge, got {other:?}"),
        }
    }

    #[test]
    fn classify_challenge_without_challenge_fails() {
        let result = classify(br#"{"type":"url_verification"}"#);
        assert!(matches!(result, Err(ClassifyError::MissingChallenge)));

        let result = classify(br#"{"type":"url_verification","challenge":42}"#);
        assert!(matches!(result, Err(ClassifyError::MissingChallenge)));
    }

    #[test]
    fn classify_challenge_token_is_optional() {
        match classify(br#"{"type":"url_verification","challenge":"xyz"}"#).unwrap() {
            Inbound::Challenge(challenge) => assert_eq!(challenge, "xyz"),
            other => panic!("expected challenge, got {other:?}"),
        }
    }

    #[test]
    fn classify_envelope() {
        let body = envelope_body(json!({"type": "message", "channel": "C1", "ts": "1.1"}));
        match classify(&body).unwrap() {
            Inbound::Envelope(envelope) => {
                assert_eq!(envelope.event_id, "Ev1");
                assert_eq!(envelope.event.ts.as_deref(), Some("1.1"));
            }
            other => panic!("expected envelope, got {other:?}"),
        }
    }

    #[test]
    fn classify_rejects_other_shapes() {
        assert!(matches!(
            classify(br#"{"type":"app_rate_limited"}"#),
            Err(ClassifyError::Unrecognized)
        ));
        assert!(matches!(classify(b"not json"), Err(ClassifyError::Json(_))));
        assert!(matches!(
            classify(br#"{"event":{"ts":"1"}}"#),
            Err(ClassifyError::Envelope(_))
        ));
    }

    #[test]
    fn root_when_thread_ts_missing_or_equal() {
        let event = MirrorEvent::from_message(message(json!({"ts": "100.1"}))).unwrap();
        assert!(!event.is_reply());
        assert_eq!(event.dedup_key(), "100.1");
        assert_eq!(event.thread_key(), "100.1");

        let event =
            MirrorEvent::from_message(message(json!({"ts": "100.1", "thread_ts": "100.1"})))
                .unwrap();
        assert!(!event.is_reply());
    }

    #[test]
    fn reply_when_thread_ts_differs() {
        let event =
            MirrorEvent::from_message(message(json!({"ts": "100.2", "thread_ts": "100.1"})))
                .unwrap();
        assert!(event.is_reply());
        assert_eq!(event.dedup_key(), "100.2");
        assert_eq!(event.thread_key(), "100.1");
    }

    #[test]
    fn missing_ts_is_malformed() {
        let result = MirrorEvent::from_message(message(json!({"text": "hi", "channel": "C1"})));
        assert_eq!(result, Err(MalformedEvent::MissingTs));

        let result = MirrorEvent::from_message(message(json!({"ts": "  "})));
        assert_eq!(result, Err(MalformedEvent::MissingTs));
    }

    #[test]
    fn ignored_subtypes_and_bots() {
        let edited = MirrorEvent::from_message(message(
            json!({"ts": "1", "subtype": "message_changed"}),
        ))
        .unwrap();
        assert_eq!(edited.ignored(true), Some(Ignored::Subtype));

        let bot = MirrorEvent::from_message(message(json!({"ts": "1", "bot_id": "B1"}))).unwrap();
        assert_eq!(bot.ignored(true), Some(Ignored::Bot));
        assert_eq!(bot.ignored(false), None);

        let reaction =
            MirrorEvent::from_message(message(json!({"type": "reaction_added", "ts": "1"})))
                .unwrap();
        assert_eq!(reaction.ignored(true), Some(Ignored::NotAMessage));

        let share = MirrorEvent::from_message(message(
            json!({"type": "message", "ts": "1", "subtype": "file_share"}),
        ))
        .unwrap();
        assert_eq!(share.ignored(true), None);
    }
}
