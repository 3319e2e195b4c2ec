//! Slack Events API wire types for relaypost.
//!
//! These types describe the JSON bodies Slack posts to an Events API
//! request URL. They are deliberately lenient: every field that Slack may
//! omit is optional, and unknown block or element kinds deserialize into an
//! `Unknown` variant instead of failing the whole payload.
//!
//! Classification of a raw body (handshake vs. message envelope) lives in
//! the `relaypost` crate; this crate only carries the shapes.

mod attachment;
mod block;
mod envelope;
mod message;

pub use attachment::{Attachment, AttachmentField};
pub use block::{
    Block, ContextElement, ListStyle, RichTextElement, RichTextInline, TextObject, TextStyle,
};
pub use envelope::{EventEnvelope, URL_VERIFICATION, UrlVerification};
pub use message::MessageEvent;
