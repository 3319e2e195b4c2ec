//! The mirroring pipeline.
//!
//! One validated [`MirrorEvent`] flows through these stages:
//!
//! ```text
//!  MirrorEvent
//!       │  1. ignored subtype / bot message?          → Skipped
//!       │  2. channel admitted?                        → Skipped(UnmappedChannel)
//!       │  3. reply without a mapping store?           → Skipped(NoMappingStore)
//!       │  4. lock thread key
//!       │  5. own ts already mapped?                   → Skipped(AlreadyMirrored)
//!       │  6. normalize body (+ author attribution)    → Skipped(EmptyContent)
//!       ▼
//!  Root  ── createPost(group)     ── save(ts → post)
//!  Reply ── find(thread_ts)                            → Skipped(OrphanReply)
//!        ── createComment(parent) ── save(thread_ts → comment), save(ts → comment)
//! ```
//!
//! Destination, store and resolver errors end processing of the event and
//! are surfaced as [`MirrorError`]; nothing is retried.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::destination::{Destination, DestinationError};
use crate::event::{Ignored, MirrorEvent};
use crate::normalize::normalize;
use crate::store::{MappingStore, StoreError};
use crate::sync::KeyedLocks;
use crate::users::{ResolveError, UserResolver};

mod report;

pub use report::{EventRef, MirrorReporter, TracingReporter};

// ============================================================================
// Outcomes
// ============================================================================

/// Result of processing one event without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Mirrored(Mirrored),
    Skipped(SkipReason),
}

/// A successful destination write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirrored {
    pub target: Target,
    pub destination_id: String,
}

/// Where the content was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Post { group_id: String },
    Comment { parent_id: String },
}

impl Target {
    pub fn operation(&self) -> &'static str {
        match self {
            Target::Post { .. } => "createPost",
            Target::Comment { .. } => "createComment",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Target::Post { group_id } => group_id,
            Target::Comment { parent_id } => parent_id,
        }
    }
}

/// Expected, silent reasons not to mirror an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Ignored(Ignored),
    UnmappedChannel,
    NoMappingStore,
    AlreadyMirrored,
    EmptyContent,
    OrphanReply,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Ignored(Ignored::NotAMessage) => "not_a_message",
            SkipReason::Ignored(Ignored::Subtype) => "ignored_subtype",
            SkipReason::Ignored(Ignored::Bot) => "bot_message",
            SkipReason::UnmappedChannel => "unmapped_channel",
            SkipReason::NoMappingStore => "no_mapping_store",
            SkipReason::AlreadyMirrored => "already_mirrored",
            SkipReason::EmptyContent => "empty_content",
            SkipReason::OrphanReply => "orphan_reply",
        }
    }
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("destination: {0}")]
    Destination(#[from] DestinationError),

    #[error("mapping store: {0}")]
    Store(#[from] StoreError),

    #[error("user resolver: {0}")]
    Resolve(#[from] ResolveError),
}

impl MirrorError {
    pub fn kind(&self) -> &'static str {
        match self {
            MirrorError::Destination(e) => e.kind(),
            MirrorError::Store(_) => "store",
            MirrorError::Resolve(_) => "resolver",
        }
    }
}

// ============================================================================
// Mirror
// ============================================================================

/// The pipeline and its collaborators. Cheap to clone.
#[derive(Clone)]
pub struct Mirror {
    channels: Arc<HashMap<String, String>>,
    destination: Arc<dyn Destination>,
    store: Option<Arc<dyn MappingStore>>,
    users: Option<Arc<dyn UserResolver>>,
    reporter: Arc<dyn MirrorReporter>,
    thread_locks: KeyedLocks,
    skip_bot_messages: bool,
}

impl Mirror {
    /// Create a pipeline with no store, no resolver and the tracing reporter.
    pub fn new(channels: HashMap<String, String>, destination: Arc<dyn Destination>) -> Self {
        Self {
            channels: Arc::new(channels),
            destination,
            store: None,
            users: None,
            reporter: Arc::new(TracingReporter),
            thread_locks: KeyedLocks::new(),
            skip_bot_messages: true,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn MappingStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_users(mut self, users: Arc<dyn UserResolver>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn MirrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn skip_bot_messages(mut self, skip: bool) -> Self {
        self.skip_bot_messages = skip;
        self
    }

    /// Destination group for a channel, if the channel is mirrored.
    pub fn admit(&self, channel: Option<&str>) -> Option<&str> {
        channel
            .and_then(|channel| self.channels.get(channel))
            .map(String::as_str)
    }

    /// Process an event and hand the outcome to the reporter.
    pub async fn run(&self, event_id: &str, event: &MirrorEvent) {
        let message = event.message();
        let event_ref = EventRef {
            event_id,
            channel: message.channel.as_deref(),
            ts: &message.ts,
        };
        match self.process(event).await {
            Ok(Outcome::Mirrored(mirrored)) => self.reporter.mirrored(event_ref, &mirrored),
            Ok(Outcome::Skipped(reason)) => self.reporter.skipped(event_ref, reason),
            Err(err) => self.reporter.failed(event_ref, &err),
        }
    }

    /// Process an event.
    pub async fn process(&self, event: &MirrorEvent) -> Result<Outcome, MirrorError> {
        if let Some(ignored) = event.ignored(self.skip_bot_messages) {
            return Ok(Outcome::Skipped(SkipReason::Ignored(ignored)));
        }

        let message = event.message();
        let Some(group_id) = self.admit(message.channel.as_deref()) else {
            return Ok(Outcome::Skipped(SkipReason::UnmappedChannel));
        };

        if event.is_reply() && self.store.is_none() {
            return Ok(Outcome::Skipped(SkipReason::NoMappingStore));
        }

        let _thread = self.thread_locks.lock(event.thread_key()).await;

        if let Some(store) = &self.store
            && store.find(event.dedup_key()).await?.is_some()
        {
            return Ok(Outcome::Skipped(SkipReason::AlreadyMirrored));
        }

        let mut markdown = normalize(&message.body);
        if markdown.trim().is_empty() {
            return Ok(Outcome::Skipped(SkipReason::EmptyContent));
        }
        if let Some(name) = self.author_name(message.author.as_deref()).await? {
            markdown = format!("**{name}**\n\n{markdown}");
        }

        match event {
            MirrorEvent::Root(message) => {
                let destination_id = self.destination.create_post(group_id, &markdown).await?;
                if let Some(store) = &self.store {
                    store.save(&message.ts, &destination_id).await?;
                }
                Ok(Outcome::Mirrored(Mirrored {
                    target: Target::Post {
                        group_id: group_id.to_string(),
                    },
                    destination_id,
                }))
            }
            MirrorEvent::Reply { message, thread_ts } => {
                let Some(store) = &self.store else {
                    return Ok(Outcome::Skipped(SkipReason::NoMappingStore));
                };
                let Some(parent_id) = store.find(thread_ts).await? else {
                    return Ok(Outcome::Skipped(SkipReason::OrphanReply));
                };

                let destination_id = self
                    .destination
                    .create_comment(&parent_id, &markdown)
                    .await?;
                // Dedup marker first: a failed thread update must not allow a repost.
                store.save(&message.ts, &destination_id).await?;
                store.save(thread_ts, &destination_id).await?;
                Ok(Outcome::Mirrored(Mirrored {
                    target: Target::Comment { parent_id },
                    destination_id,
                }))
            }
        }
    }

    async fn author_name(&self, author: Option<&str>) -> Result<Option<String>, ResolveError> {
        match (&self.users, author) {
            (Some(users), Some(author)) => Ok(users
                .display_name(author)
                .await?
                .filter(|name| !name.trim().is_empty())),
            _ => Ok(None),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
