//! Mirrors Slack channel messages and threads into a GraphQL collaboration
//! API.
//!
//! Inbound Slack Events API callbacks are classified, checked against the
//! channel table, deduplicated through a [`store::MappingStore`], rendered
//! to markdown and written as posts (root messages) or comments (thread
//! replies).

pub mod config;
pub mod destination;
pub mod event;
pub mod handlers;
pub mod mirror;
pub mod normalize;
pub mod response;
pub mod server;
pub mod store;
pub mod sync;
pub mod users;
pub mod verify;
