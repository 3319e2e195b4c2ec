//! Destination collaboration API.

use async_trait::async_trait;
use thiserror::Error;

mod graphql;

pub use graphql::GraphqlDestination;

/// Write side of the destination system.
///
/// Each call performs exactly one create operation and returns the id of the
/// created item. Implementations do not retry.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Create a top-level post in `group_id`.
    async fn create_post(&self, group_id: &str, markdown: &str) -> Result<String, DestinationError>;

    /// Create a comment under `parent_id`.
    async fn create_comment(
        &self,
        parent_id: &str,
        markdown: &str,
    ) -> Result<String, DestinationError>;
}

#[derive(Debug, Error)]
pub enum DestinationError {
    /// The request never produced a response.
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("transport error (status {status}): {message}")]
    Transport { status: u16, message: String },

    /// The API answered but reported operation errors.
    #[error("{operation} rejected: {}", messages.join("; "))]
    Semantic {
        operation: &'static str,
        messages: Vec<String>,
    },

    /// The API answered without errors but also without an id.
    #[error("{operation} response did not include an id")]
    MissingId { operation: &'static str },
}

impl DestinationError {
    /// Short machine-readable error kind for reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            DestinationError::Request(_) | DestinationError::Transport { .. } => "transport",
            DestinationError::Semantic { .. } => "semantic",
            DestinationError::MissingId { .. } => "missing_id",
        }
    }
}
