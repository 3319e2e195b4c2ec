//! Author display-name resolution.
//!
//! Resolution is optional: without a resolver the mirrored content carries
//! no attribution line.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

mod slack;

pub use slack::SlackUserResolver;

/// Maps a source user id to a human readable name.
///
/// `Ok(None)` means the user is unknown; it is not an error.
#[async_trait]
pub trait UserResolver: Send + Sync {
    async fn display_name(&self, user_id: &str) -> Result<Option<String>, ResolveError>;
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid lookup url: {0}")]
    Url(#[from] url::ParseError),

    #[error("user lookup failed (status {status})")]
    Status { status: u16 },

    #[error("user lookup rejected: {0}")]
    Api(String),
}

/// Fixed user id → name table, typically from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    names: HashMap<String, String>,
}

impl StaticDirectory {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self { names }
    }
}

#[async_trait]
impl UserResolver for StaticDirectory {
    async fn display_name(&self, user_id: &str) -> Result<Option<String>, ResolveError> {
        Ok(self.names.get(user_id).cloned())
    }
}

/// Consult resolvers in order; the first name found wins.
pub struct ChainedResolver {
    resolvers: Vec<Box<dyn UserResolver>>,
}

impl ChainedResolver {
    pub fn new(resolvers: Vec<Box<dyn UserResolver>>) -> Self {
        Self { resolvers }
    }
}

#[async_trait]
impl UserResolver for ChainedResolver {
    async fn display_name(&self, user_id: &str) -> Result<Option<String>, ResolveError> {
        for resolver in &self.resolvers {
            if let Some(name) = resolver.display_name(user_id).await? {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }
}
