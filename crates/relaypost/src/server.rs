use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Config, ConfigError, StoreKind};
use crate::destination::GraphqlDestination;
use crate::handlers;
use crate::mirror::Mirror;
use crate::store::{FileMappingStore, MappingStore, MemoryMappingStore};
use crate::users::{ChainedResolver, SlackUserResolver, StaticDirectory, UserResolver};
use crate::verify::SlackVerifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub mirror: Mirror,
    /// Signature verification; disabled when `None`.
    pub verifier: Option<SlackVerifier>,
}

impl AppState {
    /// Assemble the pipeline and its collaborators from a validated config.
    pub async fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let (Some(endpoint), Some(token)) = (
            config.destination.endpoint.as_deref(),
            config.destination.token.as_deref(),
        ) else {
            return Err(ConfigError::Invalid("destination is not configured"));
        };
        let destination = Arc::new(GraphqlDestination::new(endpoint, token));

        let mut mirror = Mirror::new(config.channels.clone(), destination)
            .skip_bot_messages(config.slack.skip_bot_messages);

        let store: Option<Arc<dyn MappingStore>> = match config.store.kind {
            StoreKind::None => None,
            StoreKind::Memory => Some(Arc::new(MemoryMappingStore::new())),
            StoreKind::File => {
                let store = FileMappingStore::open(&config.store.path).await?;
                info!(
                    path = %store.path().display(),
                    mappings = store.len(),
                    "Loaded mapping store"
                );
                Some(Arc::new(store))
            }
        };
        if let Some(store) = store {
            mirror = mirror.with_store(store);
        }

        if let Some(users) = build_resolver(config) {
            mirror = mirror.with_users(users);
        }

        Ok(Self {
            mirror,
            verifier: config.slack.signing_secret.as_deref().map(SlackVerifier::new),
        })
    }
}

fn build_resolver(config: &Config) -> Option<Arc<dyn UserResolver>> {
    let mut resolvers: Vec<Box<dyn UserResolver>> = Vec::new();
    if !config.users.names.is_empty() {
        resolvers.push(Box::new(StaticDirectory::new(config.users.names.clone())));
    }
    if config.users.slack_lookup
        && let Some(token) = config.slack.bot_token.as_deref()
    {
        resolvers.push(Box::new(SlackUserResolver::new(token)));
    }

    match resolvers.len() {
        0 => None,
        1 => resolvers
            .pop()
            .map(|resolver| Arc::from(resolver) as Arc<dyn UserResolver>),
        _ => Some(Arc::new(ChainedResolver::new(resolvers))),
    }
}

pub fn build_app(state: AppState, request_timeout_secs: u64) -> Router {
    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route("/version", get(handlers::version))
        .route("/slack/events", post(handlers::slack_events))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_secs),
        ))
}
