//! Slack `users.info` lookup.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{ResolveError, UserResolver};

const SLACK_API_BASE: &str = "https://slack.com/api";

/// Resolves names through the Slack Web API, caching hits for the lifetime
/// of the process.
#[derive(Clone)]
pub struct SlackUserResolver {
    client: Client,
    api_base: String,
    bot_token: String,
    cache: Arc<DashMap<String, String>>,
}

impl fmt::Debug for SlackUserResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackUserResolver")
            .field("api_base", &self.api_base)
            .field("bot_token", &"<redacted>")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl SlackUserResolver {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self::with_api_base(SLACK_API_BASE, bot_token)
    }

    pub fn with_api_base(api_base: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            bot_token: bot_token.into(),
            cache: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl UserResolver for SlackUserResolver {
    async fn display_name(&self, user_id: &str) -> Result<Option<String>, ResolveError> {
        if let Some(name) = self.cache.get(user_id) {
            return Ok(Some(name.value().clone()));
        }

        let url = Url::parse_with_params(
            &format!("{}/users.info", self.api_base),
            &[("user", user_id)],
        )?;
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.bot_token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ResolveError::Status {
                status: response.status().as_u16(),
            });
        }

        let body: UsersInfoResponse = response.json().await?;
        if !body.ok {
            return match body.error.as_deref() {
                Some("user_not_found") => Ok(None),
                other => Err(ResolveError::Api(
                    other.unwrap_or("unknown_error").to_string(),
                )),
            };
        }

        let name = body.user.and_then(SlackUser::best_name);
        if let Some(ref name) = name {
            debug!(user_id, "Cached Slack display name");
            self.cache.insert(user_id.to_string(), name.clone());
        }
        Ok(name)
    }
}

#[derive(Debug, Deserialize)]
struct UsersInfoResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: Option<SlackUser>,
}

#[derive(Debug, Deserialize)]
struct SlackUser {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    real_name: Option<String>,
    #[serde(default)]
    profile: Option<SlackProfile>,
}

#[derive(Debug, Deserialize)]
struct SlackProfile {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    real_name: Option<String>,
}

impl SlackUser {
    /// Profile display name, then real name, then handle.
    fn best_name(self) -> Option<String> {
        let profile = self.profile.unwrap_or(SlackProfile {
            display_name: None,
            real_name: None,
        });
        [profile.display_name, profile.real_name, self.real_name, self.name]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn resolves_and_caches_display_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users.info"))
            .and(query_param("user", "U1"))
            .and(header("authorization", "Bearer xoxb-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "user": {"name": "ada", "real_name": "Ada L", "profile": {"display_name": ""}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = SlackUserResolver::with_api_base(server.uri(), "xoxb-1");
        assert_eq!(
            resolver.display_name("U1").await.unwrap().as_deref(),
            Some("Ada L")
        );
        assert_eq!(
            resolver.display_name("U1").await.unwrap().as_deref(),
            Some("Ada L")
        );
    }

    #[tokio::test]
    async fn unknown_user_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": false, "error": "user_not_found"})),
            )
            .mount(&server)
            .await;

        let resolver = SlackUserResolver::with_api_base(server.uri(), "xoxb-1");
        assert_eq!(resolver.display_name("U404").await.unwrap(), None);
    }

    #[tokio::test]
    async fn api_errors_propagate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ok": false, "error": "invalid_auth"})),
            )
            .mount(&server)
            .await;

        let resolver = SlackUserResolver::with_api_base(server.uri(), "bad");
        let err = resolver.display_name("U1").await.unwrap_err();
        assert!(matches!(err, ResolveError::Api(ref code) if code == "invalid_auth"));
    }

    #[test]
    fn debug_redacts_token() {
        let resolver = SlackUserResolver::new("xoxb-secret");
        assert!(!format!("{resolver:?}").contains("xoxb-secret"));
    }
}
