//! GraphQL client for the destination API.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::{Destination, DestinationError};

const CREATE_POST: &str = "mutation CreatePost($groupId: ID!, $input: CreatePostInput!) {
  createPost(groupId: $groupId, input: $input) {
    post { id }
    errors { message }
  }
}";

const CREATE_COMMENT: &str = "mutation CreateComment($postId: ID!, $input: CreateCommentInput!) {
  createComment(postId: $postId, input: $input) {
    comment { id }
    errors { message }
  }
}";

/// A mutation and where its result lives in the response payload.
struct Mutation {
    field: &'static str,
    node: &'static str,
    query: &'static str,
}

const POST: Mutation = Mutation {
    field: "createPost",
    node: "post",
    query: CREATE_POST,
};

const COMMENT: Mutation = Mutation {
    field: "createComment",
    node: "comment",
    query: CREATE_COMMENT,
};

/// Bearer-authenticated GraphQL destination.
pub struct GraphqlDestination {
    client: Client,
    endpoint: String,
    token: String,
}

impl fmt::Debug for GraphqlDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphqlDestination")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl GraphqlDestination {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint, token)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    async fn mutate(&self, mutation: &Mutation, variables: Value) -> Result<String, DestinationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&json!({
                "query": mutation.query,
                "variables": variables,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(DestinationError::Transport { status, message });
        }

        let body: GraphqlResponse = response.json().await?;
        debug!(operation = mutation.field, "Destination responded");
        extract_id(mutation, body)
    }
}

#[async_trait]
impl Destination for GraphqlDestination {
    async fn create_post(&self, group_id: &str, markdown: &str) -> Result<String, DestinationError> {
        self.mutate(
            &POST,
            json!({
                "groupId": group_id,
                "input": { "markdown": markdown },
            }),
        )
        .await
    }

    async fn create_comment(
        &self,
        parent_id: &str,
        markdown: &str,
    ) -> Result<String, DestinationError> {
        self.mutate(
            &COMMENT,
            json!({
                "postId": parent_id,
                "input": { "markdown": markdown },
            }),
        )
        .await
    }
}

// --- Response handling ---

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
}

/// Pull the created id out of a response, surfacing errors at either the
/// GraphQL top level or inside the mutation payload.
fn extract_id(mutation: &Mutation, response: GraphqlResponse) -> Result<String, DestinationError> {
    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        return Err(DestinationError::Semantic {
            operation: mutation.field,
            messages: errors.into_iter().map(|e| e.message).collect(),
        });
    }

    let payload = response
        .data
        .as_ref()
        .and_then(|data| data.get(mutation.field))
        .filter(|payload| !payload.is_null());
    let Some(payload) = payload else {
        return Err(DestinationError::MissingId {
            operation: mutation.field,
        });
    };

    if let Some(errors) = payload.get("errors").and_then(Value::as_array)
        && !errors.is_empty()
    {
        return Err(DestinationError::Semantic {
            operation: mutation.field,
            messages: errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string()
                })
                .collect(),
        });
    }

    match payload.get(mutation.node).and_then(|node| node.get("id")) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(DestinationError::MissingId {
            operation: mutation.field,
        }),
    }
}
