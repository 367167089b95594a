use super::domain::{RepoIdentifier, SubmissionOutcome, SEND_FAILURE_MESSAGE};
use super::http::{build_client, HttpClientError};
use crate::config::SourcegraphServer;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};

const REPO_NOT_FOUND: &str = "repo not found";

/// Enqueues a canonical repository for embeddings.
#[async_trait]
pub trait EmbeddingScheduler: Send + Sync {
    async fn schedule(&self, identifier: &RepoIdentifier) -> SubmissionOutcome;
}

/// Sends the scheduling mutation to a Sourcegraph GraphQL endpoint, once.
#[derive(Clone)]
pub struct SubmissionClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl SubmissionClient {
    pub fn new(
        server: &SourcegraphServer,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HttpClientError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: server.graphql_url(),
            token: token.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for SubmissionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EmbeddingScheduler for SubmissionClient {
    async fn schedule(&self, identifier: &RepoIdentifier) -> SubmissionOutcome {
        let body = json!({ "query": schedule_mutation(identifier) });

        let response = match self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return send_failure(identifier, &err),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => return send_failure(identifier, &err),
        };

        let outcome = classify_response(status, &text);
        match &outcome {
            SubmissionOutcome::Succeeded => {
                debug!(%status, body = %text, "GraphQL mutation succeeded");
                info!(%identifier, "scheduled repository for embeddings");
            }
            _ => error!(%identifier, %status, body = %text, "GraphQL mutation failed"),
        }
        outcome
    }
}

fn send_failure(identifier: &RepoIdentifier, err: &reqwest::Error) -> SubmissionOutcome {
    if err.is_timeout() {
        error!(%identifier, error = %err, "GraphQL mutation timed out");
        SubmissionOutcome::TimedOut
    } else {
        error!(%identifier, error = %err, "GraphQL mutation could not be sent");
        SubmissionOutcome::TransportError(SEND_FAILURE_MESSAGE.to_string())
    }
}

pub(crate) fn schedule_mutation(identifier: &RepoIdentifier) -> String {
    format!(
        "mutation {{ scheduleRepositoriesForEmbedding(repoNames: [\"{identifier}\"]) {{ alwaysNil }} }}"
    )
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

/// Maps the HTTP status and body of the mutation onto a submission outcome.
pub fn classify_response(status: StatusCode, body: &str) -> SubmissionOutcome {
    if status != StatusCode::OK {
        return SubmissionOutcome::TransportError(format!(
            "Sourcegraph server responded with HTTP {}: {body}",
            status.as_u16()
        ));
    }

    let parsed: GraphQlResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            return SubmissionOutcome::TransportError(format!(
                "Sourcegraph server returned an unreadable response: {body}"
            ))
        }
    };

    match parsed.errors {
        Some(errors) if !errors.is_empty() => {
            SubmissionOutcome::FailedWithMessage(error_message(&errors, body))
        }
        _ => SubmissionOutcome::Succeeded,
    }
}

// "repo not found" is the one remote error users can act on, so its text is
// shown without the surrounding GraphQL structure.
fn error_message(errors: &[Value], body: &str) -> String {
    if body.contains(REPO_NOT_FOUND) {
        return errors
            .iter()
            .filter_map(|error| error.get("message").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n");
    }

    serde_json::to_string(errors).unwrap_or_else(|_| body.to_string())
}
