use super::domain::{Reachability, RepoIdentifier};
use super::http::{build_client, HttpClientError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Advisory check that a repository is publicly reachable.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn probe(&self, identifier: &RepoIdentifier) -> Reachability;
}

/// Issues one GET against the repository's public web page.
#[derive(Debug, Clone)]
pub struct HttpReachabilityProbe {
    client: reqwest::Client,
}

impl HttpReachabilityProbe {
    pub fn new(timeout: Duration) -> Result<Self, HttpClientError> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    /// Probes an arbitrary address; any 2xx counts as reachable.
    pub async fn check(&self, url: &str) -> Reachability {
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(%url, status = %response.status(), "validated repo exists");
                Reachability::Reachable
            }
            Ok(response) => {
                warn!(%url, status = %response.status(), "failed to validate repo exists");
                Reachability::Unreachable {
                    reason: format!("HTTP {}", response.status().as_u16()),
                }
            }
            Err(err) if err.is_timeout() => {
                warn!(%url, error = %err, "repo probe timed out");
                Reachability::Unreachable {
                    reason: "timed out".to_string(),
                }
            }
            Err(err) => {
                warn!(%url, error = %err, "repo probe failed");
                Reachability::Unreachable {
                    reason: "request failed".to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl ReachabilityProbe for HttpReachabilityProbe {
    async fn probe(&self, identifier: &RepoIdentifier) -> Reachability {
        self.check(&identifier.https_url()).await
    }
}
