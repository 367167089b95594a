use std::time::Duration;

pub(crate) const USER_AGENT: &str = concat!("repo-intake/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
#[error("failed to build HTTP client: {0}")]
pub struct HttpClientError(#[from] reqwest::Error);

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, HttpClientError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?;
    Ok(client)
}
