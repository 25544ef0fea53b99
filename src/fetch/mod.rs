//! One-shot retrieval of a remote traffic CSV.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::debug;

/// Whether `source` names an HTTP(S) resource rather than a local path.
pub fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// GETs `url` and returns the body. Non-success statuses are errors.
#[tracing::instrument(skip(client))]
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Bytes> {
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("Invalid source URL '{url}'"))?,
    );

    let resp = client.execute(req).await?.error_for_status()?;
    let body = resp.bytes().await?;

    debug!(bytes = body.len(), "Source downloaded");
    Ok(body)
}

/// Fetches a remote source, sending `token` as a bearer credential when set.
pub async fn fetch_source(url: &str, token: Option<&str>) -> Result<Bytes> {
    let client = BasicClient::new();
    match token {
        Some(token) => fetch_bytes(&auth::ApiKey::bearer(client, token)?, url).await,
        None => fetch_bytes(&client, url).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/traffic.csv"));
        assert!(is_remote("HTTP://example.com/traffic.csv"));
        assert!(!is_remote("traffic_density_202412.csv"));
        assert!(!is_remote("/data/http/traffic.csv"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_url() {
        let client = BasicClient::new();
        assert!(fetch_bytes(&client, "not a url").await.is_err());
    }
}
