//! Feed acquisition over HTTP or from the local filesystem.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::debug;

/// Issues a GET for `url` through `client` and returns the response body.
///
/// # Errors
///
/// Fails on an unparseable URL, a transport error or a non-success status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Loads feed bytes from `source`: fetched through `client` when it is an
/// `http(s)` URL, read from disk otherwise.
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("failed to fetch {source}"))?
    } else {
        std::fs::read(source).with_context(|| format!("failed to read {source}"))?
    };
    debug!(source, bytes = bytes.len(), "Feed bytes loaded");
    Ok(bytes)
}
