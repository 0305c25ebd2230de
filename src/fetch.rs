//! Raw byte loading for dataset sources.
//!
//! A source is either a local path or an `http(s)://` URL; the published
//! Bluebikes station list is served over HTTP, so both are accepted wherever
//! a dataset path is.

use anyhow::{Context, Result};
use tracing::debug;

/// Returns `true` if `source` should be fetched over HTTP rather than read from disk.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetches the body at `url` with a blocking GET.
///
/// # Errors
///
/// Returns an error on transport failures and on non-success status codes.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let resp = reqwest::blocking::get(url)?.error_for_status()?;
    Ok(resp.bytes()?.to_vec())
}

/// Loads the bytes of a dataset from a local file path or a URL.
#[tracing::instrument]
pub fn read_source(source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        fetch_bytes(source).with_context(|| format!("failed to fetch '{source}'"))?
    } else {
        std::fs::read(source).with_context(|| format!("failed to read '{source}'"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}
