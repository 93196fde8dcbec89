//! Resource fetching: the only place source bytes enter the pipeline.
//!
//! Remote references are fetched with a single GET (no retries) carrying the
//! configured browser user agent; local references are read from disk. There
//! is no cache: every call goes back to the source.

use super::reference::{InputReference, Location};
use crate::config::ConversionConfig;
use crate::error::Doc2MdError;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Fetch the full contents of `reference`.
pub async fn fetch(
    reference: &InputReference,
    config: &ConversionConfig,
) -> Result<Vec<u8>, Doc2MdError> {
    match reference.location() {
        Location::Remote(url) => fetch_url(url.as_str(), config).await,
        Location::Local(path) => read_local(path).await,
    }
}

/// Read a local file, mapping absence and permission problems to their own
/// errors.
async fn read_local(path: &Path) -> Result<Vec<u8>, Doc2MdError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            debug!("Read {} bytes from {}", bytes.len(), path.display());
            Ok(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Doc2MdError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Doc2MdError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(e) => Err(Doc2MdError::Internal(format!(
            "Failed to read '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Download a URL into memory.
async fn fetch_url(url: &str, config: &ConversionConfig) -> Result<Vec<u8>, Doc2MdError> {
    info!("Fetching document from: {}", url);
    let timeout_secs = config.download_timeout_secs;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| Doc2MdError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_transport = |e: reqwest::Error| {
        if e.is_timeout() {
            Doc2MdError::FetchTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Doc2MdError::FetchFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_transport)?;

    if !response.status().is_success() {
        return Err(Doc2MdError::FetchFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_transport)?;
    info!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}
