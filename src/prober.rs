//! Existence probing against the static asset host.
//!
//! Probing is the only way the engine detects newly published slides, so
//! every probe bypasses intermediate caches and reflects current origin
//! state. All network failures collapse to "not found".

use crate::error::Result;
use log::debug;
use reqwest::StatusCode;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use std::time::Duration;

/// Checks whether a slide URL exists on the remote host.
///
/// Implementations must never fail: ambiguous or erroneous outcomes are
/// reported as `false`.
pub trait SlideProber: Send + Sync {
    fn exists(&self, url: &str) -> impl Future<Output = bool> + Send;
}

/// HTTP prober issuing a HEAD request with a GET fallback.
pub struct HttpProber {
    client: reqwest::Client,
}

fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

impl HttpProber {
    /// Creates a prober with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tour-cache/", env!("CARGO_PKG_VERSION")))
            .default_headers(no_cache_headers())
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Full-retrieval fallback for hosts that reject HEAD. Only the status
    /// matters; the body is discarded.
    async fn exists_via_get(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!("GET probe failed for {}: {}", url, err);
                false
            }
        }
    }
}

impl SlideProber for HttpProber {
    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED
                {
                    // Host does not support HEAD.
                    return self.exists_via_get(url).await;
                }
                status.is_success()
            }
            Err(err) => {
                debug!("HEAD probe failed for {}: {}", url, err);
                self.exists_via_get(url).await
            }
        }
    }
}
