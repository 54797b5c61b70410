use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use super::cache::{cache_key, MetadataCache};
use super::extract::extract;
use super::source::{FetchError, PageSource};
use crate::models::UrlMetadata;

pub const DEFAULT_CACHE_HOURS: u32 = 24;
pub const MIN_CACHE_HOURS: u32 = 1;
pub const MAX_CACHE_HOURS: u32 = 168;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
}

/// Parse `input` as an absolute http(s) URL with a host.
pub fn parse_http_url(input: &str) -> Result<Url, ResolveError> {
    let parsed = Url::parse(input.trim()).map_err(|_| ResolveError::InvalidUrl(input.into()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(ResolveError::InvalidUrl(input.into())),
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ResolveError::InvalidUrl(input.into()));
    }

    Ok(parsed)
}

/// Cache-first metadata resolution.
///
/// A hit performs no network I/O. A miss performs exactly one fetch and, on
/// success, exactly one cache write.
#[derive(Clone)]
pub struct MetadataFetcher {
    source: Arc<dyn PageSource>,
    cache: Arc<dyn MetadataCache>,
    ttl: Duration,
}

impl MetadataFetcher {
    /// `cache_hours` is clamped to `1..=168`.
    pub fn new(source: Arc<dyn PageSource>, cache: Arc<dyn MetadataCache>, cache_hours: u32) -> Self {
        let hours = cache_hours.clamp(MIN_CACHE_HOURS, MAX_CACHE_HOURS);
        Self {
            source,
            cache,
            ttl: Duration::from_secs(u64::from(hours) * 3600),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn resolve(&self, url: &str) -> Result<UrlMetadata, ResolveError> {
        let parsed = parse_http_url(url)?;
        let normalized = parsed.as_str().to_string();
        let key = cache_key(&normalized);

        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(url = %normalized, "Metadata cache hit");
            return Ok(hit);
        }

        let body = self.source.fetch(&parsed).await.map_err(|e| {
            tracing::warn!(error = %e, url = %normalized, "Failed to fetch URL for metadata");
            ResolveError::Fetch {
                url: normalized.clone(),
                source: e,
            }
        })?;

        let metadata = extract(&body, &normalized);
        self.cache.put(&key, metadata.clone(), self.ttl);

        tracing::debug!(url = %normalized, title = %metadata.title, "Resolved URL metadata");
        Ok(metadata)
    }
}

// ── Unit tests ─────────────────────────────────────────────────────────────
