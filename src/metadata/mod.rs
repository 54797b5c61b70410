//! URL metadata resolution: pattern extraction, TTL caching and fetching.

pub mod cache;
pub mod extract;
pub mod fetch;
pub mod source;

pub use cache::{cache_key, spawn_sweeper, Clock, InMemoryCache, MetadataCache, SystemClock};
pub use extract::extract;
pub use fetch::{parse_http_url, MetadataFetcher, ResolveError};
pub use source::{FetchError, HttpPageSource, PageSource};
