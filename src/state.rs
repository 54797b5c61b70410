use std::sync::Arc;

use crate::metadata::InMemoryCache;
use crate::render::CardRenderer;

/// Shared application state passed to all handlers.
/// The renderer owns the fetcher; the cache handle is kept for the sweeper
/// and the health report.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<CardRenderer>,
    pub cache: InMemoryCache,
}
