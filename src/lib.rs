pub mod color;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metadata;
pub mod models;
pub mod render;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;

use crate::config::Config;
use crate::metadata::{FetchError, HttpPageSource, InMemoryCache, MetadataFetcher};
use crate::render::CardRenderer;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::link_preview::get_link_preview),
    components(schemas(models::UrlMetadata))
)]
pub struct ApiDoc;

/// Wire the fetcher, cache and renderer described by `config`.
pub fn build_state(config: &Config) -> Result<AppState, FetchError> {
    let cache = InMemoryCache::new();
    let source = HttpPageSource::new(config.allow_private_hosts)?;
    let fetcher = MetadataFetcher::new(
        Arc::new(source),
        Arc::new(cache.clone()),
        config.card_defaults.cache_duration_hours,
    );

    Ok(AppState {
        renderer: Arc::new(CardRenderer::new(fetcher, config.card_defaults.clone())),
        cache,
    })
}

/// All API routes, without process-level layers (metrics, CORS, tracing).
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/link-preview", get(handlers::link_preview::get_link_preview))
        .route("/cards/link", get(handlers::cards::link_card))
        .route("/cards/quote", post(handlers::cards::quote_card))
        .route("/cards/list", post(handlers::cards::link_list))
        .with_state(state)
}
