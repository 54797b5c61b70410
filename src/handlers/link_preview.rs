use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppResult;
use crate::models::UrlMetadata;
use crate::state::AppState;

// ── Query params ───────────────────────────────────────────────────────────

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LinkPreviewQuery {
    /// Absolute http(s) URL of the page to preview.
    pub url: String,
}

// ── Handler ────────────────────────────────────────────────────────────────

/// GET /link-preview?url=<encoded-url>
///
/// Returns the card metadata for the given URL, served from cache when a
/// fresh entry exists.
#[utoipa::path(
    get,
    path = "/link-preview",
    params(LinkPreviewQuery),
    responses(
        (status = 200, description = "Resolved page metadata", body = UrlMetadata),
        (status = 400, description = "Invalid URL or the page could not be fetched")
    )
)]
pub async fn get_link_preview(
    State(state): State<AppState>,
    Query(params): Query<LinkPreviewQuery>,
) -> AppResult<Json<UrlMetadata>> {
    let metadata = state.renderer.fetcher().resolve(&params.url).await?;
    Ok(Json(metadata))
}
