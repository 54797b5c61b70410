use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use validator::Validate;

use crate::{
    error::{validation_error, AppResult},
    models::{LinkCardQuery, LinkListRequest, QuoteCardRequest},
    render::QuoteAttribution,
    state::AppState,
};

// ============================================================================
// Handlers
// ============================================================================
//
// Card routes answer 200 even when a card cannot be built; the body is then
// an HTML comment placeholder. Only malformed requests are rejected.

/// GET /cards/link?url=...&style=...
pub async fn link_card(
    State(state): State<AppState>,
    Query(query): Query<LinkCardQuery>,
) -> Html<String> {
    Html(
        state
            .renderer
            .render_link_card(query.url.as_deref(), &query.attrs)
            .await,
    )
}

/// POST /cards/quote
pub async fn quote_card(
    State(state): State<AppState>,
    Json(req): Json<QuoteCardRequest>,
) -> AppResult<Html<String>> {
    req.validate().map_err(validation_error)?;

    let attribution = QuoteAttribution {
        author: req.author.as_deref(),
        source: req.source.as_deref(),
        url: req.url.as_deref(),
    };

    Ok(Html(state.renderer.render_quote_card(
        &req.content,
        &attribution,
        &req.attrs,
    )))
}

/// POST /cards/list
pub async fn link_list(
    State(state): State<AppState>,
    Json(req): Json<LinkListRequest>,
) -> AppResult<Html<String>> {
    req.validate().map_err(validation_error)?;

    tracing::debug!(lines = req.body.lines().count(), "Rendering link list");
    Ok(Html(
        state.renderer.render_link_list(&req.body, &req.attrs).await,
    ))
}
