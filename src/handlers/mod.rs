pub mod cards;
pub mod link_preview;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "quickcards-server",
            "version": env!("CARGO_PKG_VERSION"),
            "cached_entries": state.cache.len(),
        })),
    )
}
