use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::metadata::ResolveError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::InvalidUrl(_) => AppError::Validation("Invalid URL".into()),
            ResolveError::Fetch { .. } => AppError::Validation("Failed to fetch URL".into()),
        }
    }
}

/// Flatten validator errors into a single comma-separated message.
pub fn validation_error(e: validator::ValidationErrors) -> AppError {
    AppError::Validation(
        e.field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("{field}: {}", err.code),
                })
            })
            .collect::<Vec<_>>()
            .join(", "),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use validator::Validate;

    async fn body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_returns_400() {
        let response = AppError::Validation("invalid input".into()).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn validation_error_body_has_error_key() {
        let response = AppError::Validation("invalid input".into()).into_response();
        let json = body_json(response.into_body()).await;
        assert_eq!(json["error"], "invalid input");
    }

    #[test]
    fn resolve_errors_map_to_validation() {
        let invalid: AppError = ResolveError::InvalidUrl("x".into()).into();
        assert!(matches!(invalid, AppError::Validation(ref m) if m == "Invalid URL"));

        let fetch: AppError = ResolveError::Fetch {
            url: "https://down.test/".into(),
            source: crate::metadata::FetchError::Resolve("down.test".into()),
        }
        .into();
        assert!(matches!(fetch, AppError::Validation(ref m) if m == "Failed to fetch URL"));
    }

    #[derive(Validate)]
    struct Named {
        #[validate(length(max = 3))]
        name: String,
    }

    #[test]
    fn validator_errors_name_the_field() {
        let e = Named {
            name: "toolong".into(),
        }
        .validate()
        .unwrap_err();
        match validation_error(e) {
            AppError::Validation(msg) => assert_eq!(msg, "name: length"),
        }
    }
}
