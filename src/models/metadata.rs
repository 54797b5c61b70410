use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Page metadata resolved for a single URL.
///
/// `title` and `favicon` are never empty once built by the extractor; the
/// other fields are empty strings when the page does not provide them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UrlMetadata {
    pub title: String,
    pub description: String,
    pub image: String,
    pub favicon: String,
    pub domain: String,
}
