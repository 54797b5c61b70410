pub mod card;
pub mod metadata;

pub use card::{CardAttributes, CardStyle, LinkCardQuery, LinkListRequest, QuoteCardRequest};
pub use metadata::UrlMetadata;
