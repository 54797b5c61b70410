use serde::Deserialize;
use strum::{AsRefStr, Display, EnumString};
use validator::Validate;

// ============================================================================
// Card attributes
// ============================================================================

/// Styling attributes shared by every card kind.
///
/// Values arrive as raw strings, exactly as an author would write them in
/// markup. Anything left unset falls back to the operator defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardAttributes {
    pub style: Option<String>,
    pub border_color: Option<String>,
    pub border_width: Option<String>,
    pub border_style: Option<String>,
    pub border_radius: Option<String>,
    pub border_left: Option<String>,
    pub shadow: Option<String>,
    pub postit_color: Option<String>,
    pub target: Option<String>,
    pub nofollow: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CardStyle {
    #[default]
    Card,
    Minimal,
    Postit,
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LinkCardQuery {
    pub url: Option<String>,
    #[serde(flatten)]
    pub attrs: CardAttributes,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuoteCardRequest {
    /// Quote body; capped at 10 000 characters.
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub content: String,
    pub source: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    #[serde(flatten)]
    pub attrs: CardAttributes,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LinkListRequest {
    /// Newline-separated URLs; capped at 20 000 characters.
    #[serde(default)]
    #[validate(length(max = 20000))]
    pub body: String,
    #[serde(flatten)]
    pub attrs: CardAttributes,
}

// ============================================================================
// Attribute sanitation
// ============================================================================

const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

/// Leading-digit integer parse: `"2px"` is 2, `"abc"` and `"-3"` are 0.
pub fn parse_px(input: &str) -> u32 {
    let digits: String = input
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Only the literal `"true"` enables a flag.
pub fn parse_flag(input: &str) -> bool {
    input.trim() == "true"
}

/// Restrict a border style to a CSS keyword, defaulting to `solid`.
pub fn sanitize_border_style(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    if BORDER_STYLES.contains(&lowered.as_str()) {
        lowered
    } else {
        "solid".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_px_reads_leading_digits() {
        assert_eq!(parse_px("2"), 2);
        assert_eq!(parse_px(" 12px"), 12);
        assert_eq!(parse_px("abc"), 0);
        assert_eq!(parse_px("-3"), 0);
        assert_eq!(parse_px(""), 0);
    }

    #[test]
    fn only_true_enables_flags() {
        assert!(parse_flag("true"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn border_style_is_restricted() {
        assert_eq!(sanitize_border_style("Dashed"), "dashed");
        assert_eq!(sanitize_border_style("none"), "none");
        assert_eq!(sanitize_border_style("solid; color: red"), "solid");
    }

    #[test]
    fn card_style_parses_case_insensitively() {
        assert_eq!("postit".parse::<CardStyle>().unwrap(), CardStyle::Postit);
        assert_eq!("Minimal".parse::<CardStyle>().unwrap(), CardStyle::Minimal);
        assert!("fancy".parse::<CardStyle>().is_err());
        assert_eq!(CardStyle::Postit.as_ref(), "postit");
    }
}
