use crate::color;
use crate::config::CardDefaults;
use crate::models::card::{parse_flag, parse_px, sanitize_border_style};
use crate::models::{CardAttributes, CardStyle};

const DEFAULT_POSTIT_COLOR: &str = "yellow";
const DEFAULT_TARGET: &str = "_blank";
const POSTIT_FOLD_DARKEN_PERCENT: f64 = 15.0;

const POSTIT_COLORS: &[(&str, &str)] = &[
    ("yellow", "#fff9c4"),
    ("pink", "#f8bbd9"),
    ("blue", "#bbdefb"),
    ("green", "#c8e6c9"),
    ("orange", "#ffe0b2"),
    ("purple", "#e1bee7"),
];

/// Fully validated card styling: per-card attributes layered over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardStyleConfig {
    pub border_color: String,
    pub border_width: u32,
    pub border_style: String,
    pub border_radius: u32,
    /// Left accent width; `None` means a uniform border.
    pub border_left: Option<u32>,
    pub shadow: bool,
    pub style: CardStyle,
    pub postit_color: String,
    pub target: String,
    pub nofollow: bool,
}

impl CardStyleConfig {
    pub fn resolve(attrs: &CardAttributes, defaults: &CardDefaults) -> Self {
        CardStyleConfig {
            border_color: non_empty(&attrs.border_color)
                .map(color::sanitize)
                .unwrap_or_else(|| defaults.border_color.clone()),
            border_width: non_empty(&attrs.border_width)
                .map(parse_px)
                .unwrap_or(defaults.border_width),
            border_style: non_empty(&attrs.border_style)
                .map(sanitize_border_style)
                .unwrap_or_else(|| defaults.border_style.clone()),
            border_radius: non_empty(&attrs.border_radius)
                .map(parse_px)
                .unwrap_or(defaults.border_radius),
            border_left: non_empty(&attrs.border_left)
                .map(parse_px)
                .filter(|w| *w > 0),
            shadow: non_empty(&attrs.shadow)
                .map(parse_flag)
                .unwrap_or(defaults.shadow),
            style: non_empty(&attrs.style)
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            postit_color: non_empty(&attrs.postit_color)
                .unwrap_or(DEFAULT_POSTIT_COLOR)
                .to_lowercase(),
            target: non_empty(&attrs.target)
                .unwrap_or(DEFAULT_TARGET)
                .to_string(),
            nofollow: non_empty(&attrs.nofollow).map_or(true, parse_flag),
        }
    }

    /// Inline `style` attribute value.
    pub fn style_attribute(&self) -> String {
        let mut styles = Vec::new();

        match self.border_left {
            Some(width) => {
                styles.push(format!("border-left: {width}px solid {}", self.border_color));
                styles.push("border-top: none".to_string());
                styles.push("border-right: none".to_string());
                styles.push("border-bottom: none".to_string());
            }
            None => styles.push(format!(
                "border: {}px {} {}",
                self.border_width, self.border_style, self.border_color
            )),
        }

        styles.push(format!("border-radius: {}px", self.border_radius));

        if !self.shadow {
            styles.push("box-shadow: none".to_string());
        }

        if self.style == CardStyle::Postit {
            styles.push(format!("background-color: {}", postit_color(&self.postit_color)));
        }

        styles.join("; ")
    }

    pub fn classes(&self) -> String {
        let mut classes = vec![format!("qc-style-{}", self.style.as_ref())];
        if self.shadow {
            classes.push("qc-shadow".to_string());
        }
        classes.join(" ")
    }

    pub fn rel(&self) -> &'static str {
        if self.nofollow {
            "noopener noreferrer nofollow"
        } else {
            "noopener noreferrer"
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Background for a post-it: a named swatch, otherwise a sanitized color.
pub fn postit_color(name: &str) -> String {
    POSTIT_COLORS
        .iter()
        .find(|(swatch, _)| *swatch == name)
        .map(|(_, hex)| hex.to_string())
        .unwrap_or_else(|| color::sanitize(name))
}

/// Style for the folded corner, a slightly darker shade of the note.
pub fn postit_fold_style(name: &str) -> String {
    format!(
        "border-bottom-color: {}",
        color::darken(&postit_color(name), POSTIT_FOLD_DARKEN_PERCENT)
    )
}
