use once_cell::sync::Lazy;
use regex::Regex;

/// Returned by [`sanitize`] for anything that is neither a known name nor hex.
pub const FALLBACK_COLOR: &str = "#e0e0e0";

const NAMED_COLORS: &[&str] = &[
    "red", "blue", "green", "yellow", "orange", "purple", "pink", "gray", "grey", "black", "white",
];

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?([a-fA-F0-9]{6}|[a-fA-F0-9]{3})$").expect("valid hex regex"));

/// Normalise a user-supplied color.
///
/// Named colors are matched case-insensitively and returned lowercased. Hex
/// colors keep their digits and always gain a leading `#`.
pub fn sanitize(input: &str) -> String {
    let lowered = input.to_lowercase();
    if NAMED_COLORS.contains(&lowered.as_str()) {
        return lowered;
    }

    if HEX_COLOR.is_match(input) {
        return format!("#{}", input.trim_start_matches('#'));
    }

    FALLBACK_COLOR.to_string()
}

/// Darken a hex color by `percent`, clamping every channel to `0..=255`.
///
/// Input that is not a 3- or 6-digit hex color is returned unchanged.
pub fn darken(hex: &str, percent: f64) -> String {
    let Some([r, g, b]) = parse_hex(hex) else {
        return hex.to_string();
    };

    let scale = |channel: u8| -> u8 {
        let c = f64::from(channel);
        (c - c * percent / 100.0).clamp(0.0, 255.0) as u8
    };

    format!("#{:02x}{:02x}{:02x}", scale(r), scale(g), scale(b))
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    if !HEX_COLOR.is_match(hex) {
        return None;
    }

    let digits = hex.trim_start_matches('#');
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
