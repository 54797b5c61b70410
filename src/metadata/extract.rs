use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::models::UrlMetadata;

/// Upper bound on description length in UTF-8 bytes.
pub const DESCRIPTION_MAX_LEN: usize = 160;
const ELLIPSIS: &str = "...";

// ── Patterns ───────────────────────────────────────────────────────────────
//
// Ordered pattern scans over the raw document. Each OpenGraph property is
// tried with `property` before `content` and then the reverse.

fn og_patterns(property: &str) -> [Regex; 2] {
    let property = regex::escape(property);
    [
        Regex::new(&format!(
            r#"(?i)<meta[^>]+property=["']{property}["'][^>]+content=["']([^"']+)["']"#
        ))
        .expect("valid og regex"),
        Regex::new(&format!(
            r#"(?i)<meta[^>]+content=["']([^"']+)["'][^>]+property=["']{property}["']"#
        ))
        .expect("valid og regex"),
    ]
}

static OG_TITLE: Lazy<[Regex; 2]> = Lazy::new(|| og_patterns("og:title"));
static OG_DESCRIPTION: Lazy<[Regex; 2]> = Lazy::new(|| og_patterns("og:description"));
static OG_IMAGE: Lazy<[Regex; 2]> = Lazy::new(|| og_patterns("og:image"));

static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("valid title regex"));

static META_DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+name=["']description["'][^>]+content=["']([^"']+)["']"#)
        .expect("valid description regex")
});

static ICON_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<link[^>]+rel=["'](?:shortcut )?icon["'][^>]+href=["']([^"']+)["']"#)
        .expect("valid icon regex")
});

static HAS_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid scheme regex"));

// ── Extraction ─────────────────────────────────────────────────────────────

/// Extract card metadata from `html` fetched from `source_url`.
///
/// Never fails. With nothing usable in the document the title is the host
/// of `source_url` and the favicon points at `/favicon.ico` on that host.
pub fn extract(html: &str, source_url: &str) -> UrlMetadata {
    let parsed = Url::parse(source_url).ok();
    let domain = parsed
        .as_ref()
        .and_then(|u| u.host_str())
        .unwrap_or_default()
        .to_string();

    let title = first_match(html, OG_TITLE.iter().chain([&*TITLE_TAG])).unwrap_or_default();

    let description =
        first_match(html, OG_DESCRIPTION.iter().chain([&*META_DESCRIPTION])).unwrap_or_default();

    let base = parsed.as_ref().map(base_url).unwrap_or_default();

    let image = first_match(html, OG_IMAGE.iter())
        .map(|href| resolve_href(&href, &base))
        .filter(|src| HAS_SCHEME.is_match(src))
        .unwrap_or_default();

    let favicon = match first_match(html, [&*ICON_LINK]) {
        Some(href) => resolve_href(&href, &base),
        None => format!("{base}/favicon.ico"),
    };

    UrlMetadata {
        title: if title.is_empty() { domain.clone() } else { title },
        description: truncate_description(&description),
        image,
        favicon,
        domain,
    }
}

/// Run `patterns` in order; the first capture that is non-empty after
/// entity decoding and trimming wins.
fn first_match<'a>(html: &str, patterns: impl IntoIterator<Item = &'a Regex>) -> Option<String> {
    patterns.into_iter().find_map(|re| {
        re.captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| decode_entities(m.as_str()).trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// `{scheme}://{host}`, keeping an explicit non-default port.
fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

/// Make `href` absolute against `base`. Protocol-relative links get `https:`.
fn resolve_href(href: &str, base: &str) -> String {
    if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else if href.starts_with('/') {
        format!("{base}{href}")
    } else if HAS_SCHEME.is_match(href) {
        href.to_string()
    } else {
        format!("{base}/{href}")
    }
}

/// Cut to at most [`DESCRIPTION_MAX_LEN`] bytes including the ellipsis,
/// backing off to a char boundary so no character is split.
fn truncate_description(description: &str) -> String {
    if description.len() <= DESCRIPTION_MAX_LEN {
        return description.to_string();
    }
    let mut end = DESCRIPTION_MAX_LEN - ELLIPSIS.len();
    while !description.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{ELLIPSIS}", &description[..end])
}

// ── Entities ───────────────────────────────────────────────────────────────

/// Decode numeric (`&#39;`, `&#x27;`) and named HTML entities.
///
/// Named references cover the HTML 4 set: Latin-1, typographic
/// punctuation, arrows, common math symbols, card suits and Greek letters.
/// Unknown or malformed references are left as written.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail
            .char_indices()
            .skip(1)
            .take(32)
            .find(|&(_, c)| c == ';')
            .and_then(|(semi, _)| decode_reference(&tail[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    let c = match name {
        "quot" => '"',
        "amp" => '&',
        "apos" => '\'',
        "lt" => '<',
        "gt" => '>',
        "nbsp" => '\u{a0}',
        "iexcl" => '¡',
        "cent" => '¢',
        "pound" => '£',
        "curren" => '¤',
        "yen" => '¥',
        "brvbar" => '¦',
        "sect" => '§',
        "uml" => '¨',
        "copy" => '©',
        "ordf" => 'ª',
        "laquo" => '«',
        "not" => '¬',
        "shy" => '\u{ad}',
        "reg" => '®',
        "macr" => '¯',
        "deg" => '°',
        "plusmn" => '±',
        "sup2" => '²',
        "sup3" => '³',
        "acute" => '´',
        "micro" => 'µ',
        "para" => '¶',
        "middot" => '·',
        "cedil" => '¸',
        "sup1" => '¹',
        "ordm" => 'º',
        "raquo" => '»',
        "frac14" => '¼',
        "frac12" => '½',
        "frac34" => '¾',
        "iquest" => '¿',
        "Agrave" => 'À',
        "Aacute" => 'Á',
        "Acirc" => 'Â',
        "Atilde" => 'Ã',
        "Auml" => 'Ä',
        "Aring" => 'Å',
        "AElig" => 'Æ',
        "Ccedil" => 'Ç',
        "Egrave" => 'È',
        "Eacute" => 'É',
        "Ecirc" => 'Ê',
        "Euml" => 'Ë',
        "Igrave" => 'Ì',
        "Iacute" => 'Í',
        "Icirc" => 'Î',
        "Iuml" => 'Ï',
        "ETH" => 'Ð',
        "Ntilde" => 'Ñ',
        "Ograve" => 'Ò',
        "Oacute" => 'Ó',
        "Ocirc" => 'Ô',
        "Otilde" => 'Õ',
        "Ouml" => 'Ö',
        "times" => '×',
        "Oslash" => 'Ø',
        "Ugrave" => 'Ù',
        "Uacute" => 'Ú',
        "Ucirc" => 'Û',
        "Uuml" => 'Ü',
        "Yacute" => 'Ý',
        "THORN" => 'Þ',
        "szlig" => 'ß',
        "agrave" => 'à',
        "aacute" => 'á',
        "acirc" => 'â',
        "atilde" => 'ã',
        "auml" => 'ä',
        "aring" => 'å',
        "aelig" => 'æ',
        "ccedil" => 'ç',
        "egrave" => 'è',
        "eacute" => 'é',
        "ecirc" => 'ê',
        "euml" => 'ë',
        "igrave" => 'ì',
        "iacute" => 'í',
        "icirc" => 'î',
        "iuml" => 'ï',
        "eth" => 'ð',
        "ntilde" => 'ñ',
        "ograve" => 'ò',
        "oacute" => 'ó',
        "ocirc" => 'ô',
        "otilde" => 'õ',
        "ouml" => 'ö',
        "divide" => '÷',
        "oslash" => 'ø',
        "ugrave" => 'ù',
        "uacute" => 'ú',
        "ucirc" => 'û',
        "uuml" => 'ü',
        "yacute" => 'ý',
        "thorn" => 'þ',
        "yuml" => 'ÿ',
        "OElig" => 'Œ',
        "oelig" => 'œ',
        "Scaron" => 'Š',
        "scaron" => 'š',
        "Yuml" => 'Ÿ',
        "fnof" => 'ƒ',
        "circ" => 'ˆ',
        "tilde" => '˜',
        "ensp" => '\u{2002}',
        "emsp" => '\u{2003}',
        "thinsp" => '\u{2009}',
        "zwnj" => '\u{200c}',
        "zwj" => '\u{200d}',
        "lrm" => '\u{200e}',
        "rlm" => '\u{200f}',
        "ndash" => '–',
        "mdash" => '—',
        "lsquo" => '‘',
        "rsquo" => '’',
        "sbquo" => '‚',
        "ldquo" => '“',
        "rdquo" => '”',
        "bdquo" => '„',
        "dagger" => '†',
        "Dagger" => '‡',
        "bull" => '•',
        "hellip" => '…',
        "permil" => '‰',
        "prime" => '′',
        "Prime" => '″',
        "lsaquo" => '‹',
        "rsaquo" => '›',
        "oline" => '‾',
        "frasl" => '⁄',
        "euro" => '€',
        "trade" => '™',
        "larr" => '←',
        "uarr" => '↑',
        "rarr" => '→',
        "darr" => '↓',
        "harr" => '↔',
        "minus" => '−',
        "infin" => '∞',
        "ne" => '≠',
        "le" => '≤',
        "ge" => '≥',
        "asymp" => '≈',
        "sum" => '∑',
        "radic" => '√',
        "hearts" => '♥',
        "spades" => '♠',
        "clubs" => '♣',
        "diams" => '♦',
        "loz" => '◊',
        "Alpha" => 'Α',
        "Beta" => 'Β',
        "Gamma" => 'Γ',
        "Delta" => 'Δ',
        "Epsilon" => 'Ε',
        "Zeta" => 'Ζ',
        "Eta" => 'Η',
        "Theta" => 'Θ',
        "Iota" => 'Ι',
        "Kappa" => 'Κ',
        "Lambda" => 'Λ',
        "Mu" => 'Μ',
        "Nu" => 'Ν',
        "Xi" => 'Ξ',
        "Omicron" => 'Ο',
        "Pi" => 'Π',
        "Rho" => 'Ρ',
        "Sigma" => 'Σ',
        "Tau" => 'Τ',
        "Upsilon" => 'Υ',
        "Phi" => 'Φ',
        "Chi" => 'Χ',
        "Psi" => 'Ψ',
        "Omega" => 'Ω',
        "alpha" => 'α',
        "beta" => 'β',
        "gamma" => 'γ',
        "delta" => 'δ',
        "epsilon" => 'ε',
        "zeta" => 'ζ',
        "eta" => 'η',
        "theta" => 'θ',
        "iota" => 'ι',
        "kappa" => 'κ',
        "lambda" => 'λ',
        "mu" => 'μ',
        "nu" => 'ν',
        "xi" => 'ξ',
        "omicron" => 'ο',
        "pi" => 'π',
        "rho" => 'ρ',
        "sigmaf" => 'ς',
        "sigma" => 'σ',
        "tau" => 'τ',
        "upsilon" => 'υ',
        "phi" => 'φ',
        "chi" => 'χ',
        "psi" => 'ψ',
        "omega" => 'ω',
        _ => return None,
    };
    Some(c)
}

// ── Unit tests ─────────────────────────────────────────────────────────────
