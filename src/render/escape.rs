use once_cell::sync::Lazy;
use regex::Regex;

use crate::metadata::parse_http_url;

/// Escape text for use in element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a URL for an `href`/`src` attribute. Anything that is not an
/// absolute http(s) URL becomes empty.
pub fn escape_url(url: &str) -> String {
    match parse_http_url(url) {
        Ok(_) => escape_html(url.trim()),
        Err(_) => String::new(),
    }
}

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Drop anything that looks like an HTML tag, keeping the text between.
pub fn strip_tags(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}

/// Turn plain text into paragraphs: blank lines split paragraphs, single
/// newlines become `<br />`.
pub fn paragraphs(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::new();
    let mut current: Vec<&str> = Vec::new();

    for line in normalized.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut current, &mut out);
        } else {
            current.push(line);
        }
    }
    flush(&mut current, &mut out);

    out
}

fn flush(lines: &mut Vec<&str>, out: &mut String) {
    if lines.is_empty() {
        return;
    }
    let escaped: Vec<String> = lines.iter().map(|l| escape_html(l)).collect();
    out.push_str("<p>");
    out.push_str(&escaped.join("<br />\n"));
    out.push_str("</p>\n");
    lines.clear();
}
