//! Card markup. Every failure path renders an HTML comment so that one bad
//! card never breaks the page around it.

pub mod escape;
pub mod style;

use futures::stream::{self, StreamExt};

use crate::config::CardDefaults;
use crate::metadata::{parse_http_url, MetadataFetcher};
use crate::models::{CardAttributes, CardStyle, UrlMetadata};
use escape::{escape_html, escape_url, paragraphs, strip_tags};
pub use style::{postit_color, postit_fold_style, CardStyleConfig};

pub const NO_URL: &str = "<!-- QuickCards: No URL provided -->";
pub const FETCH_FAILED: &str = "<!-- QuickCards: Could not fetch URL metadata -->";
pub const NO_QUOTE: &str = "<!-- QuickCards: No quote content provided -->";
pub const NO_URLS: &str = "<!-- QuickCards: No URLs provided -->";
pub const NO_VALID_URLS: &str = "<!-- QuickCards: No valid URLs found -->";

/// Outbound fetches in flight at once for one link list.
pub const LIST_FETCH_CONCURRENCY: usize = 8;

/// Attribution for a quote card.
#[derive(Debug, Clone, Default)]
pub struct QuoteAttribution<'a> {
    pub author: Option<&'a str>,
    pub source: Option<&'a str>,
    pub url: Option<&'a str>,
}

#[derive(Clone)]
pub struct CardRenderer {
    fetcher: MetadataFetcher,
    defaults: CardDefaults,
}

impl CardRenderer {
    pub fn new(fetcher: MetadataFetcher, defaults: CardDefaults) -> Self {
        Self { fetcher, defaults }
    }

    pub fn fetcher(&self) -> &MetadataFetcher {
        &self.fetcher
    }

    pub fn style_config(&self, attrs: &CardAttributes) -> CardStyleConfig {
        CardStyleConfig::resolve(attrs, &self.defaults)
    }

    // ── Link card ──────────────────────────────────────────────────────────

    pub async fn render_link_card(&self, url: Option<&str>, attrs: &CardAttributes) -> String {
        let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
            return NO_URL.to_string();
        };

        let meta = match self.fetcher.resolve(url).await {
            Ok(meta) => meta,
            Err(_) => return FETCH_FAILED.to_string(),
        };

        let config = self.style_config(attrs);
        link_card_markup(url, &meta, &config)
    }

    // ── Quote card ─────────────────────────────────────────────────────────

    pub fn render_quote_card(
        &self,
        content: &str,
        attribution: &QuoteAttribution<'_>,
        attrs: &CardAttributes,
    ) -> String {
        if content.trim().is_empty() {
            return NO_QUOTE.to_string();
        }

        let config = self.style_config(attrs);
        let mut out = open_card(&config, " qc-quote");

        out.push_str("<div class=\"qc-content\">");
        out.push_str("<div class=\"qc-quote-icon\">&quot;</div>");
        out.push_str(&format!("<div class=\"qc-quote-text\">{}</div>", paragraphs(content)));

        let author = attribution.author.map(str::trim).filter(|s| !s.is_empty());
        let source = attribution.source.map(str::trim).filter(|s| !s.is_empty());

        if author.is_some() || source.is_some() {
            out.push_str("<div class=\"qc-attribution\">");

            let initial = author
                .and_then(|a| a.chars().next())
                .map(|c| c.to_uppercase().collect::<String>())
                .unwrap_or_else(|| "?".to_string());
            out.push_str(&format!("<div class=\"qc-avatar\">{}</div>", escape_html(&initial)));

            out.push_str("<div class=\"qc-meta\">");
            if let Some(author) = author {
                out.push_str(&format!("<div class=\"qc-author\">{}</div>", escape_html(author)));
            }
            if let Some(source) = source {
                let href = attribution.url.map(escape_url).unwrap_or_default();
                if href.is_empty() {
                    out.push_str(&format!("<div class=\"qc-source\">{}</div>", escape_html(source)));
                } else {
                    out.push_str(&format!(
                        "<a href=\"{href}\" class=\"qc-source\" target=\"{}\" rel=\"noopener noreferrer\">{}</a>",
                        escape_html(&config.target),
                        escape_html(source)
                    ));
                }
            }
            out.push_str("</div>");
            out.push_str("</div>");
        }

        out.push_str("</div>");
        out.push_str("</div>");
        out
    }

    // ── Link list ──────────────────────────────────────────────────────────

    /// Render one list item per valid, resolvable line of `body`.
    ///
    /// Markup is stripped first, so pasted `<p>` or `<br />` wrappers are
    /// harmless. Up to [`LIST_FETCH_CONCURRENCY`] lines resolve at once;
    /// output keeps input order and skips invalid lines and failed fetches
    /// individually.
    pub async fn render_link_list(&self, body: &str, attrs: &CardAttributes) -> String {
        let body = strip_tags(body);
        if body.trim().is_empty() {
            return NO_URLS.to_string();
        }

        let candidates: Vec<&str> = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| {
                let valid = parse_http_url(line).is_ok();
                if !valid {
                    tracing::debug!(line = %line, "Skipping invalid link list entry");
                }
                valid
            })
            .collect();
        if candidates.is_empty() {
            return NO_VALID_URLS.to_string();
        }

        let lookups: Vec<_> = candidates
            .iter()
            .map(|url| self.fetcher.resolve(url))
            .collect();
        let resolved: Vec<_> = stream::iter(lookups)
            .buffered(LIST_FETCH_CONCURRENCY)
            .collect()
            .await;

        let mut config = self.style_config(attrs);
        config.style = CardStyle::Card;

        let mut out = format!(
            "<div class=\"qc-list\" style=\"{}\">",
            escape_html(&config.style_attribute())
        );
        for (url, result) in candidates.iter().zip(resolved) {
            if let Ok(meta) = result {
                out.push_str(&list_item_markup(url, &meta, &config));
            }
        }
        out.push_str("</div>");
        out
    }
}

// ── Markup ─────────────────────────────────────────────────────────────────

fn open_card(config: &CardStyleConfig, extra_class: &str) -> String {
    let mut out = format!(
        "<div class=\"qc-card {}{extra_class}\" style=\"{}\">",
        escape_html(&config.classes()),
        escape_html(&config.style_attribute())
    );
    if config.style == CardStyle::Postit {
        out.push_str(&format!(
            "<div class=\"qc-postit-fold\" style=\"{}\"></div>",
            escape_html(&postit_fold_style(&config.postit_color))
        ));
    }
    out
}

fn link_card_markup(url: &str, meta: &UrlMetadata, config: &CardStyleConfig) -> String {
    let mut out = open_card(config, "");

    out.push_str(&format!(
        "<a href=\"{}\" target=\"{}\" rel=\"{}\" class=\"qc-link\">",
        escape_url(url),
        escape_html(&config.target),
        config.rel()
    ));

    let image = escape_url(&meta.image);
    if !image.is_empty() && config.style != CardStyle::Postit {
        out.push_str(&format!(
            "<div class=\"qc-image\"><img src=\"{image}\" alt=\"{}\" loading=\"lazy\"></div>",
            escape_html(&meta.title)
        ));
    }

    out.push_str("<div class=\"qc-content\">");
    out.push_str(&format!("<div class=\"qc-title\">{}</div>", escape_html(&meta.title)));
    if !meta.description.is_empty() {
        out.push_str(&format!(
            "<div class=\"qc-description\">{}</div>",
            escape_html(&meta.description)
        ));
    }
    out.push_str(&format!("<div class=\"qc-domain\">{}</div>", escape_html(&meta.domain)));
    out.push_str("</div>");

    out.push_str("</a>");
    out.push_str("</div>");
    out
}

fn list_item_markup(url: &str, meta: &UrlMetadata, config: &CardStyleConfig) -> String {
    let mut out = format!(
        "<a href=\"{}\" target=\"{}\" rel=\"{}\" class=\"qc-list-item\">",
        escape_url(url),
        escape_html(&config.target),
        config.rel()
    );

    out.push_str("<div class=\"qc-favicon\">");
    let favicon = escape_url(&meta.favicon);
    if favicon.is_empty() {
        out.push_str("<span class=\"qc-favicon-placeholder\">🔗</span>");
    } else {
        out.push_str(&format!("<img src=\"{favicon}\" alt=\"\" loading=\"lazy\">"));
    }
    out.push_str("</div>");

    out.push_str("<div class=\"qc-list-content\">");
    out.push_str(&format!(
        "<div class=\"qc-list-title\">{}</div>",
        escape_html(&meta.title)
    ));
    out.push_str(&format!(
        "<div class=\"qc-list-domain\">{}</div>",
        escape_html(&meta.domain)
    ));
    out.push_str("</div>");

    out.push_str("</a>");
    out
}

// ── Unit tests ─────────────────────────────────────────────────────────────
