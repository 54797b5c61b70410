use std::env;

use validator::Validate;

use crate::color;
use crate::metadata::fetch::{DEFAULT_CACHE_HOURS, MAX_CACHE_HOURS, MIN_CACHE_HOURS};
use crate::models::card::{parse_flag, parse_px, sanitize_border_style};

/// Operator-level card defaults, applied wherever a card omits an attribute.
#[derive(Clone, Debug, PartialEq, Eq, Validate)]
pub struct CardDefaults {
    pub border_color: String,
    #[validate(range(max = 10))]
    pub border_width: u32,
    pub border_style: String,
    #[validate(range(max = 50))]
    pub border_radius: u32,
    pub shadow: bool,
    #[validate(range(min = 1, max = 168))]
    pub cache_duration_hours: u32,
}

impl Default for CardDefaults {
    fn default() -> Self {
        CardDefaults {
            border_color: color::FALLBACK_COLOR.to_string(),
            border_width: 1,
            border_style: "solid".to_string(),
            border_radius: 8,
            shadow: true,
            cache_duration_hours: DEFAULT_CACHE_HOURS,
        }
    }
}

impl CardDefaults {
    /// Build defaults from raw setting strings using the same rules that
    /// apply to per-card attributes. Missing values keep their default.
    pub fn from_raw(
        border_color: Option<&str>,
        border_width: Option<&str>,
        border_style: Option<&str>,
        border_radius: Option<&str>,
        shadow: Option<&str>,
        cache_duration_hours: Option<&str>,
    ) -> Self {
        let base = CardDefaults::default();
        CardDefaults {
            border_color: border_color.map(color::sanitize).unwrap_or(base.border_color),
            border_width: border_width.map(parse_px).unwrap_or(base.border_width),
            border_style: border_style
                .map(sanitize_border_style)
                .unwrap_or(base.border_style),
            border_radius: border_radius.map(parse_px).unwrap_or(base.border_radius),
            shadow: shadow.map(parse_flag).unwrap_or(base.shadow),
            cache_duration_hours: cache_duration_hours
                .map(parse_px)
                .unwrap_or(base.cache_duration_hours)
                .clamp(MIN_CACHE_HOURS, MAX_CACHE_HOURS),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub is_dev: bool,
    /// Permit fetching pages on loopback/private networks.
    pub allow_private_hosts: bool,
    pub card_defaults: CardDefaults,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let var = |name: &str| env::var(name).ok();

        let card_defaults = CardDefaults::from_raw(
            var("QUICKCARDS_BORDER_COLOR").as_deref(),
            var("QUICKCARDS_BORDER_WIDTH").as_deref(),
            var("QUICKCARDS_BORDER_STYLE").as_deref(),
            var("QUICKCARDS_BORDER_RADIUS").as_deref(),
            var("QUICKCARDS_SHADOW").as_deref(),
            var("QUICKCARDS_CACHE_HOURS").as_deref(),
        );

        if let Err(e) = card_defaults.validate() {
            tracing::warn!(error = %e, "Card defaults outside recommended ranges");
        }

        Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            is_dev: env::var("APP_ENV").as_deref() != Ok("production"),
            allow_private_hosts: var("QUICKCARDS_ALLOW_PRIVATE_HOSTS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            card_defaults,
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
