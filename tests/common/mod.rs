// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Method, Request, StatusCode},
    response::Html,
    routing::get,
    Router,
};
use chrono::{DateTime, TimeDelta, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use quickcards_server::config::{CardDefaults, Config};
use quickcards_server::metadata::Clock;
use quickcards_server::{api_router, build_state};

pub const EXAMPLE_PAGE: &str = "<html><head><title>Example</title></head></html>";

pub const OG_PAGE: &str = r#"<!doctype html>
<html><head>
  <title>Fallback title</title>
  <meta content="Open &amp; Graph" property="og:title">
  <meta property="og:description" content="A page with OpenGraph tags.">
  <meta property="og:image" content="https://cdn.example.com/cover.png">
  <link rel="shortcut icon" href="/static/icon.png">
</head><body></body></html>"#;

// ── Local page server ────────────────────────────────────────────────────────

/// A throwaway HTTP server on an ephemeral loopback port that counts every
/// request it serves.
pub struct PageServer {
    pub base: String,
    pub hits: Arc<AtomicUsize>,
}

impl PageServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn example(State(hits): State<Arc<AtomicUsize>>) -> Html<&'static str> {
    hits.fetch_add(1, Ordering::SeqCst);
    Html(EXAMPLE_PAGE)
}

async fn og(State(hits): State<Arc<AtomicUsize>>) -> Html<&'static str> {
    hits.fetch_add(1, Ordering::SeqCst);
    Html(OG_PAGE)
}

async fn gone(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, Html<&'static str>) {
    hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::NOT_FOUND,
        Html("<html><head><title>Gone</title></head></html>"),
    )
}

/// `302` to the URL in `?to=`.
async fn redirect(
    State(hits): State<Arc<AtomicUsize>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, [(header::HeaderName, String); 1]) {
    hits.fetch_add(1, Ordering::SeqCst);
    let to = params.get("to").cloned().unwrap_or_default();
    (StatusCode::FOUND, [(header::LOCATION, to)])
}

pub async fn spawn_page_server() -> PageServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/", get(example))
        .route("/og", get(og))
        .route("/gone", get(gone))
        .route("/redirect", get(redirect))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind page server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    PageServer {
        base: format!("http://{addr}"),
        hits,
    }
}

// ── Test clock ───────────────────────────────────────────────────────────────

pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(Utc::now())))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += TimeDelta::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

// ── App construction ─────────────────────────────────────────────────────────

pub fn test_config(allow_private_hosts: bool) -> Config {
    Config {
        server_host: "127.0.0.1".into(),
        server_port: 0,
        is_dev: true,
        allow_private_hosts,
        card_defaults: CardDefaults::default(),
    }
}

/// Full API router. Loopback fetches are allowed so tests can point cards at
/// a [`PageServer`].
pub fn create_test_app() -> Router {
    create_app_with(test_config(true))
}

pub fn create_app_with(config: Config) -> Router {
    let state = build_state(&config).expect("Failed to build test state");
    api_router(state)
}

// ── Request helpers ──────────────────────────────────────────────────────────

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (status, text) = send(app, req).await;
    (status, serde_json::from_str(&text).unwrap_or(Value::Null))
}

pub async fn get_html(app: Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, String) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

/// Percent-encode a URL for use as a query value.
pub fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
