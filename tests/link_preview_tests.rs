mod common;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use quickcards_server::metadata::{
    FetchError, HttpPageSource, InMemoryCache, MetadataFetcher, PageSource,
};
use url::Url;

#[tokio::test]
async fn link_preview_rejects_non_http_scheme() {
    let app = common::create_test_app();
    let (status, body) =
        common::get_json(app, "/link-preview?url=ftp%3A%2F%2Fexample.com").await;
    assert_eq!(
        status,
        StatusCode::BAD_REQUEST,
        "expected 400, got {status}: {body}"
    );
    assert_eq!(body["error"], "Invalid URL");
}

#[tokio::test]
async fn link_preview_rejects_invalid_url() {
    let app = common::create_test_app();
    let (status, body) = common::get_json(app, "/link-preview?url=not-a-url").await;
    assert_eq!(
        status,
        StatusCode::BAD_REQUEST,
        "expected 400, got {status}: {body}"
    );
}

#[tokio::test]
async fn link_preview_blocks_private_hosts_by_default() {
    let pages = common::spawn_page_server().await;
    let app = common::create_app_with(common::test_config(false));

    let uri = format!("/link-preview?url={}", common::encode(&pages.url("/")));
    let (status, body) = common::get_json(app, &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "got {status}: {body}");
    assert_eq!(body["error"], "Failed to fetch URL");
    assert_eq!(pages.hits(), 0);
}

#[tokio::test]
async fn link_preview_title_only_page() {
    let pages = common::spawn_page_server().await;
    let app = common::create_test_app();

    let uri = format!("/link-preview?url={}", common::encode(&pages.url("/")));
    let (status, body) = common::get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK, "got {status}: {body}");
    assert_eq!(
        body,
        json!({
            "title": "Example",
            "description": "",
            "image": "",
            "favicon": pages.url("/favicon.ico"),
            "domain": "127.0.0.1",
        })
    );
}

#[tokio::test]
async fn link_preview_open_graph_page() {
    let pages = common::spawn_page_server().await;
    let app = common::create_test_app();

    let uri = format!("/link-preview?url={}", common::encode(&pages.url("/og")));
    let (status, body) = common::get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK, "got {status}: {body}");
    assert_eq!(body["title"], "Open & Graph");
    assert_eq!(body["description"], "A page with OpenGraph tags.");
    assert_eq!(body["image"], "https://cdn.example.com/cover.png");
    assert_eq!(body["favicon"], pages.url("/static/icon.png"));
}

#[tokio::test]
async fn link_preview_parses_error_status_bodies() {
    let pages = common::spawn_page_server().await;
    let app = common::create_test_app();

    let uri = format!("/link-preview?url={}", common::encode(&pages.url("/gone")));
    let (status, body) = common::get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK, "got {status}: {body}");
    assert_eq!(body["title"], "Gone");
}

#[tokio::test]
async fn repeated_previews_fetch_once() {
    let pages = common::spawn_page_server().await;
    let app = common::create_test_app();
    let uri = format!("/link-preview?url={}", common::encode(&pages.url("/")));

    for _ in 0..3 {
        let (status, _) = common::get_json(app.clone(), &uri).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(pages.hits(), 1);
}

#[tokio::test]
async fn refetches_after_ttl_expires() {
    let pages = common::spawn_page_server().await;
    let clock = common::ManualClock::new();
    let fetcher = MetadataFetcher::new(
        Arc::new(HttpPageSource::new(true).unwrap()),
        Arc::new(InMemoryCache::with_clock(clock.clone())),
        2,
    );
    let url = pages.url("/");

    fetcher.resolve(&url).await.unwrap();
    clock.advance(Duration::from_secs(3600));
    fetcher.resolve(&url).await.unwrap();
    assert_eq!(pages.hits(), 1, "second resolve within TTL must hit the cache");

    clock.advance(Duration::from_secs(3600));
    let meta = fetcher.resolve(&url).await.unwrap();
    assert_eq!(meta.title, "Example");
    assert_eq!(pages.hits(), 2, "resolve after TTL must fetch again");
}

#[tokio::test]
async fn connection_refused_is_a_failure() {
    // Bind then drop to get a port nobody is listening on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let app = common::create_test_app();
    let target = format!("http://127.0.0.1:{port}/");
    let uri = format!("/link-preview?url={}", common::encode(&target));
    let (status, body) = common::get_json(app, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "got {status}: {body}");
}

/// Blocks only 127.0.0.2 so the page server itself stays reachable.
fn blocks_second_loopback(ip: IpAddr) -> bool {
    ip == IpAddr::from([127, 0, 0, 2])
}

#[tokio::test]
async fn redirect_to_blocked_address_is_refused() {
    let pages = common::spawn_page_server().await;
    let source = HttpPageSource::with_address_filter(Some(blocks_second_loopback)).unwrap();

    let target = pages.url("/").replace("127.0.0.1", "127.0.0.2");
    let url = Url::parse(&pages.url(&format!("/redirect?to={}", common::encode(&target)))).unwrap();
    let err = source.fetch(&url).await.unwrap_err();

    assert!(
        matches!(err, FetchError::PrivateHost(ref host) if host == "127.0.0.2"),
        "got {err:?}"
    );
    assert_eq!(pages.hits(), 1, "only the redirecting hop may be served");
}

#[tokio::test]
async fn redirect_to_allowed_address_is_followed() {
    let pages = common::spawn_page_server().await;
    let source = HttpPageSource::with_address_filter(Some(blocks_second_loopback)).unwrap();

    let url = Url::parse(&pages.url(&format!("/redirect?to={}", common::encode(&pages.url("/")))))
        .unwrap();
    let body = source.fetch(&url).await.unwrap();

    assert!(body.contains("<title>Example</title>"), "{body}");
    assert_eq!(pages.hits(), 2);
}
