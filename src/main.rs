use std::time::Duration;

use axum::{routing::get, Router};
use axum_prometheus::PrometheusMetricLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use quickcards_server::config::Config;
use quickcards_server::metadata::spawn_sweeper;
use quickcards_server::{api_router, build_state, ApiDoc};

const SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() {
    // Initialize tracing — JSON in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("quickcards_server=info,tower_http=info"));

    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("🃏 QuickCards server starting...");

    let config = Config::from_env();
    info!(
        cache_hours = config.card_defaults.cache_duration_hours,
        allow_private_hosts = config.allow_private_hosts,
        "📝 Configuration loaded"
    );

    let state = build_state(&config).expect("Failed to build HTTP client");

    // Expiry is enforced on read; the sweeper only reclaims memory.
    spawn_sweeper(state.cache.clone(), SWEEP_INTERVAL);

    let cors = if config.is_dev {
        info!("🔓 CORS: permissive (dev mode)");
        CorsLayer::permissive()
    } else {
        tracing::warn!("🔒 CORS: restrictive (production mode)");
        CorsLayer::new()
    };

    // Prometheus metrics layer
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = Router::new()
        .merge(api_router(state))
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.server_addr();
    info!("🎧 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
