use server::clients::stockfish::StockfishClient;
use server::config;
use server::db;
use server::routes;

use axum::{routing::{get, post, put}, Extension, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()
        .map_err(|e| anyhow::anyhow!("DATABASE_URL must be set: {e}"))?;

    tracing::info!("Connecting to database...");
    let pool = db::pool::create_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db::pool::run_migrations(&pool).await?;

    let engine = StockfishClient::new(&config.stockfish_api_url, config.stockfish_timeout_secs)?;
    tracing::info!("Engine analysis via {}", config.stockfish_api_url);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Auth
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/me", get(routes::auth::me))
        // Openings: specific routes before parameterized
        .route("/api/openings/match", get(routes::openings::match_openings))
        .route("/api/openings", get(routes::openings::list_openings))
        .route("/api/openings/{id}", get(routes::openings::get_opening))
        .route("/api/openings/{id}/visit", post(routes::openings::record_visit))
        // Favorites
        .route("/api/favorites", get(routes::favorites::list_favorites))
        .route(
            "/api/favorites/{opening_id}",
            put(routes::favorites::add_favorite).delete(routes::favorites::remove_favorite),
        )
        // Practice
        .route(
            "/api/practice/sessions",
            get(routes::practice::list_sessions).post(routes::practice::start_session),
        )
        .route(
            "/api/practice/sessions/{id}/complete",
            post(routes::practice::complete_session),
        )
        // Dashboard
        .route("/api/dashboard", get(routes::dashboard::get_dashboard))
        // Engine
        .route("/api/analysis", post(routes::analysis::analyze_position))
        // Shared state
        .layer(Extension(pool))
        .layer(Extension(config.clone()))
        .layer(Extension(engine))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
