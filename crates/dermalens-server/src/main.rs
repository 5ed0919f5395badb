//! HTTP server entry point and Axum router setup.
//!
//! Initializes configuration, the database, and the analysis team, then
//! starts the Axum server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response};
use dermalens_agents::DermatologyTeam;
use dermalens_core::SkinAnalyzer;
use dermalens_server::config::ServerConfig;
use dermalens_server::{build_router, db, ServerState};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env();

    let conn = db::init_db(&config.database_path)?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let tavily_key = std::env::var("TAVILY_API_KEY").ok();
    let analyzer: Arc<dyn SkinAnalyzer> = Arc::new(DermatologyTeam::new(&config.model, tavily_key));
    info!("Analysis model: {}", config.model);

    let upload_dir = config.upload_dir.clone();
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(ServerState::new(config, conn, analyzer));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let app = build_router(state)
        .nest_service("/uploads/skin-images", ServeDir::new(upload_dir))
        .layer(trace_layer)
        .layer(cors);

    info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
