// src/main.rs

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use chrono::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod service;
mod store;

use auth::TokenIssuer;
use config::Config;
use service::Service;
use store::{MemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
    pub tokens: TokenIssuer,
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION]);

    // credentials cannot be combined with a wildcard origin
    if origins.iter().any(|o| o == "*") {
        return Ok(cors.allow_origin(Any));
    }
    let origins = origins
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cors.allow_origin(AllowOrigin::list(origins)).allow_credentials(true))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("csr_match_api=info,tower_http=info")),
        )
        .init();

    let cfg = Config::from_env()?;

    let store: Arc<dyn Store> = match &cfg.database_url {
        Some(url) => {
            let pool = db::connect(url, cfg.db_max_connections).await?;
            db::migrate(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; starting with the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let tokens = TokenIssuer::new(cfg.jwt_secret.as_bytes(), Duration::hours(cfg.token_ttl_hours));
    let state = AppState { service: Arc::new(Service::new(store, tokens.clone())), tokens };

    let app = routes::router(state)
        .layer(cors_layer(&cfg.allow_origins)?)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&cfg.server_address).await?;
    tracing::info!(address = %cfg.server_address, "API listening");

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
