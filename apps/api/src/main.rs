mod auth;
mod config;
mod db;
mod errors;
mod identity;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::service::AuthService;
use crate::config::Config;
use crate::db::create_pool;
use crate::identity::GoTrueClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::{PgEnrollmentStore, PgProfileStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillForge API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL backs profiles and enrollments
    let db = create_pool(&config.database_url, config.db_max_connections).await?;

    // Identity provider
    let identity = GoTrueClient::new(&config.supabase_url, config.supabase_anon_key.clone())
        .context("Failed to build identity client")?;
    info!("Identity client initialized ({})", config.supabase_url);

    let auth = AuthService::new(
        Arc::new(identity),
        Arc::new(PgProfileStore::new(db.clone())),
        Arc::new(PgEnrollmentStore::new(db)),
        config.hiredeck_path.clone(),
    );

    let state = AppState { auth };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the SkillForge front-end host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
