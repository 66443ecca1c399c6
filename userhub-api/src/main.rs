//! # Userhub API Server
//!
//! HTTP service exposing CRUD over a `users` resource plus a multipart
//! upload endpoint, backed by an embedded SQLite file or a MySQL server
//! selected at runtime via `DATABASE_URL`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p userhub-api
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use userhub_api::app::{build_router, AppState};
use userhub_api::config::Config;
use userhub_shared::db::pool::{create_pool, DatabaseConfig, Dialect};
use userhub_shared::db::schema::init_schema;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "userhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Userhub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let dialect = Dialect::from_url(&config.database.url);

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    // Create the users table if this is a fresh store
    init_schema(&pool, dialect).await?;

    tokio::fs::create_dir_all(&config.upload.dir).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, dialect, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received, exiting...");
}
