/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use userhub_api::{app::AppState, config::Config};
/// use userhub_shared::db::pool::{create_pool, DatabaseConfig, Dialect};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let dialect = Dialect::from_url(&config.database.url);
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(pool, dialect, config);
/// let app = userhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::config::Config;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::AnyPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use userhub_shared::db::pool::Dialect;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. The pool
/// is the process' single database handle; everything downstream receives
/// it from here rather than reaching for a global.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: AnyPool,

    /// SQL dialect of the configured store
    pub dialect: Dialect,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: AnyPool, dialect: Dialect, config: Config) -> Self {
        Self {
            db,
            dialect,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /hello            # greeting probe
/// ├── POST /upload           # multipart file intake
/// └── /users
///     ├── POST   /           # create
///     ├── GET    /           # list (newest first)
///     ├── GET    /:id        # fetch one
///     ├── PATCH  /:id        # partial update
///     ├── PUT    /:id        # partial update (same handler)
///     └── DELETE /:id        # delete
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let users_routes = Router::new()
        .route(
            "/",
            post(routes::users::create_user).get(routes::users::list_users),
        )
        .route(
            "/:id",
            get(routes::users::get_user)
                .patch(routes::users::update_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        );

    Router::new()
        .route("/hello", get(routes::health::hello))
        .route("/upload", post(routes::upload::upload))
        .nest("/users", users_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
