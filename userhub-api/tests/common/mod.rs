//! Shared test harness
//!
//! Builds the full router against an in-memory SQLite store so the tests
//! exercise the real handler, repository, and store path without any
//! external service.

// Not every test binary uses every helper
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use sqlx::AnyPool;
use tempfile::TempDir;
use tower::Service as _;

use userhub_api::app::{build_router, AppState};
use userhub_api::config::{ApiConfig, Config, DatabaseConfig, UploadConfig};
use userhub_shared::db::pool::{create_pool, Dialect};
use userhub_shared::db::schema::init_schema;

/// Everything a test needs: the router, the pool behind it, and the
/// temporary upload directory.
pub struct TestContext {
    pub app: Router,
    pub db: AnyPool,
    pub upload_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        // A single connection keeps the in-memory database alive for the
        // whole test; a second connection would see a fresh empty store.
        let db_config = userhub_shared::db::pool::DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        };
        let dialect = Dialect::from_url(&db_config.url);

        let pool = create_pool(db_config).await?;
        init_schema(&pool, dialect).await?;

        let upload_dir = tempfile::tempdir()?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            upload: UploadConfig {
                dir: upload_dir.path().to_path_buf(),
            },
        };

        let state = AppState::new(pool.clone(), dialect, config);
        let app = build_router(state);

        Ok(Self {
            app,
            db: pool,
            upload_dir,
        })
    }

    /// Row count of the users table, read straight from the store.
    pub async fn user_count(&self) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await
            .unwrap();
        count
    }

    /// Sends a request with an optional JSON body, returns status and
    /// parsed response body.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).unwrap();
        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    /// Sends a raw request (used for multipart bodies).
    pub async fn request_raw(
        &self,
        request: Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }
}

/// One part of a hand-built multipart body: (field name, optional
/// filename, content).
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content: &'a [u8],
}

/// Builds a multipart/form-data body with the given boundary.
pub fn multipart_body(boundary: &str, parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    part.name
                )
                .as_bytes(),
            ),
        }
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
