/// Greeting probe
///
/// # Endpoint
///
/// ```text
/// GET /hello
/// ```
///
/// # Response
///
/// ```json
/// {"message": "Hello from API!"}
/// ```
use axum::Json;
use serde::{Deserialize, Serialize};

/// Greeting response
#[derive(Debug, Serialize, Deserialize)]
pub struct GreetingResponse {
    /// Static greeting text
    pub message: String,
}

/// Returns a static greeting, useful as a liveness probe and a first
/// `curl` target.
pub async fn hello() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        message: "Hello from API!".to_string(),
    })
}
