/// Users resource endpoints
///
/// # Endpoints
///
/// - `POST   /users` - create a user
/// - `GET    /users` - list all users, newest first
/// - `GET    /users/:id` - fetch one user
/// - `PATCH  /users/:id` / `PUT /users/:id` - partial update
/// - `DELETE /users/:id` - delete
///
/// Write failures from the store (uniqueness violations included) are
/// reported as 409 Conflict with the error detail behind a fixed prefix;
/// the same detail is logged internally. A missing or malformed JSON body
/// is treated as an empty object, which then fails field validation.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use userhub_shared::db::is_unique_violation;
use userhub_shared::models::user::{CreateUser, Feature, UpdateUser, User};

/// Create request
///
/// Both names are optional here so the handler can answer with the fixed
/// 400 message instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    /// Username (required, unique)
    pub username: Option<String>,

    /// Email address (required, unique)
    pub email: Option<String>,

    /// Optional loosely-typed payload
    pub feature: Option<Feature>,
}

/// Plain acknowledgement body used by the write endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

/// Creates a user
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "feature": {"role": "admin"}
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: username or email missing (or empty)
/// - `409 Conflict`: the store rejected the insert (duplicate username or
///   email)
pub async fn create_user(
    State(state): State<AppState>,
    body: Option<Json<CreateUserRequest>>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let username = body.username.filter(|u| !u.is_empty());
    let email = body.email.filter(|e| !e.is_empty());
    let (Some(username), Some(email)) = (username, email) else {
        return Err(ApiError::BadRequest(
            "username and email are required".to_string(),
        ));
    };

    let data = CreateUser {
        username,
        email,
        feature: body.feature,
    };

    if let Err(err) = User::create(&state.db, state.dialect, data).await {
        if is_unique_violation(&err) {
            warn!(error = %err, "user insert rejected by uniqueness constraint");
        } else {
            error!(error = %err, "user insert failed");
        }
        return Err(ApiError::Conflict(format!("insert failed: {err}")));
    }

    Ok((StatusCode::CREATED, message("created")))
}

/// Lists all users as a JSON array, ordered by descending id.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = User::list(&state.db, state.dialect).await?;
    Ok(Json(users))
}

/// Fetches a single user or answers 404.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, state.dialect, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(user))
}

/// Partially updates a user
///
/// Only the recognized fields (username, email, feature) are applied; an
/// explicit `"feature": null` clears the column. `updated_at` is always
/// refreshed.
///
/// # Errors
///
/// - `400 Bad Request`: no recognized field in the body
/// - `409 Conflict`: the store rejected the update
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Option<Json<UpdateUser>>,
) -> ApiResult<Json<MessageResponse>> {
    let fields = body.map(|Json(b)| b).unwrap_or_default();

    if fields.is_empty() {
        return Err(ApiError::BadRequest("no fields to update".to_string()));
    }

    if let Err(err) = User::update(&state.db, state.dialect, id, fields).await {
        if is_unique_violation(&err) {
            warn!(error = %err, "user update rejected by uniqueness constraint");
        } else {
            error!(error = %err, "user update failed");
        }
        return Err(ApiError::Conflict(format!("update failed: {err}")));
    }

    Ok(message("updated"))
}

/// Deletes a user by id.
///
/// A missing id deletes nothing and still reports success.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    User::delete(&state.db, id).await?;

    Ok(message("deleted"))
}
