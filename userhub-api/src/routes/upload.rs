/// Multipart upload endpoint
///
/// # Endpoint
///
/// ```text
/// POST /upload
/// Content-Type: multipart/form-data
///
/// loginuser=testuser
/// feature={"key":"id","value":"big"}
/// data=@test.txt
/// ```
///
/// The `feature` field is passed through verbatim as text; it is never
/// JSON-parsed at this layer. The file part is optional; when present its
/// bytes are written under the upload directory with a storage name
/// prefixed by a microsecond UTC timestamp so repeated uploads of the
/// same filename cannot collide. No database row is written here; a file
/// on disk without a matching record is an accepted outcome.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Upload response: the submitted values echoed back plus the derived
/// storage filename (null when no file was sent)
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Submitted `loginuser` form field
    pub loginuser: Option<String>,

    /// Submitted `feature` form field, verbatim
    pub feature: Option<String>,

    /// Name the file was stored under
    pub filename: Option<String>,
}

/// Accepts a multipart form and persists the optional `data` file.
///
/// # Errors
///
/// - `400 Bad Request`: malformed multipart body
/// - `500 Internal Server Error`: the file could not be written
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut loginuser = None;
    let mut feature = None;
    let mut filename = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("loginuser") => {
                loginuser = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| ApiError::BadRequest(err.to_string()))?,
                );
            }
            Some("feature") => {
                feature = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| ApiError::BadRequest(err.to_string()))?,
                );
            }
            Some("data") => {
                let original = field
                    .file_name()
                    .map(str::to_owned)
                    .filter(|n| !n.is_empty());

                let Some(original) = original else {
                    continue;
                };

                // Clients control the submitted filename; only its final
                // path component is kept
                let base = Path::new(&original)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or(original);

                let stamp = Utc::now().naive_utc().format("%Y%m%d%H%M%S%6f");
                let saved_name = format!("{stamp}_{base}");

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::BadRequest(err.to_string()))?;

                let target = state.config.upload.dir.join(&saved_name);
                tokio::fs::write(&target, &bytes).await?;

                info!(file = %target.display(), size = bytes.len(), "Stored uploaded file");
                filename = Some(saved_name);
            }
            _ => {}
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            loginuser,
            feature,
            filename,
        }),
    ))
}
