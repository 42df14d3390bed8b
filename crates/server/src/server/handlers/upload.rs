use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::debug;

use crate::auth::token::AdminClaims;
use crate::error::{RequestError, ValidationError};
use crate::media::{MediaUpload, UploadedMedia};
use crate::server::constants::MAX_UPLOAD_BYTES;
use crate::server::state::AppState;

const FALLBACK_FILE_NAME: &str = "upload";

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    admin: AdminClaims,
    mut multipart: Multipart,
) -> Result<Json<UploadedMedia>, RequestError> {
    let mut file = None;
    let mut folder = None;
    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(FALLBACK_FILE_NAME)
                    .to_string();
                let bytes = field.bytes().await.map_err(invalid_multipart)?;
                file = Some((file_name, bytes));
            }
            Some("folder") => {
                let value = field.text().await.map_err(invalid_multipart)?;
                folder = Some(value.trim().to_string()).filter(|value| !value.is_empty());
            }
            other => debug!("ignoring multipart field {other:?}"),
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ValidationError::InvalidInput {
        value: "file".to_string(),
        reason: "no file provided".to_string(),
    })?;
    validate_upload_size(bytes.len())?;

    debug!("user {} uploading {file_name} ({} bytes)", admin.user_id, bytes.len());
    let uploaded = state
        .media
        .upload(MediaUpload {
            bytes: bytes.to_vec(),
            file_name,
            folder: folder.unwrap_or_else(|| state.config.media.folder.clone()),
        })
        .await?;
    Ok(Json(uploaded))
}

pub fn validate_upload_size(len: usize) -> Result<(), ValidationError> {
    if len > MAX_UPLOAD_BYTES {
        return Err(ValidationError::LimitExceeded {
            subject: "upload".to_string(),
            unit: "byte".to_string(),
            attempted: len,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

fn invalid_multipart(e: MultipartError) -> RequestError {
    ValidationError::InvalidInput {
        value: "multipart body".to_string(),
        reason: e.body_text(),
    }
    .into()
}
