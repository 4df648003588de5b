//! File uploads
//!
//! `POST /api/upload` takes multipart fields `type` (audio, artwork, proof,
//! lyrics), optional `entityId` (the release id) and `file`, in that order.
//! The file is streamed chunk by chunk into the object store; a body over
//! the cap for its kind is deleted and answered with 413.

use axum::{
    extract::{multipart::Field, Multipart, State},
    routing::post,
    Json, Router,
};
use rdesk_common::model::{UploadKind, UploadResponse};
use rdesk_common::validators::{
    is_valid_audio_filename, MAX_AUDIO_UPLOAD_BYTES, MAX_DOCUMENT_UPLOAD_BYTES,
};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::session::CurrentUser;
use crate::storage::{sanitize_file_name, ObjectStore};
use crate::AppState;

/// Size cap for an upload of `kind`
pub fn max_upload_bytes(kind: UploadKind) -> u64 {
    match kind {
        UploadKind::Audio => MAX_AUDIO_UPLOAD_BYTES,
        UploadKind::Artwork | UploadKind::Proof | UploadKind::Lyrics => MAX_DOCUMENT_UPLOAD_BYTES,
    }
}

fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Reject file names the wizard would not accept for `kind`
pub fn check_file_name(kind: UploadKind, file_name: &str) -> ApiResult<()> {
    let allowed: &[&str] = match kind {
        UploadKind::Audio => {
            return if is_valid_audio_filename(file_name) {
                Ok(())
            } else {
                Err(ApiError::BadRequest(format!(
                    "Audio files must be named \"Artist - Title.wav\": {}",
                    file_name
                )))
            };
        }
        UploadKind::Artwork => &["jpg", "jpeg", "png"],
        UploadKind::Proof => &["pdf", "jpg", "jpeg", "png"],
        UploadKind::Lyrics => &["txt", "lrc", "pdf", "doc", "docx"],
    };

    match extension(file_name) {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(ApiError::BadRequest(format!(
            "{} uploads must be one of: {}",
            kind,
            allowed.join(", ")
        ))),
    }
}

/// Object key: `<kind>/<entity or "unassigned">/<uuid>-<file name>`
pub fn object_key(kind: UploadKind, entity_id: Option<Uuid>, file_name: &str) -> String {
    let entity = entity_id.map_or_else(|| "unassigned".to_string(), |id| id.to_string());
    format!(
        "{}/{}/{}-{}",
        kind,
        entity,
        Uuid::new_v4().simple(),
        sanitize_file_name(file_name)
    )
}

/// Copy `field` into `key`, stopping once `max` bytes are exceeded
async fn stream_field(
    store: &dyn ObjectStore,
    key: &str,
    field: &mut Field<'_>,
    max: u64,
) -> ApiResult<u64> {
    let mut writer = store.create(key).await?;
    let mut size: u64 = 0;

    while let Some(chunk) = field.chunk().await? {
        size += chunk.len() as u64;
        if size > max {
            return Err(ApiError::PayloadTooLarge(format!(
                "Upload exceeds the {} byte limit",
                max
            )));
        }
        writer.write_all(&chunk).await?;
    }
    writer.shutdown().await?;
    Ok(size)
}

/// POST /api/upload
pub async fn upload(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut kind: Option<UploadKind> = None;
    let mut entity_id: Option<Uuid> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "type" => {
                let text = field.text().await?;
                let parsed: UploadKind = text
                    .parse()
                    .map_err(|_| ApiError::BadRequest(format!("Unknown upload type: {}", text)))?;
                kind = Some(parsed);
            }
            "entityId" => {
                let text = field.text().await?;
                let text = text.trim();
                if !text.is_empty() {
                    entity_id = Some(Uuid::parse_str(text).map_err(|_| {
                        ApiError::BadRequest(format!("Invalid entityId: {}", text))
                    })?);
                }
            }
            "file" => {
                let Some(kind) = kind else {
                    return Err(ApiError::BadRequest(
                        "The type field must come before the file".to_string(),
                    ));
                };
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|n| !n.trim().is_empty())
                    .ok_or_else(|| ApiError::BadRequest("Upload has no file name".to_string()))?;
                check_file_name(kind, &file_name)?;

                let key = object_key(kind, entity_id, &file_name);
                let max = max_upload_bytes(kind);
                let size = match stream_field(state.store.as_ref(), &key, &mut field, max).await {
                    Ok(size) => size,
                    Err(e) => {
                        if let Err(cleanup) = state.store.delete(&key).await {
                            warn!("Could not remove partial upload {}: {}", key, cleanup);
                        }
                        return Err(e);
                    }
                };

                info!("Stored {} upload {} ({} bytes) for {}", kind, key, size, user.id);
                return Ok(Json(UploadResponse {
                    success: true,
                    url: state.store.url_for(&key),
                    size,
                }));
            }
            _ => {}
        }
    }

    Err(ApiError::BadRequest("No file in upload".to_string()))
}

pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_names_follow_artist_title_rule() {
        assert!(check_file_name(UploadKind::Audio, "Nova - Night Drive.wav").is_ok());
        assert!(check_file_name(UploadKind::Audio, "night_drive.mp3").is_err());
    }

    #[test]
    fn test_document_extensions() {
        assert!(check_file_name(UploadKind::Artwork, "cover.JPG").is_ok());
        assert!(check_file_name(UploadKind::Artwork, "cover.gif").is_err());
        assert!(check_file_name(UploadKind::Proof, "licence.pdf").is_ok());
        assert!(check_file_name(UploadKind::Lyrics, "words.lrc").is_ok());
        assert!(check_file_name(UploadKind::Lyrics, "noextension").is_err());
    }

    #[test]
    fn test_object_key_layout() {
        let id = Uuid::parse_str("6f1c2c4e-8f3a-4b7e-9d6a-2a1b3c4d5e6f").unwrap();
        let key = object_key(UploadKind::Artwork, Some(id), "My Cover.png");
        assert!(key.starts_with("artwork/6f1c2c4e-8f3a-4b7e-9d6a-2a1b3c4d5e6f/"));
        assert!(key.ends_with("-My_Cover.png"));

        let key = object_key(UploadKind::Proof, None, "a.pdf");
        assert!(key.starts_with("proof/unassigned/"));
    }

    #[test]
    fn test_caps_by_kind() {
        assert_eq!(max_upload_bytes(UploadKind::Audio), MAX_AUDIO_UPLOAD_BYTES);
        assert_eq!(max_upload_bytes(UploadKind::Lyrics), MAX_DOCUMENT_UPLOAD_BYTES);
    }
}
