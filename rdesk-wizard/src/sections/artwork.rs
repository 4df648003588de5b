//! Cover artwork

use std::path::Path;
use tokio::sync::watch;
use tracing::warn;

use rdesk_common::model::{FileRef, LocalFile, ReleaseData, UploadKind};
use rdesk_common::validators::MAX_DOCUMENT_UPLOAD_BYTES;

use crate::client::{ReleaseBackend, UploadProgress};
use crate::notice::Notice;
use crate::reducer::ReleaseAction;

pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
pub const MAX_ARTWORK_BYTES: u64 = MAX_DOCUMENT_UPLOAD_BYTES;
pub const MAX_CAPTION_CHARS: usize = 500;

pub fn is_allowed_image(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ALLOWED_IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

pub fn validate_artwork(file: &LocalFile) -> Result<(), String> {
    if !is_allowed_image(&file.name) {
        return Err(format!("\"{}\" must be a JPEG or PNG image", file.name));
    }
    if file.size > MAX_ARTWORK_BYTES {
        return Err(format!(
            "Artwork must be at most {} MB",
            MAX_ARTWORK_BYTES / (1024 * 1024)
        ));
    }
    Ok(())
}

/// Caption edit, truncated to the allowed length
pub fn caption_action(caption: &str) -> ReleaseAction {
    ReleaseAction::SetCoverCaption(caption.chars().take(MAX_CAPTION_CHARS).collect())
}

/// Validate and upload, returning the action that stores the URL
///
/// Pair with [`select_artwork`] to show the pending file meanwhile.
pub async fn upload_artwork(
    backend: &dyn ReleaseBackend,
    data: &ReleaseData,
    file: LocalFile,
    progress: Option<watch::Sender<UploadProgress>>,
) -> Result<Vec<ReleaseAction>, Notice> {
    validate_artwork(&file).map_err(Notice::error)?;

    match backend.upload(UploadKind::Artwork, &file, data.id, progress).await {
        Ok(response) => Ok(vec![ReleaseAction::SetCoverArtwork(Some(FileRef::Remote(
            response.url,
        )))]),
        Err(e) => {
            warn!("Artwork upload failed: {}", e);
            Err(Notice::error(format!("Artwork upload failed: {}", e)))
        }
    }
}

/// Pending-file action shown while the upload runs
pub fn select_artwork(file: LocalFile) -> ReleaseAction {
    ReleaseAction::SetCoverArtwork(Some(FileRef::Local(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeBackend;
    use crate::reducer::reduce;

    #[test]
    fn test_allowed_types() {
        assert!(is_allowed_image("cover.PNG"));
        assert!(is_allowed_image("cover.jpeg"));
        assert!(!is_allowed_image("cover.gif"));
        assert!(!is_allowed_image("cover"));
    }

    #[test]
    fn test_size_cap() {
        assert!(validate_artwork(&LocalFile::new("cover.jpg", 1024)).is_ok());
        assert!(validate_artwork(&LocalFile::new("cover.jpg", MAX_ARTWORK_BYTES + 1)).is_err());
    }

    #[test]
    fn test_caption_truncated() {
        let long = "x".repeat(MAX_CAPTION_CHARS + 10);
        let ReleaseAction::SetCoverCaption(caption) = caption_action(&long) else {
            panic!("wrong action");
        };
        assert_eq!(caption.chars().count(), MAX_CAPTION_CHARS);
    }

    #[tokio::test]
    async fn test_upload_sets_remote_url() {
        let backend = FakeBackend::default();
        let file = LocalFile::new("/tmp/cover.png", 2048);
        let data = reduce(ReleaseData::new(), select_artwork(file.clone()));
        assert!(data.cover_artwork_url().is_none());

        let actions = upload_artwork(&backend, &data, file, None).await.unwrap();
        let data = actions.into_iter().fold(data, reduce);
        assert_eq!(data.cover_artwork_url(), Some("/uploads/artwork/cover.png"));
    }

    #[tokio::test]
    async fn test_rejected_file_never_uploads() {
        let backend = FakeBackend::default();
        let file = LocalFile::new("a.bmp", 10);
        let notice = upload_artwork(&backend, &ReleaseData::new(), file, None)
            .await
            .unwrap_err();
        assert!(notice.message.contains("JPEG or PNG"));
        assert!(backend.with(|s| s.uploads.is_empty()));
    }

    #[tokio::test]
    async fn test_upload_failure_is_a_notice() {
        let backend = FakeBackend::default();
        backend.with(|s| s.uploads_down = true);
        let result =
            upload_artwork(&backend, &ReleaseData::new(), LocalFile::new("c.png", 10), None).await;
        assert!(result.is_err());
    }
}
