//! Track details: audio upload and code verification
//!
//! An audio upload is validated locally first (filename contract and size
//! cap) and always belongs to a stored release. After the upload lands, a
//! track that already has a title and a confirmed ISRC is saved on its own
//! so the file is never orphaned; an incomplete track gets a reminder
//! instead. ISRC and ISWC are verified on
//! blur once they reach full length. Verification failures are soft.

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use rdesk_common::model::{IsrcLookup, IswcLookup, LocalFile, ReleaseData, UploadKind};
use rdesk_common::validators::{
    clean_isrc, clean_iswc, validate_audio_file, validate_isrc, validate_iswc, ISRC_LENGTH,
};

use crate::client::{ReleaseBackend, UploadProgress};
use crate::notice::Notice;
use crate::reducer::{reduce, ReleaseAction, TrackAction};

/// Cleaned ISWC length (`T` plus ten digits)
pub const ISWC_LENGTH: usize = 11;

/// Result of an audio upload attempt
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackUpload {
    /// Apply in order, even on failure
    pub actions: Vec<ReleaseAction>,
    pub notices: Vec<Notice>,
    /// The track was persisted by its own save call
    pub track_saved: bool,
}

impl TrackUpload {
    fn failed(actions: Vec<ReleaseAction>, message: impl Into<String>) -> Self {
        Self {
            actions,
            notices: vec![Notice::error(message)],
            track_saved: false,
        }
    }
}

/// Upload `file` as the audio for track slot `index` of release `release_id`
pub async fn upload_track_audio(
    backend: &dyn ReleaseBackend,
    data: &ReleaseData,
    release_id: Uuid,
    index: usize,
    file: LocalFile,
    progress: Option<watch::Sender<UploadProgress>>,
) -> TrackUpload {
    if index >= data.tracks.len() {
        return TrackUpload::failed(Vec::new(), format!("Track {} does not exist", index + 1));
    }
    if let Err(e) = validate_audio_file(&file.name, file.size) {
        return TrackUpload::failed(Vec::new(), e.to_string());
    }

    let mut actions = vec![ReleaseAction::UpdateTrack(
        index,
        TrackAction::SelectAudioFile(Some(file.clone())),
    )];

    let upload = backend.upload(UploadKind::Audio, &file, Some(release_id), progress);
    let response = match upload.await {
        Ok(response) => response,
        Err(e) => {
            warn!("Audio upload for track {} failed: {}", index + 1, e);
            return TrackUpload::failed(actions, format!("Upload failed: {}", e));
        }
    };
    debug!("Uploaded {} ({} bytes) to {}", file.name, response.size, response.url);

    actions.push(ReleaseAction::UpdateTrack(
        index,
        TrackAction::AudioUploaded {
            url: response.url,
            duration_seconds: None,
        },
    ));

    let updated = actions.iter().cloned().fold(data.clone(), reduce);
    let Some(track) = updated.tracks.get(index) else {
        return TrackUpload::failed(actions, format!("Track {} no longer exists", index + 1));
    };

    let mut result = TrackUpload {
        actions,
        ..Default::default()
    };

    if !track.ready_for_autosave() {
        result.notices.push(Notice::info(
            "Audio uploaded. Add a title and confirm the ISRC so this track can be saved.",
        ));
        return result;
    }
    match backend.save_track(release_id, track).await {
        Ok(()) => result.track_saved = true,
        Err(e) => {
            warn!("Saving track {} after upload failed: {}", index + 1, e);
            result.notices.push(Notice::warning(
                "Audio uploaded, but the track could not be saved yet. \
                 It will be saved when you submit.",
            ));
        }
    }
    result
}

/// Outcome of an on-blur code check
#[derive(Debug, Clone, PartialEq)]
pub enum Verification<T> {
    /// Too short to check; nothing sent
    Skipped,
    /// Malformed; shown inline
    Invalid(String),
    Found(T),
    NotFound,
    /// Lookup service failed; the user may continue
    Unavailable,
}

impl<T> Verification<T> {
    /// Hint for the field, if one should be shown
    pub fn hint(&self) -> Option<String> {
        match self {
            Verification::Invalid(message) => Some(message.clone()),
            Verification::NotFound => {
                Some("Not found in the registry. Check the code before confirming.".into())
            }
            Verification::Unavailable => {
                Some("Could not verify right now. You can still continue.".into())
            }
            Verification::Skipped | Verification::Found(_) => None,
        }
    }
}

pub async fn verify_isrc_on_blur(
    backend: &dyn ReleaseBackend,
    raw: &str,
) -> Verification<IsrcLookup> {
    let code = clean_isrc(raw);
    if code.len() < ISRC_LENGTH {
        return Verification::Skipped;
    }
    if !validate_isrc(&code) {
        return Verification::Invalid("ISRC must look like CC-XXX-YY-NNNNN".into());
    }
    match backend.verify_isrc(&code).await {
        Ok(lookup) if lookup.found => Verification::Found(lookup),
        Ok(_) => Verification::NotFound,
        Err(e) => {
            warn!(isrc = %code, "ISRC verification failed: {}", e);
            Verification::Unavailable
        }
    }
}

pub async fn verify_iswc_on_blur(
    backend: &dyn ReleaseBackend,
    raw: &str,
) -> Verification<IswcLookup> {
    let code = clean_iswc(raw);
    if code.len() < ISWC_LENGTH {
        return Verification::Skipped;
    }
    if !validate_iswc(&code) {
        return Verification::Invalid("ISWC must look like T-123.456.789-0".into());
    }
    match backend.verify_iswc(&code).await {
        Ok(lookup) if lookup.found => Verification::Found(lookup),
        Ok(_) => Verification::NotFound,
        Err(e) => {
            warn!(iswc = %code, "ISWC verification failed: {}", e);
            Verification::Unavailable
        }
    }
}

/// Fill an empty track title from a verified ISRC
pub fn prefill_from_isrc(
    data: &ReleaseData,
    index: usize,
    lookup: &IsrcLookup,
) -> Vec<ReleaseAction> {
    let mut actions = Vec::new();
    let Some(track) = data.tracks.get(index) else {
        return actions;
    };
    if track.title.trim().is_empty() {
        if let Some(title) = lookup.title.as_deref().filter(|t| !t.trim().is_empty()) {
            let title = TrackAction::SetTitle(title.to_string());
            actions.push(ReleaseAction::UpdateTrack(index, title));
        }
    }
    actions
}
