//! In-memory [`ReleaseBackend`] for unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;
use uuid::Uuid;

use rdesk_common::model::{
    ErrorReport, GtinLookup, Invite, IsrcLookup, IswcLookup, LocalFile, NewInvite, ReleaseData,
    ReleaseStatus, SaveReleaseResponse, TrackData, UploadKind, UploadResponse,
};

use crate::client::{ClientError, ClientResult, ReleaseBackend, UploadProgress};

#[derive(Default)]
pub(crate) struct FakeState {
    pub releases: HashMap<Uuid, ReleaseData>,
    pub release_saves: Vec<ReleaseData>,
    pub track_saves: Vec<(Uuid, TrackData)>,
    pub uploads: Vec<(UploadKind, String, Option<Uuid>)>,
    pub gtin: HashMap<String, GtinLookup>,
    pub isrc: HashMap<String, IsrcLookup>,
    pub lookup_calls: Vec<String>,
    pub reports: Vec<ErrorReport>,
    pub lookups_down: bool,
    pub uploads_down: bool,
    pub fail_next_save: bool,
    pub auto_publish: bool,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    pub state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }
}

fn unavailable() -> ClientError {
    ClientError::Server {
        status: 502,
        message: "lookup service unavailable".into(),
    }
}

#[async_trait]
impl ReleaseBackend for FakeBackend {
    async fn load_release(&self, id: Uuid) -> ClientResult<Option<ReleaseData>> {
        Ok(self.with(|s| s.releases.get(&id).cloned()))
    }

    async fn save_release(&self, release: &ReleaseData) -> ClientResult<SaveReleaseResponse> {
        self.with(|s| {
            if std::mem::take(&mut s.fail_next_save) {
                return Err(ClientError::Network("connection reset".into()));
            }
            let id = release.id.unwrap_or_else(Uuid::new_v4);
            let current = s.releases.get(&id).map(|r| r.revision).unwrap_or(0);
            if release.id.is_some() && current != 0 && current != release.revision {
                return Err(ClientError::Conflict(format!(
                    "submitted revision {}, current {}",
                    release.revision, current
                )));
            }

            let mut stored = release.clone();
            stored.id = Some(id);
            stored.revision = current + 1;
            if stored.status == ReleaseStatus::PendingReview && s.auto_publish {
                stored.status = ReleaseStatus::Published;
            }
            s.release_saves.push(release.clone());
            s.releases.insert(id, stored.clone());

            Ok(SaveReleaseResponse {
                success: true,
                id,
                revision: stored.revision,
                status: stored.status,
            })
        })
    }

    async fn save_track(&self, release_id: Uuid, track: &TrackData) -> ClientResult<()> {
        self.with(|s| s.track_saves.push((release_id, track.clone())));
        Ok(())
    }

    async fn upload(
        &self,
        kind: UploadKind,
        file: &LocalFile,
        entity_id: Option<Uuid>,
        progress: Option<watch::Sender<UploadProgress>>,
    ) -> ClientResult<UploadResponse> {
        if self.with(|s| s.uploads_down) {
            return Err(ClientError::Network("upload failed".into()));
        }
        if let Some(tx) = progress {
            let _ = tx.send(UploadProgress {
                sent: file.size,
                total: file.size,
            });
        }
        let url = format!("/uploads/{}/{}", kind, file.name);
        self.with(|s| s.uploads.push((kind, file.name.clone(), entity_id)));
        Ok(UploadResponse {
            success: true,
            url,
            size: file.size,
        })
    }

    async fn lookup_gtin(&self, gtin: &str) -> ClientResult<GtinLookup> {
        self.with(|s| {
            s.lookup_calls.push(gtin.to_string());
            if s.lookups_down {
                return Err(unavailable());
            }
            Ok(s.gtin.get(gtin).cloned().unwrap_or_else(|| GtinLookup::not_found(gtin)))
        })
    }

    async fn verify_isrc(&self, isrc: &str) -> ClientResult<IsrcLookup> {
        self.with(|s| {
            s.lookup_calls.push(isrc.to_string());
            if s.lookups_down {
                return Err(unavailable());
            }
            Ok(s.isrc.get(isrc).cloned().unwrap_or_else(|| IsrcLookup::not_found(isrc)))
        })
    }

    async fn verify_iswc(&self, iswc: &str) -> ClientResult<IswcLookup> {
        self.with(|s| {
            s.lookup_calls.push(iswc.to_string());
            if s.lookups_down {
                return Err(unavailable());
            }
            Ok(IswcLookup::not_found(iswc))
        })
    }

    async fn send_invite(&self, invite: &NewInvite) -> ClientResult<Invite> {
        Ok(Invite {
            id: Uuid::new_v4(),
            release_id: invite.release_id,
            email: invite.email.clone(),
            role: invite.role,
            status: "pending".into(),
            token: "token".into(),
        })
    }

    async fn report_error(&self, report: &ErrorReport) -> ClientResult<()> {
        self.with(|s| s.reports.push(report.clone()));
        Ok(())
    }
}

/// A draft that passes every step predicate
pub(crate) fn complete_release() -> ReleaseData {
    use rdesk_common::model::{
        ContactBlock, Contributor, FileRef, GoLiveOption, ReleaseType, SignatoryRole,
    };

    let mut release = ReleaseData::new();
    release.release_title = "Night Drive".into();
    release.release_title_confirmed = true;
    release.upc = "036000291452".into();
    release.upc_confirmed = true;
    release.release_type = Some(ReleaseType::Single);
    release.available_home = true;
    release.go_live_option = Some(GoLiveOption::Asap);
    release.record_label_independent = true;
    release.record_labels_confirmed = true;
    release.publisher_independent = true;
    release.publishers_confirmed = true;
    release.distributor = ContactBlock::named("Fresh Tunes");
    release.distributor.confirmed = true;
    release.wrote_composition = Some(false);
    release.cover_artwork = Some(FileRef::Remote("/uploads/artwork/cover.png".into()));

    let track = &mut release.tracks[0];
    track.title = "Night Drive".into();
    track.isrc = "USRC17607839".into();
    track.isrc_confirmed = true;
    track.audio_url = Some("/uploads/audio/Nova - Night Drive.wav".into());
    track.primary_artists.push(Contributor::named("Nova"));

    release.terms_distribution = true;
    release.terms_rights = true;
    release.terms_privacy = true;
    release.confirm_accuracy = true;
    release.confirm_ownership = true;
    release.confirm_review = true;
    release.signatory_role = Some(SignatoryRole::Artist);
    release.signature_name = "Nova Reyes".into();
    release.signature_email = "nova@example.com".into();
    release
}
