//! Step wizard controller
//!
//! Owns the draft, the current step and the autosave timer. Forward
//! navigation is gated on the current step's completion predicate; every
//! successful transition flushes an autosave. Nothing here is fatal: a
//! refused transition is a [`NavigationError`] value and a failed save
//! becomes a [`Notice`].

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use rdesk_common::config::DEFAULT_AUTOSAVE_DEBOUNCE_MS;
use rdesk_common::model::{LocalFile, ReleaseData, ReleaseStatus, SaveReleaseResponse};
use rdesk_common::steps::{first_incomplete_step, is_step_complete, is_submission_valid, Step};
use uuid::Uuid;

use crate::autosave::{Clock, Debouncer, SaveSequencer};
use crate::client::{ClientError, ClientResult, ReleaseBackend, UploadProgress};
use crate::notice::Notice;
use crate::reducer::{reduce, ReleaseAction};
use crate::sections::tracks;

/// Why a transition was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Complete the {0} step first")]
    StepIncomplete(Step),

    #[error("The {0} step cannot be reached yet")]
    Unreachable(Step),

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the last step")]
    AtLastStep,

    #[error("Submit is only available on the final step")]
    NotOnSubmitStep,

    #[error("Accept all terms and sign before submitting")]
    SubmissionInvalid,

    #[error("This release has already been submitted")]
    AlreadySubmitted,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Refused(#[from] NavigationError),

    #[error("Submission failed: {0}")]
    Failed(#[from] ClientError),
}

/// A save handed to the backend but not yet answered
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub seq: u64,
    pub snapshot: ReleaseData,
}

pub struct WizardController<C: Clock> {
    data: ReleaseData,
    step: Step,
    backend: Arc<dyn ReleaseBackend>,
    clock: C,
    autosave: Debouncer,
    sequencer: SaveSequencer,
    notices: Vec<Notice>,
}

impl<C: Clock> WizardController<C> {
    /// Fresh draft at the guide step
    pub fn new(backend: Arc<dyn ReleaseBackend>, clock: C) -> Self {
        Self::with_data(backend, clock, ReleaseData::new())
    }

    /// Start from `data`, normalized the same way every edit is
    pub fn with_data(backend: Arc<dyn ReleaseBackend>, clock: C, data: ReleaseData) -> Self {
        Self {
            data: reduce(ReleaseData::default(), ReleaseAction::Load(data)),
            step: Step::Guide,
            backend,
            clock,
            autosave: Debouncer::new(Duration::from_millis(DEFAULT_AUTOSAVE_DEBOUNCE_MS)),
            sequencer: SaveSequencer::default(),
            notices: Vec::new(),
        }
    }

    /// Resume an existing draft at its first incomplete step
    pub async fn open(
        backend: Arc<dyn ReleaseBackend>,
        clock: C,
        id: Uuid,
    ) -> ClientResult<Option<Self>> {
        let Some(data) = backend.load_release(id).await? else {
            return Ok(None);
        };
        let mut controller = Self::with_data(backend, clock, data);
        controller.step = first_incomplete_step(&controller.data, controller.clock.today());
        info!("Resuming release {} at step {}", id, controller.step);
        Ok(Some(controller))
    }

    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.autosave = Debouncer::new(window);
        self
    }

    pub fn data(&self) -> &ReleaseData {
        &self.data
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn backend(&self) -> Arc<dyn ReleaseBackend> {
        Arc::clone(&self.backend)
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Drain notices for display
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Apply an edit and restart the autosave timer
    pub fn dispatch(&mut self, action: ReleaseAction) {
        let data = std::mem::take(&mut self.data);
        self.data = reduce(data, action);
        self.autosave.touch(self.clock.now());
    }

    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = ReleaseAction>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    pub fn is_complete(&self, step: Step) -> bool {
        is_step_complete(step, &self.data, self.clock.today())
    }

    /// Whether "Next" is enabled
    pub fn can_advance(&self) -> bool {
        !self.step.is_last() && self.is_complete(self.step)
    }

    /// Step-indicator click: earlier steps, or any step whose predecessor is complete
    pub fn can_go_to(&self, target: Step) -> bool {
        target <= self.step || target.previous().map_or(true, |prev| self.is_complete(prev))
    }

    pub async fn next(&mut self) -> Result<Step, NavigationError> {
        let Some(target) = self.step.next() else {
            return Err(NavigationError::AtLastStep);
        };
        if !self.is_complete(self.step) {
            return Err(NavigationError::StepIncomplete(self.step));
        }
        self.move_to(target).await;
        Ok(target)
    }

    pub async fn back(&mut self) -> Result<Step, NavigationError> {
        let target = self.step.previous().ok_or(NavigationError::AtFirstStep)?;
        self.move_to(target).await;
        Ok(target)
    }

    pub async fn go_to(&mut self, target: Step) -> Result<Step, NavigationError> {
        if !self.can_go_to(target) {
            return Err(NavigationError::Unreachable(target));
        }
        if target != self.step {
            self.move_to(target).await;
        }
        Ok(target)
    }

    async fn move_to(&mut self, target: Step) {
        debug!("Step {} -> {}", self.step, target);
        self.step = target;
        self.save_now().await;
    }

    /// Fire the debounced autosave if its window has elapsed
    pub async fn tick(&mut self) -> bool {
        if !self.autosave.take_due(self.clock.now()) {
            return false;
        }
        self.save_now().await;
        true
    }

    /// Save immediately; failures become notices
    pub async fn save_now(&mut self) -> Option<SaveReleaseResponse> {
        let pending = self.begin_save();
        let result = self.backend.save_release(&pending.snapshot).await;
        match result {
            Ok(response) => {
                self.finish_save(pending.seq, &response);
                Some(response)
            }
            Err(e) => {
                self.save_failed(&e);
                None
            }
        }
    }

    /// Snapshot the draft for a save the caller performs
    pub fn begin_save(&mut self) -> PendingSave {
        self.autosave.cancel();
        PendingSave {
            seq: self.sequencer.issue(),
            snapshot: self.data.clone(),
        }
    }

    /// Apply a save response unless a newer one was already applied
    pub fn finish_save(&mut self, seq: u64, response: &SaveReleaseResponse) -> bool {
        if !self.sequencer.accept(seq) {
            debug!("Discarding stale save response #{}", seq);
            return false;
        }
        let data = std::mem::take(&mut self.data);
        self.data = reduce(
            data,
            ReleaseAction::Saved {
                id: response.id,
                revision: response.revision,
                status: response.status,
            },
        );
        true
    }

    fn save_failed(&mut self, error: &ClientError) {
        warn!("Autosave failed: {}", error);
        let message = match error {
            ClientError::Conflict(_) => {
                "This release was changed in another window. Reload to continue editing."
                    .to_string()
            }
            other => format!("Could not save your changes: {}", other),
        };
        self.notices.push(Notice::error(message));
    }

    /// Id of the stored release, saving the draft first if it has none
    async fn ensure_release_id(&mut self) -> ClientResult<Uuid> {
        if let Some(id) = self.data.id {
            return Ok(id);
        }
        let pending = self.begin_save();
        let response = self.backend.save_release(&pending.snapshot).await?;
        self.finish_save(pending.seq, &response);
        Ok(response.id)
    }

    /// Upload audio for track slot `index` and apply the outcome
    ///
    /// A draft without an id is saved first so the file and the track land
    /// on a stored release. Returns whether the track itself was persisted.
    pub async fn upload_track_audio(
        &mut self,
        index: usize,
        file: LocalFile,
        progress: Option<watch::Sender<UploadProgress>>,
    ) -> bool {
        let release_id = match self.ensure_release_id().await {
            Ok(id) => id,
            Err(e) => {
                self.save_failed(&e);
                return false;
            }
        };
        let backend = self.backend.as_ref();
        let upload =
            tracks::upload_track_audio(backend, &self.data, release_id, index, file, progress)
                .await;
        self.dispatch_all(upload.actions);
        self.notices.extend(upload.notices);
        upload.track_saved
    }

    /// Save one track on its own; failures become notices
    pub async fn save_track(&mut self, index: usize) -> bool {
        let Some(track) = self.data.tracks.get(index) else {
            return false;
        };
        if !track.ready_for_autosave() {
            self.notices.push(Notice::info(
                "Add a title and confirm the ISRC before saving this track.",
            ));
            return false;
        }

        let result = match self.ensure_release_id().await {
            Ok(id) => self.backend.save_track(id, &self.data.tracks[index]).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                debug!("Saved track {}", index + 1);
                true
            }
            Err(e) => {
                warn!("Saving track {} failed: {}", index + 1, e);
                self.notices
                    .push(Notice::error(format!("Could not save track {}: {}", index + 1, e)));
                false
            }
        }
    }

    /// Persist every track that has a title and a confirmed ISRC
    async fn save_ready_tracks(&mut self) -> ClientResult<usize> {
        let id = self.ensure_release_id().await?;
        let mut saved = 0;
        for track in self.data.tracks.iter().filter(|t| t.ready_for_autosave()) {
            self.backend.save_track(id, track).await?;
            saved += 1;
        }
        Ok(saved)
    }

    /// Save the tracks, then send the final snapshot as `pending_review`
    ///
    /// The server may promote it straight to `published`. On failure the
    /// draft keeps its previous status.
    pub async fn submit(&mut self) -> Result<ReleaseStatus, SubmitError> {
        if self.step != Step::Submit {
            return Err(NavigationError::NotOnSubmitStep.into());
        }
        if !matches!(self.data.status, ReleaseStatus::Draft | ReleaseStatus::Rejected) {
            return Err(NavigationError::AlreadySubmitted.into());
        }
        if !is_submission_valid(&self.data) {
            return Err(NavigationError::SubmissionInvalid.into());
        }

        let saved_tracks = self.save_ready_tracks().await?;
        debug!("Saved {} tracks before submitting", saved_tracks);

        let mut pending = self.begin_save();
        pending.snapshot.status = ReleaseStatus::PendingReview;

        let response = self.backend.save_release(&pending.snapshot).await?;
        self.finish_save(pending.seq, &response);
        info!("Release {} submitted, status {}", response.id, response.status);
        Ok(response.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::ManualClock;
    use crate::fake::{complete_release, FakeBackend};
    use crate::notice::NoticeLevel;
    use chrono::{Duration as Days, NaiveDate};
    use rdesk_common::model::GoLiveOption;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 3, 1).unwrap()
    }

    fn setup(data: ReleaseData) -> (Arc<FakeBackend>, WizardController<ManualClock>) {
        let backend = Arc::new(FakeBackend::default());
        let clock = ManualClock::new(today());
        let controller = WizardController::with_data(backend.clone(), clock, data);
        (backend, controller)
    }

    fn saves(backend: &FakeBackend) -> usize {
        backend.with(|s| s.release_saves.len())
    }

    #[tokio::test]
    async fn test_next_is_gated_on_current_step() {
        let (backend, mut wizard) = setup(ReleaseData::new());

        assert_eq!(wizard.next().await, Ok(Step::Registration));
        assert_eq!(saves(&backend), 1, "transition flushes an autosave");

        assert_eq!(
            wizard.next().await,
            Err(NavigationError::StepIncomplete(Step::Registration))
        );
        assert_eq!(wizard.step(), Step::Registration);
        assert_eq!(saves(&backend), 1, "refused transition does not save");

        wizard.dispatch(ReleaseAction::ConfirmReleaseTitle(true));
        wizard.dispatch(ReleaseAction::ConfirmEan(true));
        assert!(wizard.can_advance());
        assert_eq!(wizard.next().await, Ok(Step::Type));
        assert_eq!(saves(&backend), 2);
    }

    #[tokio::test]
    async fn test_back_always_allowed_except_at_start() {
        let (backend, mut wizard) = setup(ReleaseData::new());
        assert_eq!(wizard.back().await, Err(NavigationError::AtFirstStep));

        wizard.next().await.unwrap();
        assert_eq!(wizard.back().await, Ok(Step::Guide));
        assert_eq!(saves(&backend), 2);
    }

    #[tokio::test]
    async fn test_go_to_requires_complete_predecessor() {
        let (_, mut wizard) = setup(complete_release());
        assert_eq!(wizard.go_to(Step::Tracks).await, Ok(Step::Tracks));
        assert_eq!(wizard.go_to(Step::Type).await, Ok(Step::Type));

        let (_, mut wizard) = setup(ReleaseData::new());
        assert_eq!(wizard.go_to(Step::Registration).await, Ok(Step::Registration));
        assert_eq!(
            wizard.go_to(Step::Geography).await,
            Err(NavigationError::Unreachable(Step::Geography))
        );
    }

    #[tokio::test]
    async fn test_future_date_needs_fourteen_days() {
        let mut data = complete_release();
        data.go_live_option = Some(GoLiveOption::Future);
        data.go_live_date = Some(today() + Days::days(5));
        let (_, mut wizard) = setup(data);

        wizard.go_to(Step::Date).await.unwrap();
        assert_eq!(wizard.next().await, Err(NavigationError::StepIncomplete(Step::Date)));

        wizard.dispatch(ReleaseAction::SetGoLiveDate(Some(today() + Days::days(14))));
        assert_eq!(wizard.next().await, Ok(Step::Rights));
    }

    #[tokio::test]
    async fn test_autosave_coalesces_edits() {
        let (backend, mut wizard) = setup(ReleaseData::new());
        let clock = wizard.clock().clone();

        for title in ["N", "Ni", "Night"] {
            wizard.dispatch(ReleaseAction::SetReleaseTitle(title.into()));
            clock.advance(std::time::Duration::from_millis(500));
            assert!(!wizard.tick().await);
        }

        clock.advance(std::time::Duration::from_millis(1500));
        assert!(wizard.tick().await);
        assert!(!wizard.tick().await);

        let sent = backend.with(|s| s.release_saves.clone());
        assert_eq!(sent.len(), 1, "only the settled snapshot is sent");
        assert_eq!(sent[0].release_title, "Night");
        assert!(wizard.data().id.is_some());
        assert_eq!(wizard.data().revision, 1);
    }

    #[tokio::test]
    async fn test_stale_save_response_does_not_roll_back() {
        let (_, mut wizard) = setup(ReleaseData::new());
        let id = Uuid::new_v4();

        let older = wizard.begin_save();
        wizard.dispatch(ReleaseAction::SetReleaseTitle("Newer".into()));
        let newer = wizard.begin_save();

        let response = |revision| SaveReleaseResponse {
            success: true,
            id,
            revision,
            status: ReleaseStatus::Draft,
        };
        assert!(wizard.finish_save(newer.seq, &response(2)));
        assert!(!wizard.finish_save(older.seq, &response(1)));

        assert_eq!(wizard.data().revision, 2);
        assert_eq!(wizard.data().release_title, "Newer");
    }

    #[tokio::test]
    async fn test_failed_save_is_a_notice_not_a_blocker() {
        let (backend, mut wizard) = setup(ReleaseData::new());
        backend.with(|s| s.fail_next_save = true);

        assert_eq!(wizard.next().await, Ok(Step::Registration));
        let notices = wizard.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(wizard.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rules_and_approval() {
        let mut data = complete_release();
        data.confirm_review = false;
        let (backend, mut wizard) = setup(data);

        assert!(matches!(
            wizard.submit().await,
            Err(SubmitError::Refused(NavigationError::NotOnSubmitStep))
        ));

        wizard.go_to(Step::Submit).await.unwrap();
        assert!(matches!(
            wizard.submit().await,
            Err(SubmitError::Refused(NavigationError::SubmissionInvalid))
        ));

        wizard.dispatch(ReleaseAction::SetTerm(crate::reducer::Term::Review, true));
        backend.with(|s| s.auto_publish = true);
        assert_eq!(wizard.submit().await.unwrap(), ReleaseStatus::Published);
        assert_eq!(wizard.data().status, ReleaseStatus::Published);

        let last = backend.with(|s| s.release_saves.last().cloned()).unwrap();
        assert_eq!(last.status, ReleaseStatus::PendingReview);

        assert!(matches!(
            wizard.submit().await,
            Err(SubmitError::Refused(NavigationError::AlreadySubmitted))
        ));
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_draft_status() {
        let (backend, mut wizard) = setup(complete_release());
        wizard.go_to(Step::Submit).await.unwrap();

        backend.with(|s| s.fail_next_save = true);
        assert!(matches!(wizard.submit().await, Err(SubmitError::Failed(_))));
        assert_eq!(wizard.data().status, ReleaseStatus::Draft);

        assert_eq!(wizard.submit().await.unwrap(), ReleaseStatus::PendingReview);
    }

    #[tokio::test]
    async fn test_open_resumes_at_first_incomplete_step() {
        let backend = Arc::new(FakeBackend::default());
        let mut data = complete_release();
        data.cover_artwork = None;
        let id = Uuid::new_v4();
        data.id = Some(id);
        backend.with(|s| s.releases.insert(id, data));

        let wizard = WizardController::open(backend.clone(), ManualClock::new(today()), id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(wizard.step(), Step::Artwork);

        let missing = WizardController::open(backend, ManualClock::new(today()), Uuid::new_v4())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_submit_saves_tracks_first() {
        let (backend, mut wizard) = setup(complete_release());
        wizard.go_to(Step::Submit).await.unwrap();

        wizard.submit().await.unwrap();
        let (tracks, id) = backend.with(|s| (s.track_saves.clone(), s.release_saves[0].id));
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].1.title, "Night Drive");
        assert_eq!(Some(tracks[0].0), wizard.data().id);
        assert!(id.is_none(), "first save created the release");
    }

    #[tokio::test]
    async fn test_save_track_creates_release_when_needed() {
        let (backend, mut wizard) = setup(complete_release());
        assert!(wizard.data().id.is_none());

        assert!(wizard.save_track(0).await);
        assert!(wizard.data().id.is_some());
        assert_eq!(saves(&backend), 1);
        assert_eq!(backend.with(|s| s.track_saves.len()), 1);

        assert!(!wizard.save_track(5).await);
    }

    #[tokio::test]
    async fn test_save_track_needs_title_and_isrc() {
        let (backend, mut wizard) = setup(ReleaseData::new());
        assert!(!wizard.save_track(0).await);
        assert_eq!(wizard.take_notices().len(), 1);
        assert_eq!(saves(&backend), 0);
    }

    #[tokio::test]
    async fn test_audio_upload_applies_url() {
        let (backend, mut wizard) = setup(complete_release());
        wizard.save_now().await;

        let file = LocalFile {
            name: "Nova - Night Drive.wav".into(),
            size: 1024,
            path: "/tmp/Nova - Night Drive.wav".into(),
        };
        assert!(wizard.upload_track_audio(0, file, None).await);
        assert_eq!(
            wizard.data().tracks[0].audio_url.as_deref(),
            Some("/uploads/audio/Nova - Night Drive.wav")
        );
        assert!(wizard.autosave_pending());
        assert_eq!(backend.with(|s| s.uploads.len()), 1);
    }

    #[tokio::test]
    async fn test_audio_upload_saves_new_draft_and_track() {
        let (backend, mut wizard) = setup(complete_release());
        assert!(wizard.data().id.is_none());

        let file = LocalFile::new("/music/Nova - Night Drive.wav", 1024);
        assert!(wizard.upload_track_audio(0, file, None).await);

        let id = wizard.data().id;
        assert!(id.is_some());
        assert!(wizard.take_notices().is_empty());
        backend.with(|s| {
            assert_eq!(s.release_saves.len(), 1);
            assert_eq!(s.uploads[0].2, id);
            assert_eq!(s.track_saves.len(), 1);
            assert_eq!(Some(s.track_saves[0].0), id);
        });
    }

    #[tokio::test]
    async fn test_audio_upload_needs_a_stored_release() {
        let (backend, mut wizard) = setup(complete_release());
        backend.with(|s| s.fail_next_save = true);

        let file = LocalFile::new("/music/Nova - Night Drive.wav", 1024);
        assert!(!wizard.upload_track_audio(0, file, None).await);
        assert_eq!(wizard.take_notices()[0].level, NoticeLevel::Error);
        assert!(backend.with(|s| s.uploads.is_empty()));
    }

    #[tokio::test]
    async fn test_rejected_release_can_be_resubmitted() {
        let mut data = complete_release();
        data.status = ReleaseStatus::Rejected;
        let (backend, mut wizard) = setup(data);
        wizard.go_to(Step::Submit).await.unwrap();

        assert_eq!(wizard.submit().await.unwrap(), ReleaseStatus::PendingReview);
        let last = backend.with(|s| s.release_saves.last().cloned()).unwrap();
        assert_eq!(last.status, ReleaseStatus::PendingReview);
    }

    #[tokio::test]
    async fn test_loaded_draft_follows_edit_rules() {
        use rdesk_common::model::{ChildSafeContent, ExplicitContent};

        let backend = Arc::new(FakeBackend::default());
        let mut data = complete_release();
        data.available_home = false;
        data.available_worldwide = true;
        data.tracks[0].explicit_content = Some(ExplicitContent::YesExplicit);
        data.tracks[0].child_safe_content = Some(ChildSafeContent::YesChildSafe);
        let id = Uuid::new_v4();
        data.id = Some(id);
        backend.with(|s| s.releases.insert(id, data));

        let wizard = WizardController::open(backend, ManualClock::new(today()), id)
            .await
            .unwrap()
            .unwrap();
        assert!(wizard.data().available_home);
        assert_eq!(
            wizard.data().tracks[0].child_safe_content,
            Some(ChildSafeContent::NoAdultThemes)
        );
    }
}
