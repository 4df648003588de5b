//! Release draft reducer
//!
//! Every form callback is expressed as a [`ReleaseAction`] and applied with
//! [`reduce`]. The reducer is the only place that mutates a draft, so the
//! draft invariants hold after every action:
//!
//! - worldwide availability implies home availability
//! - an explicit track is never marked child-safe
//! - `tracks.len() == track_count` (and `track_count >= 1`)

use chrono::NaiveDate;
use uuid::Uuid;

use rdesk_common::model::{
    ChildSafeContent, Clearance, ContactBlock, Contributor, ExplicitContent, FileRef, GoLiveOption,
    LocalFile, ReleaseData, ReleaseStatus, ReleaseType, ReleaseVersion, RightsEntry,
    SignatoryRole, TitleSource,
};

/// The six submission checkboxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Distribution,
    Rights,
    Privacy,
    Accuracy,
    Ownership,
    Review,
}

impl Term {
    pub const ALL: [Term; 6] = [
        Term::Distribution,
        Term::Rights,
        Term::Privacy,
        Term::Accuracy,
        Term::Ownership,
        Term::Review,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Term::Distribution => "I accept the distribution terms",
            Term::Rights => "I accept the rights terms",
            Term::Privacy => "I accept the privacy policy",
            Term::Accuracy => "The information provided is accurate",
            Term::Ownership => "I own or control the rights to this release",
            Term::Review => "I have reviewed the release before submitting",
        }
    }

    pub fn is_set(self, data: &ReleaseData) -> bool {
        match self {
            Term::Distribution => data.terms_distribution,
            Term::Rights => data.terms_rights,
            Term::Privacy => data.terms_privacy,
            Term::Accuracy => data.confirm_accuracy,
            Term::Ownership => data.confirm_ownership,
            Term::Review => data.confirm_review,
        }
    }

    fn set(self, data: &mut ReleaseData, value: bool) {
        let field = match self {
            Term::Distribution => &mut data.terms_distribution,
            Term::Rights => &mut data.terms_rights,
            Term::Privacy => &mut data.terms_privacy,
            Term::Accuracy => &mut data.confirm_accuracy,
            Term::Ownership => &mut data.confirm_ownership,
            Term::Review => &mut data.confirm_review,
        };
        *field = value;
    }
}

/// Edits to a single track slot
#[derive(Debug, Clone, PartialEq)]
pub enum TrackAction {
    SetTitle(String),
    SetVersion(String),
    SetIsrc(String),
    ConfirmIsrc(bool),
    SetIswc(String),
    ConfirmIswc(bool),
    SetMusicalWorkTitle(String),
    SetPrimaryArtists(Vec<Contributor>),
    SetFeaturedArtists(Vec<Contributor>),
    SetSessionArtists(Vec<Contributor>),
    SetCreators(Vec<Contributor>),
    SetProducers(Vec<Contributor>),
    SetCoverRights(Clearance),
    SetRemixRights(Clearance),
    SetSampleRights(Clearance),
    SetGenres(Vec<String>),
    SetMoods(Vec<String>),
    SetLanguages(Vec<String>),
    SetExplicitContent(Option<ExplicitContent>),
    SetChildSafeContent(Option<ChildSafeContent>),
    /// Local file picked, not yet uploaded
    SelectAudioFile(Option<LocalFile>),
    /// Upload finished; the local handle is replaced by the URL
    AudioUploaded {
        url: String,
        duration_seconds: Option<u32>,
    },
    SetLyricsText(String),
    SetLyricsFile(Option<FileRef>),
    SetVideoUrl(Option<String>),
    SetPreviewStart(u32),
}

/// Edits to a release draft
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseAction {
    /// Replace the whole draft (loaded from the server)
    Load(ReleaseData),
    /// Server acknowledged a save
    Saved {
        id: Uuid,
        revision: i64,
        status: ReleaseStatus,
    },

    SetReleaseTitle(String),
    ConfirmReleaseTitle(bool),
    SetTitleSource(TitleSource),
    SetUpc(String),
    ConfirmUpc(bool),
    SetEan(String),
    ConfirmEan(bool),
    SetCountryOfOrigin(String),

    SetReleaseType(Option<ReleaseType>),
    SetTrackCount(u32),
    SetReleaseVersion(ReleaseVersion),

    SetAvailableHome(bool),
    SetAvailableSpecific(bool),
    SetAvailableWorldwide(bool),
    AddTerritory(String),
    RemoveTerritory(String),

    SetGoLiveOption(Option<GoLiveOption>),
    SetGoLiveDate(Option<NaiveDate>),

    SetRecordLabelIndependent(bool),
    SetRecordLabels(Vec<RightsEntry>),
    ConfirmRecordLabels(bool),
    SetPublisherIndependent(bool),
    SetPublishers(Vec<RightsEntry>),
    ConfirmPublishers(bool),

    SetDistributor(ContactBlock),
    SetWroteComposition(Option<bool>),
    SetPro(ContactBlock),
    SetMcs(ContactBlock),

    SetCoverArtwork(Option<FileRef>),
    SetCoverCaption(String),

    SetTerm(Term, bool),
    SetSignatoryRole(Option<SignatoryRole>),
    SetSignatureName(String),
    SetSignatureEmail(String),

    /// Edit the track at a zero-based slot index; out-of-range indices are ignored
    UpdateTrack(usize, TrackAction),
}

/// Apply `action` to `state`
pub fn reduce(mut state: ReleaseData, action: ReleaseAction) -> ReleaseData {
    use ReleaseAction::*;

    match action {
        Load(data) => state = data,
        Saved {
            id,
            revision,
            status,
        } => {
            state.id = Some(id);
            state.revision = revision;
            state.status = status;
        }

        SetReleaseTitle(title) => {
            state.release_title = title;
            state.release_title_source = TitleSource::Manual;
        }
        ConfirmReleaseTitle(v) => state.release_title_confirmed = v,
        SetTitleSource(source) => state.release_title_source = source,
        SetUpc(code) => {
            state.upc = code;
            state.upc_confirmed = false;
        }
        ConfirmUpc(v) => state.upc_confirmed = v,
        SetEan(code) => {
            state.ean = code;
            state.ean_confirmed = false;
        }
        ConfirmEan(v) => state.ean_confirmed = v,
        SetCountryOfOrigin(country) => state.country_of_origin = country.trim().to_uppercase(),

        SetReleaseType(release_type) => state.release_type = release_type,
        SetTrackCount(count) => state.track_count = count.max(1),
        SetReleaseVersion(version) => state.release_version = version,

        SetAvailableHome(v) => state.available_home = v,
        SetAvailableSpecific(v) => state.available_specific = v,
        SetAvailableWorldwide(v) => state.available_worldwide = v,
        AddTerritory(code) => {
            let code = code.trim().to_uppercase();
            if !code.is_empty() {
                state.specific_territories.insert(code);
            }
        }
        RemoveTerritory(code) => {
            state.specific_territories.remove(&code.trim().to_uppercase());
        }

        SetGoLiveOption(option) => {
            state.go_live_option = option;
            if option == Some(GoLiveOption::Asap) {
                state.go_live_date = None;
            }
        }
        SetGoLiveDate(date) => state.go_live_date = date,

        SetRecordLabelIndependent(v) => state.record_label_independent = v,
        SetRecordLabels(entries) => state.record_labels = entries,
        ConfirmRecordLabels(v) => state.record_labels_confirmed = v,
        SetPublisherIndependent(v) => state.publisher_independent = v,
        SetPublishers(entries) => state.publishers = entries,
        ConfirmPublishers(v) => state.publishers_confirmed = v,

        SetDistributor(block) => state.distributor = block,
        SetWroteComposition(v) => state.wrote_composition = v,
        SetPro(block) => state.pro = block,
        SetMcs(block) => state.mcs = block,

        SetCoverArtwork(file) => state.cover_artwork = file,
        SetCoverCaption(caption) => state.cover_caption = caption,

        SetTerm(term, v) => term.set(&mut state, v),
        SetSignatoryRole(role) => state.signatory_role = role,
        SetSignatureName(name) => state.signature_name = name,
        SetSignatureEmail(email) => state.signature_email = email.trim().to_string(),

        UpdateTrack(index, track_action) => {
            if let Some(track) = state.tracks.get_mut(index) {
                apply_track_action(track, track_action);
            }
        }
    }

    enforce_invariants(&mut state);
    state
}

fn apply_track_action(track: &mut rdesk_common::model::TrackData, action: TrackAction) {
    use TrackAction::*;

    match action {
        SetTitle(title) => track.title = title,
        SetVersion(version) => track.version = version,
        SetIsrc(code) => {
            track.isrc = code;
            track.isrc_confirmed = false;
        }
        ConfirmIsrc(v) => track.isrc_confirmed = v,
        SetIswc(code) => {
            track.iswc = code;
            track.iswc_confirmed = false;
        }
        ConfirmIswc(v) => track.iswc_confirmed = v,
        SetMusicalWorkTitle(title) => track.musical_work_title = title,
        SetPrimaryArtists(list) => track.primary_artists = list,
        SetFeaturedArtists(list) => track.featured_artists = list,
        SetSessionArtists(list) => track.session_artists = list,
        SetCreators(list) => track.creators = list,
        SetProducers(list) => track.producers = list,
        SetCoverRights(c) => track.cover_rights = c,
        SetRemixRights(c) => track.remix_rights = c,
        SetSampleRights(c) => track.sample_rights = c,
        SetGenres(tags) => track.genres = tags,
        SetMoods(tags) => track.moods = tags,
        SetLanguages(tags) => track.languages = tags,
        SetExplicitContent(v) => track.explicit_content = v,
        SetChildSafeContent(v) => track.child_safe_content = v,
        SelectAudioFile(file) => track.audio_file = file,
        AudioUploaded {
            url,
            duration_seconds,
        } => {
            track.audio_file = None;
            track.audio_url = Some(url);
            if duration_seconds.is_some() {
                track.duration_seconds = duration_seconds;
            }
        }
        SetLyricsText(text) => track.lyrics_text = text,
        SetLyricsFile(file) => track.lyrics_file = file,
        SetVideoUrl(url) => track.video_url = url.filter(|u| !u.trim().is_empty()),
        SetPreviewStart(seconds) => track.preview_start_seconds = seconds,
    }
}

fn enforce_invariants(state: &mut ReleaseData) {
    state.track_count = state.track_count.max(1);
    state.sync_track_slots();
    state.enforce_flags();
}
