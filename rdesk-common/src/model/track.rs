//! Per-track state

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{string_enum, FileRef, LocalFile};
use crate::validators::validate_isrc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributorRole {
    Songwriter,
    Composer,
    Lyricist,
    Arranger,
    Producer,
    CoProducer,
    RecordingEngineer,
    MixingEngineer,
    MasteringEngineer,
    Performer,
}

string_enum!(ContributorRole {
    Songwriter => "songwriter",
    Composer => "composer",
    Lyricist => "lyricist",
    Arranger => "arranger",
    Producer => "producer",
    CoProducer => "co_producer",
    RecordingEngineer => "recording_engineer",
    MixingEngineer => "mixing_engineer",
    MasteringEngineer => "mastering_engineer",
    Performer => "performer",
});

/// Artist, creator or producer credit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Contributor {
    pub name: String,
    pub isni: String,
    pub ipi_cae: Option<String>,
    pub roles: BTreeSet<ContributorRole>,
    pub confirmed: bool,
}

impl Contributor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceStatus {
    #[default]
    NotApplicable,
    Cleared,
    Pending,
    NotCleared,
}

string_enum!(ClearanceStatus {
    NotApplicable => "not_applicable",
    Cleared => "cleared",
    Pending => "pending",
    NotCleared => "not_cleared",
});

/// Cover / remix / sample clearance with its proof document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Clearance {
    pub status: ClearanceStatus,
    pub proof: Option<FileRef>,
}

impl Clearance {
    /// A cleared status needs an uploaded proof document
    pub fn needs_proof(&self) -> bool {
        self.status == ClearanceStatus::Cleared
            && !self.proof.as_ref().is_some_and(FileRef::is_uploaded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplicitContent {
    #[serde(rename = "not-explicit")]
    NotExplicit,
    #[serde(rename = "yes-explicit")]
    YesExplicit,
    #[serde(rename = "clean-version")]
    CleanVersion,
}

string_enum!(ExplicitContent {
    NotExplicit => "not-explicit",
    YesExplicit => "yes-explicit",
    CleanVersion => "clean-version",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildSafeContent {
    #[serde(rename = "yes-child-safe")]
    YesChildSafe,
    #[serde(rename = "no-adult-themes")]
    NoAdultThemes,
}

string_enum!(ChildSafeContent {
    YesChildSafe => "yes-child-safe",
    NoAdultThemes => "no-adult-themes",
});

/// One track slot of a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackData {
    /// 1-based position within the release
    pub track_number: u32,
    pub title: String,
    pub version: String,
    pub isrc: String,
    pub isrc_confirmed: bool,
    pub iswc: String,
    pub iswc_confirmed: bool,
    pub musical_work_title: String,

    pub primary_artists: Vec<Contributor>,
    pub featured_artists: Vec<Contributor>,
    pub session_artists: Vec<Contributor>,
    pub creators: Vec<Contributor>,
    pub producers: Vec<Contributor>,

    pub cover_rights: Clearance,
    pub remix_rights: Clearance,
    pub sample_rights: Clearance,

    pub genres: Vec<String>,
    pub moods: Vec<String>,
    pub languages: Vec<String>,

    pub explicit_content: Option<ExplicitContent>,
    pub child_safe_content: Option<ChildSafeContent>,

    /// Picked on the client, cleared once the upload lands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<LocalFile>,
    pub audio_url: Option<String>,
    pub duration_seconds: Option<u32>,

    pub lyrics_text: String,
    pub lyrics_file: Option<FileRef>,
    pub video_url: Option<String>,
    pub preview_start_seconds: u32,
}

impl TrackData {
    /// Empty slot at position `track_number`
    pub fn placeholder(track_number: u32) -> Self {
        Self {
            track_number,
            ..Default::default()
        }
    }

    pub fn has_audio(&self) -> bool {
        self.audio_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Title plus a confirmed, well-formed ISRC: enough to persist silently
    pub fn ready_for_autosave(&self) -> bool {
        !self.title.trim().is_empty() && self.isrc_confirmed && validate_isrc(&self.isrc)
    }

    /// Everything the tracks step requires of a single track
    pub fn is_complete(&self) -> bool {
        self.ready_for_autosave()
            && self.has_audio()
            && self.primary_artists.iter().any(|a| !a.name.trim().is_empty())
            && !self.cover_rights.needs_proof()
            && !self.remix_rights.needs_proof()
            && !self.sample_rights.needs_proof()
    }

    /// Explicit content forces the child-safe flag to "no"
    pub fn enforce_content_flags(&mut self) {
        if self.explicit_content == Some(ExplicitContent::YesExplicit) {
            self.child_safe_content = Some(ChildSafeContent::NoAdultThemes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_track() -> TrackData {
        let mut track = TrackData::placeholder(1);
        track.title = "First Light".into();
        track.isrc = "USRC17607839".into();
        track.isrc_confirmed = true;
        track.audio_url = Some("/uploads/audio/nova.wav".into());
        track.primary_artists.push(Contributor::named("Nova"));
        track
    }

    #[test]
    fn test_complete_track() {
        assert!(complete_track().is_complete());
        assert!(!TrackData::placeholder(1).is_complete());
    }

    #[test]
    fn test_autosave_readiness_needs_confirmed_isrc() {
        let mut track = complete_track();
        track.isrc_confirmed = false;
        assert!(!track.ready_for_autosave());
        track.isrc_confirmed = true;
        track.isrc = "bad".into();
        assert!(!track.ready_for_autosave());
    }

    #[test]
    fn test_cleared_rights_need_proof() {
        let mut track = complete_track();
        track.sample_rights.status = ClearanceStatus::Cleared;
        assert!(!track.is_complete());
        track.sample_rights.proof = Some(FileRef::Remote("/uploads/proof/sample.pdf".into()));
        assert!(track.is_complete());
    }

    #[test]
    fn test_explicit_forces_child_safe_no() {
        let mut track = complete_track();
        track.child_safe_content = Some(ChildSafeContent::YesChildSafe);
        track.explicit_content = Some(ExplicitContent::YesExplicit);
        track.enforce_content_flags();
        assert_eq!(track.child_safe_content, Some(ChildSafeContent::NoAdultThemes));
    }

    #[test]
    fn test_content_flag_wire_values() {
        let json = serde_json::to_value(ExplicitContent::YesExplicit).unwrap();
        assert_eq!(json, "yes-explicit");
        let json = serde_json::to_value(ChildSafeContent::NoAdultThemes).unwrap();
        assert_eq!(json, "no-adult-themes");
    }
}
