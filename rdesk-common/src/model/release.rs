//! Release draft value object

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::rights::{ContactBlock, RightsEntry};
use super::track::TrackData;
use super::{string_enum, FileRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Single,
    Ep,
    Album,
}

string_enum!(ReleaseType {
    Single => "single",
    Ep => "ep",
    Album => "album",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseVersion {
    #[default]
    Original,
    Remastered,
    Deluxe,
    Expanded,
    Anniversary,
    Live,
    Acoustic,
    Remix,
    Instrumental,
    RadioEdit,
    Extended,
    Clean,
}

string_enum!(ReleaseVersion {
    Original => "original",
    Remastered => "remastered",
    Deluxe => "deluxe",
    Expanded => "expanded",
    Anniversary => "anniversary",
    Live => "live",
    Acoustic => "acoustic",
    Remix => "remix",
    Instrumental => "instrumental",
    RadioEdit => "radio_edit",
    Extended => "extended",
    Clean => "clean",
});

/// Where the release title came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TitleSource {
    #[default]
    Manual,
    Gtin,
}

string_enum!(TitleSource {
    Manual => "manual",
    Gtin => "gtin",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoLiveOption {
    /// Already released elsewhere; date is the original release date
    Past,
    Asap,
    /// Scheduled; date must leave the minimum lead time
    Future,
}

string_enum!(GoLiveOption {
    Past => "past",
    Asap => "asap",
    Future => "future",
});

/// Workflow status; only `draft → pending_review` is driven by the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    #[default]
    Draft,
    PendingReview,
    Published,
    Rejected,
}

string_enum!(ReleaseStatus {
    Draft => "draft",
    PendingReview => "pending_review",
    Published => "published",
    Rejected => "rejected",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatoryRole {
    Artist,
    Manager,
    LabelRepresentative,
    LegalGuardian,
    Other,
}

string_enum!(SignatoryRole {
    Artist => "artist",
    Manager => "manager",
    LabelRepresentative => "label_representative",
    LegalGuardian => "legal_guardian",
    Other => "other",
});

/// One release in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleaseData {
    pub id: Option<Uuid>,
    pub status: ReleaseStatus,
    /// Server write counter; echoed back on save for stale-write detection
    pub revision: i64,

    // Identity
    pub release_title: String,
    pub release_title_confirmed: bool,
    pub release_title_source: TitleSource,
    pub upc: String,
    pub upc_confirmed: bool,
    pub ean: String,
    pub ean_confirmed: bool,
    pub country_of_origin: String,

    // Classification
    pub release_type: Option<ReleaseType>,
    pub track_count: u32,
    pub release_version: ReleaseVersion,

    // Geography
    pub available_home: bool,
    pub available_specific: bool,
    pub available_worldwide: bool,
    pub specific_territories: BTreeSet<String>,

    // Go-live
    pub go_live_option: Option<GoLiveOption>,
    pub go_live_date: Option<NaiveDate>,

    // Rights
    pub record_label_independent: bool,
    pub record_labels: Vec<RightsEntry>,
    pub record_labels_confirmed: bool,
    pub publisher_independent: bool,
    pub publishers: Vec<RightsEntry>,
    pub publishers_confirmed: bool,

    // Royalties
    pub distributor: ContactBlock,
    pub wrote_composition: Option<bool>,
    pub pro: ContactBlock,
    pub mcs: ContactBlock,

    // Artwork
    pub cover_artwork: Option<FileRef>,
    pub cover_caption: String,

    // Terms and signature
    pub terms_distribution: bool,
    pub terms_rights: bool,
    pub terms_privacy: bool,
    pub confirm_accuracy: bool,
    pub confirm_ownership: bool,
    pub confirm_review: bool,
    pub signatory_role: Option<SignatoryRole>,
    pub signature_name: String,
    pub signature_email: String,

    pub tracks: Vec<TrackData>,
}

impl ReleaseData {
    /// Empty draft for a new release: one placeholder track
    pub fn new() -> Self {
        Self {
            track_count: 1,
            tracks: vec![TrackData::placeholder(1)],
            ..Default::default()
        }
    }

    /// Confirmed barcode, EAN preferred when both are confirmed
    pub fn confirmed_gtin(&self) -> Option<&str> {
        if self.ean_confirmed && !self.ean.is_empty() {
            Some(&self.ean)
        } else if self.upc_confirmed && !self.upc.is_empty() {
            Some(&self.upc)
        } else {
            None
        }
    }

    /// Resize `tracks` to `track_count`, keeping existing entries
    pub fn sync_track_slots(&mut self) {
        let wanted = self.track_count.max(1) as usize;
        if self.tracks.len() > wanted {
            self.tracks.truncate(wanted);
        }
        while self.tracks.len() < wanted {
            let number = self.tracks.len() as u32 + 1;
            self.tracks.push(TrackData::placeholder(number));
        }
        for (i, track) in self.tracks.iter_mut().enumerate() {
            track.track_number = i as u32 + 1;
        }
    }

    /// Worldwide availability includes the home territory, and explicit
    /// tracks are never child-safe
    pub fn enforce_flags(&mut self) {
        if self.available_worldwide {
            self.available_home = true;
        }
        for track in &mut self.tracks {
            track.enforce_content_flags();
        }
    }

    /// Total known running time across tracks, in seconds
    pub fn total_duration_seconds(&self) -> u32 {
        self.tracks.iter().filter_map(|t| t.duration_seconds).sum()
    }

    pub fn cover_artwork_url(&self) -> Option<&str> {
        self.cover_artwork.as_ref().and_then(FileRef::url)
    }
}
