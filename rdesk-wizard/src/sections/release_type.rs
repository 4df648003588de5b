//! Release type and track count options
//!
//! Industry convention: a single has 1–3 tracks and runs under 30 minutes,
//! an EP 4–6 tracks under 30 minutes, an album 7+ tracks or 30+ minutes.
//! The form only offers matching track counts; nothing re-checks it later.

use std::ops::RangeInclusive;

use rdesk_common::model::{ReleaseData, ReleaseType, ReleaseVersion};

use crate::reducer::ReleaseAction;

/// Running time at which a release counts as an album
pub const ALBUM_MIN_SECONDS: u32 = 30 * 60;
/// Largest track count offered for an album
pub const MAX_ALBUM_TRACKS: u32 = 50;

/// Track counts offered for `release_type`
pub fn track_count_options(release_type: ReleaseType) -> RangeInclusive<u32> {
    match release_type {
        ReleaseType::Single => 1..=3,
        ReleaseType::Ep => 4..=6,
        ReleaseType::Album => 1..=MAX_ALBUM_TRACKS,
    }
}

/// Type implied by track count and total running time
pub fn classify(track_count: u32, total_seconds: u32) -> ReleaseType {
    if track_count >= 7 || total_seconds >= ALBUM_MIN_SECONDS {
        ReleaseType::Album
    } else if track_count >= 4 {
        ReleaseType::Ep
    } else {
        ReleaseType::Single
    }
}

/// Whether the draft's type agrees with its tracks, when both are known
pub fn type_matches_tracks(data: &ReleaseData) -> bool {
    match data.release_type {
        Some(release_type) => {
            classify(data.track_count, data.total_duration_seconds()) == release_type
        }
        None => true,
    }
}

pub fn release_version_options() -> &'static [ReleaseVersion] {
    ReleaseVersion::ALL
}

pub fn release_version_label(version: ReleaseVersion) -> &'static str {
    match version {
        ReleaseVersion::Original => "Original",
        ReleaseVersion::Remastered => "Remastered",
        ReleaseVersion::Deluxe => "Deluxe",
        ReleaseVersion::Expanded => "Expanded",
        ReleaseVersion::Anniversary => "Anniversary",
        ReleaseVersion::Live => "Live",
        ReleaseVersion::Acoustic => "Acoustic",
        ReleaseVersion::Remix => "Remix",
        ReleaseVersion::Instrumental => "Instrumental",
        ReleaseVersion::RadioEdit => "Radio Edit",
        ReleaseVersion::Extended => "Extended",
        ReleaseVersion::Clean => "Clean",
    }
}

/// Selecting a type also snaps the track count into the offered range
pub fn select_type(data: &ReleaseData, release_type: ReleaseType) -> Vec<ReleaseAction> {
    let range = track_count_options(release_type);
    let count = data.track_count.clamp(*range.start(), *range.end());
    let mut actions = vec![ReleaseAction::SetReleaseType(Some(release_type))];
    if count != data.track_count {
        actions.push(ReleaseAction::SetTrackCount(count));
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::reduce;

    #[test]
    fn test_track_count_ranges() {
        assert_eq!(track_count_options(ReleaseType::Single), 1..=3);
        assert_eq!(track_count_options(ReleaseType::Ep), 4..=6);
        assert!(track_count_options(ReleaseType::Album).contains(&12));
    }

    #[test]
    fn test_classify_by_count_and_length() {
        assert_eq!(classify(2, 8 * 60), ReleaseType::Single);
        assert_eq!(classify(5, 20 * 60), ReleaseType::Ep);
        assert_eq!(classify(7, 20 * 60), ReleaseType::Album);
        assert_eq!(classify(3, 31 * 60), ReleaseType::Album);
    }

    #[test]
    fn test_select_type_snaps_track_count() {
        let data = ReleaseData::new();
        let actions = select_type(&data, ReleaseType::Ep);
        let data = actions.into_iter().fold(data, reduce);
        assert_eq!(data.release_type, Some(ReleaseType::Ep));
        assert_eq!(data.track_count, 4);
        assert_eq!(data.tracks.len(), 4);

        let actions = select_type(&data, ReleaseType::Album);
        assert_eq!(actions.len(), 1, "4 tracks is already a valid album count");
    }

    #[test]
    fn test_version_options_cover_every_version() {
        assert_eq!(release_version_options().len(), 12);
        assert_eq!(release_version_label(ReleaseVersion::RadioEdit), "Radio Edit");
    }
}
