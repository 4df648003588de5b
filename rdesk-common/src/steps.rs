//! Wizard steps and their completion predicates
//!
//! The predicates are pure functions of a [`ReleaseData`] snapshot and the
//! current date. The wizard uses them to gate navigation; the API reuses
//! [`is_submission_valid`] when a release is submitted for review.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{GoLiveOption, ReleaseData};
use crate::validators::{is_valid_email, validate_gtin};

/// Minimum lead time for a scheduled go-live date
pub const MIN_FUTURE_LEAD_DAYS: i64 = 14;

/// The ten wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Guide,
    Registration,
    Type,
    Geography,
    Date,
    Rights,
    Royalties,
    Artwork,
    Tracks,
    Submit,
}

impl Step {
    pub const ALL: [Step; 10] = [
        Step::Guide,
        Step::Registration,
        Step::Type,
        Step::Geography,
        Step::Date,
        Step::Rights,
        Step::Royalties,
        Step::Artwork,
        Step::Tracks,
        Step::Submit,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Step> {
        Step::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Step> {
        Step::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Step> {
        self.index().checked_sub(1).and_then(Step::from_index)
    }

    pub fn is_first(self) -> bool {
        self == Step::Guide
    }

    pub fn is_last(self) -> bool {
        self == Step::Submit
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Guide => "guide",
            Step::Registration => "registration",
            Step::Type => "type",
            Step::Geography => "geography",
            Step::Date => "date",
            Step::Rights => "rights",
            Step::Royalties => "royalties",
            Step::Artwork => "artwork",
            Step::Tracks => "tracks",
            Step::Submit => "submit",
        }
    }

    /// Heading shown in the step indicator
    pub fn title(self) -> &'static str {
        match self {
            Step::Guide => "Before you start",
            Step::Registration => "Release registration",
            Step::Type => "Release type",
            Step::Geography => "Territories",
            Step::Date => "Go-live date",
            Step::Rights => "Rights holders",
            Step::Royalties => "Royalties",
            Step::Artwork => "Artwork",
            Step::Tracks => "Tracks",
            Step::Submit => "Terms and signature",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Earliest acceptable date for a `future` go-live
pub fn earliest_future_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(MIN_FUTURE_LEAD_DAYS)
}

/// Whether `step` is complete for `data` as of `today`
pub fn is_step_complete(step: Step, data: &ReleaseData, today: NaiveDate) -> bool {
    match step {
        Step::Guide => true,
        Step::Registration => registration_complete(data),
        Step::Type => data.release_type.is_some() && data.track_count >= 1,
        Step::Geography => geography_complete(data),
        Step::Date => date_complete(data, today),
        Step::Rights => rights_complete(data),
        Step::Royalties => royalties_complete(data),
        Step::Artwork => data.cover_artwork_url().is_some(),
        Step::Tracks => tracks_complete(data),
        Step::Submit => is_submission_valid(data),
    }
}

fn registration_complete(data: &ReleaseData) -> bool {
    data.release_title_confirmed && (data.upc_confirmed || data.ean_confirmed)
}

fn geography_complete(data: &ReleaseData) -> bool {
    if data.available_specific && data.specific_territories.is_empty() {
        return false;
    }
    data.available_home || data.available_worldwide || data.available_specific
}

fn date_complete(data: &ReleaseData, today: NaiveDate) -> bool {
    match (data.go_live_option, data.go_live_date) {
        (None, _) => false,
        (Some(GoLiveOption::Asap), _) => true,
        (Some(GoLiveOption::Past), Some(date)) => date <= today,
        (Some(GoLiveOption::Future), Some(date)) => date >= earliest_future_date(today),
        (Some(_), None) => false,
    }
}

fn rights_complete(data: &ReleaseData) -> bool {
    let labels_ok = data.record_label_independent
        || (!data.record_labels.is_empty() && data.record_labels.iter().all(|e| e.is_complete()));
    let publishers_ok = data.publisher_independent
        || (!data.publishers.is_empty() && data.publishers.iter().all(|e| e.is_complete()));
    data.record_labels_confirmed && data.publishers_confirmed && labels_ok && publishers_ok
}

fn royalties_complete(data: &ReleaseData) -> bool {
    if !data.distributor.is_complete() {
        return false;
    }
    match data.wrote_composition {
        None => false,
        Some(false) => true,
        Some(true) => data.pro.is_complete() && data.mcs.is_complete(),
    }
}

fn tracks_complete(data: &ReleaseData) -> bool {
    data.track_count >= 1
        && data.tracks.len() == data.track_count as usize
        && data.tracks.iter().all(|t| t.is_complete())
}

/// Stricter predicate gating the final submit action
pub fn is_submission_valid(data: &ReleaseData) -> bool {
    data.terms_distribution
        && data.terms_rights
        && data.terms_privacy
        && data.confirm_accuracy
        && data.confirm_ownership
        && data.confirm_review
        && data.signatory_role.is_some()
        && !data.signature_name.trim().is_empty()
        && is_valid_email(&data.signature_email)
}

/// Reasons a submission is refused, in step order
///
/// Used server-side to re-validate a `pending_review` snapshot.
pub fn submission_problems(data: &ReleaseData, today: NaiveDate) -> Vec<String> {
    let mut problems: Vec<String> = Step::ALL
        .iter()
        .filter(|step| !is_step_complete(**step, data, today))
        .map(|step| format!("step '{}' is incomplete", step))
        .collect();

    for (label, code, confirmed) in [
        ("UPC", &data.upc, data.upc_confirmed),
        ("EAN", &data.ean, data.ean_confirmed),
    ] {
        if confirmed {
            let check = validate_gtin(code);
            if !check.valid {
                problems.push(format!(
                    "{} {}: {}",
                    label,
                    code,
                    check.error.unwrap_or_default()
                ));
            }
        }
    }

    problems
}

/// First step that is not complete, or `Submit` when all are
pub fn first_incomplete_step(data: &ReleaseData, today: NaiveDate) -> Step {
    Step::ALL
        .iter()
        .copied()
        .find(|step| !is_step_complete(*step, data, today))
        .unwrap_or(Step::Submit)
}
