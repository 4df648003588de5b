//! Terms, signature and the pre-submit checklist

use chrono::NaiveDate;

use rdesk_common::model::{ArtistProfile, ReleaseData, SignatoryRole};
use rdesk_common::steps::{is_step_complete, Step};
use rdesk_common::validators::is_valid_email;

use crate::reducer::{ReleaseAction, Term};

pub fn signatory_role_options() -> &'static [SignatoryRole] {
    SignatoryRole::ALL
}

pub fn signatory_role_label(role: SignatoryRole) -> &'static str {
    match role {
        SignatoryRole::Artist => "Artist",
        SignatoryRole::Manager => "Manager",
        SignatoryRole::LabelRepresentative => "Label representative",
        SignatoryRole::LegalGuardian => "Legal guardian",
        SignatoryRole::Other => "Other",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub label: String,
    pub done: bool,
}

impl ChecklistItem {
    fn new(label: impl Into<String>, done: bool) -> Self {
        Self {
            label: label.into(),
            done,
        }
    }
}

/// Every earlier step, then each term, then the signature fields
pub fn checklist(data: &ReleaseData, today: NaiveDate) -> Vec<ChecklistItem> {
    let mut items: Vec<ChecklistItem> = Step::ALL
        .iter()
        .filter(|step| !matches!(step, Step::Guide | Step::Submit))
        .map(|step| ChecklistItem::new(step.title(), is_step_complete(*step, data, today)))
        .collect();

    items.extend(Term::ALL.iter().map(|term| ChecklistItem::new(term.label(), term.is_set(data))));

    items.push(ChecklistItem::new("Signatory role", data.signatory_role.is_some()));
    items.push(ChecklistItem::new(
        "Signature name",
        !data.signature_name.trim().is_empty(),
    ));
    items.push(ChecklistItem::new(
        "Signature email",
        is_valid_email(&data.signature_email),
    ));
    items
}

/// Fill empty signature fields from the artist profile
pub fn prefill_signature(data: &ReleaseData, profile: &ArtistProfile) -> Vec<ReleaseAction> {
    let mut actions = Vec::new();
    if data.signature_name.trim().is_empty() && !profile.artist_name.trim().is_empty() {
        actions.push(ReleaseAction::SetSignatureName(profile.artist_name.clone()));
    }
    if data.signature_email.trim().is_empty() && is_valid_email(&profile.contact_email) {
        actions.push(ReleaseAction::SetSignatureEmail(profile.contact_email.clone()));
    }
    actions
}

/// Tick or clear every term at once
pub fn set_all_terms(value: bool) -> Vec<ReleaseAction> {
    Term::ALL.iter().map(|term| ReleaseAction::SetTerm(*term, value)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::complete_release;
    use crate::reducer::reduce;
    use rdesk_common::steps::is_submission_valid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 3, 1).unwrap()
    }

    #[test]
    fn test_checklist_all_done_for_complete_release() {
        let items = checklist(&complete_release(), today());
        assert_eq!(items.len(), 8 + 6 + 3);
        assert!(items.iter().all(|i| i.done), "{:?}", items);
    }

    #[test]
    fn test_checklist_flags_missing_items() {
        let mut data = complete_release();
        data.cover_artwork = None;
        data.confirm_review = false;
        let missing: Vec<_> = checklist(&data, today()).into_iter().filter(|i| !i.done).collect();
        assert_eq!(missing.len(), 2);
    }

    #[test]
    fn test_prefill_and_terms() {
        let mut profile = ArtistProfile::new("user-1");
        profile.artist_name = "Nova".into();
        profile.contact_email = "nova@example.com".into();

        let data = ReleaseData::new();
        let data = prefill_signature(&data, &profile).into_iter().fold(data, reduce);
        let data = set_all_terms(true).into_iter().fold(data, reduce);
        let data = reduce(data, ReleaseAction::SetSignatoryRole(Some(SignatoryRole::Artist)));
        assert!(is_submission_valid(&data));

        assert!(prefill_signature(&data, &profile).is_empty());
        assert_eq!(signatory_role_options().len(), 5);
    }
}
