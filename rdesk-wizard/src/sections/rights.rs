//! Record label and publisher entries

use rdesk_common::model::{ReleaseData, RightsEntry, TerritoryScope};
use rdesk_common::validators::is_valid_email;

use crate::reducer::ReleaseAction;

/// Which list an edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RightsList {
    RecordLabels,
    Publishers,
}

impl RightsList {
    fn entries(self, data: &ReleaseData) -> &[RightsEntry] {
        match self {
            RightsList::RecordLabels => &data.record_labels,
            RightsList::Publishers => &data.publishers,
        }
    }

    fn is_independent(self, data: &ReleaseData) -> bool {
        match self {
            RightsList::RecordLabels => data.record_label_independent,
            RightsList::Publishers => data.publisher_independent,
        }
    }

    fn replace(self, entries: Vec<RightsEntry>) -> ReleaseAction {
        match self {
            RightsList::RecordLabels => ReleaseAction::SetRecordLabels(entries),
            RightsList::Publishers => ReleaseAction::SetPublishers(entries),
        }
    }

    fn noun(self) -> &'static str {
        match self {
            RightsList::RecordLabels => "record label",
            RightsList::Publishers => "publisher",
        }
    }
}

pub fn add_entry(data: &ReleaseData, list: RightsList, entry: RightsEntry) -> ReleaseAction {
    let mut entries = list.entries(data).to_vec();
    entries.push(entry);
    list.replace(entries)
}

/// Out-of-range indexes leave the list unchanged
pub fn update_entry(
    data: &ReleaseData,
    list: RightsList,
    index: usize,
    edit: impl FnOnce(&mut RightsEntry),
) -> ReleaseAction {
    let mut entries = list.entries(data).to_vec();
    if let Some(entry) = entries.get_mut(index) {
        edit(entry);
    }
    list.replace(entries)
}

pub fn remove_entry(data: &ReleaseData, list: RightsList, index: usize) -> ReleaseAction {
    let mut entries = list.entries(data).to_vec();
    if index < entries.len() {
        entries.remove(index);
    }
    list.replace(entries)
}

/// Toggling "independent" on clears the entry list
pub fn set_independent(list: RightsList, independent: bool) -> Vec<ReleaseAction> {
    let toggle = match list {
        RightsList::RecordLabels => ReleaseAction::SetRecordLabelIndependent(independent),
        RightsList::Publishers => ReleaseAction::SetPublisherIndependent(independent),
    };
    if independent {
        vec![toggle, list.replace(Vec::new())]
    } else {
        vec![toggle]
    }
}

/// Inline messages for one list
pub fn entry_errors(data: &ReleaseData, list: RightsList) -> Vec<String> {
    if list.is_independent(data) {
        return Vec::new();
    }
    let entries = list.entries(data);
    if entries.is_empty() {
        return vec![format!("Add at least one {} or mark yourself independent", list.noun())];
    }

    let mut errors = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let n = i + 1;
        if entry.name.trim().is_empty() {
            errors.push(format!("{} {}: name is required", list.noun(), n));
        }
        if let TerritoryScope::Specific(codes) = &entry.territory_scope {
            if codes.is_empty() {
                errors.push(format!("{} {}: list at least one territory", list.noun(), n));
            }
        }
        if !entry.contact_email.trim().is_empty() && !is_valid_email(&entry.contact_email) {
            errors.push(format!("{} {}: contact email is not valid", list.noun(), n));
        }
    }
    errors
}
