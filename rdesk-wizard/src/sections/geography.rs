//! Availability: home market, worldwide, or a list of territories

use rdesk_common::model::ReleaseData;

use crate::reducer::ReleaseAction;

/// ISO 3166-1 alpha-2 shape check (two ASCII letters)
pub fn normalize_territory(code: &str) -> Option<String> {
    let code = code.trim().to_ascii_uppercase();
    (code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase())).then_some(code)
}

/// Parse a comma/space separated list, dropping malformed entries
///
/// Returns the accepted codes and the rejected raw entries.
pub fn parse_territory_list(input: &str) -> (Vec<String>, Vec<String>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for raw in input.split([',', ' ', ';']).filter(|s| !s.trim().is_empty()) {
        match normalize_territory(raw) {
            Some(code) if !accepted.contains(&code) => accepted.push(code),
            Some(_) => {}
            None => rejected.push(raw.trim().to_string()),
        }
    }
    (accepted, rejected)
}

pub fn add_territories(input: &str) -> Vec<ReleaseAction> {
    let (codes, _) = parse_territory_list(input);
    codes.into_iter().map(ReleaseAction::AddTerritory).collect()
}

/// Inline message for the geography step, if any
pub fn geography_error(data: &ReleaseData) -> Option<&'static str> {
    if data.available_specific && data.specific_territories.is_empty() {
        Some("Add at least one territory")
    } else if !(data.available_home || data.available_specific || data.available_worldwide) {
        Some("Choose where this release should be available")
    } else {
        None
    }
}

/// Home toggle is locked on while worldwide is selected
pub fn home_locked(data: &ReleaseData) -> bool {
    data.available_worldwide
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::reduce;

    #[test]
    fn test_parse_territory_list() {
        let (ok, bad) = parse_territory_list("gb, FR;de  usa, gb");
        assert_eq!(ok, vec!["GB", "FR", "DE"]);
        assert_eq!(bad, vec!["usa"]);
    }

    #[test]
    fn test_specific_needs_a_territory() {
        let data = reduce(ReleaseData::new(), ReleaseAction::SetAvailableSpecific(true));
        assert_eq!(geography_error(&data), Some("Add at least one territory"));

        let data = add_territories("fr").into_iter().fold(data, reduce);
        assert_eq!(geography_error(&data), None);
    }

    #[test]
    fn test_nothing_selected() {
        assert!(geography_error(&ReleaseData::new()).is_some());
        let data = reduce(ReleaseData::new(), ReleaseAction::SetAvailableWorldwide(true));
        assert!(home_locked(&data));
        assert_eq!(geography_error(&data), None);
    }
}
