//! Status-string canonicalization for artist profile fields
//!
//! Profile forms collect label, management and booking status as free text.
//! Each normalizer lower-cases and trims its input, maps known synonyms to a
//! canonical value, and passes anything unrecognized through unchanged
//! (lower-cased and trimmed). Empty input normalizes to `None`.

/// Canonical label (contact) status values
pub mod contact {
    pub const SIGNED: &str = "signed";
    pub const INDEPENDENT: &str = "independent";
    pub const SEEKING: &str = "seeking";
}

/// Canonical management status values
pub mod manager {
    pub const MANAGED: &str = "managed";
    pub const SELF_MANAGED: &str = "self_managed";
    pub const SEEKING: &str = "seeking";
    pub const NONE: &str = "none";
}

/// Canonical booking status values
pub mod booking {
    pub const AGENT: &str = "agent";
    pub const SELF_BOOKED: &str = "self_booked";
    pub const SEEKING: &str = "seeking";
    pub const NONE: &str = "none";
}

type SynonymTable = &'static [(&'static str, &'static [&'static str])];

const CONTACT_SYNONYMS: SynonymTable = &[
    (
        contact::SIGNED,
        &["signed", "signed to label", "signed to a label", "label", "on a label", "label signed"],
    ),
    (
        contact::INDEPENDENT,
        &["independent", "indie", "unsigned", "not signed", "self-released", "self released"],
    ),
    (
        contact::SEEKING,
        &["seeking", "seeking label", "looking for label", "looking for a label", "open to offers"],
    ),
];

const MANAGER_SYNONYMS: SynonymTable = &[
    (
        manager::MANAGED,
        &["managed", "has manager", "has a manager", "with manager", "signed to management"],
    ),
    (
        manager::SELF_MANAGED,
        &["self_managed", "self-managed", "self managed", "diy", "manage myself"],
    ),
    (
        manager::SEEKING,
        &[
            "seeking",
            "seeking management",
            "seeking manager",
            "looking for management",
            "looking for a manager",
        ],
    ),
    (manager::NONE, &["none", "no manager", "unmanaged", "no management", "n/a"]),
];

const BOOKING_SYNONYMS: SynonymTable = &[
    (
        booking::AGENT,
        &["agent", "booking agent", "has agent", "has an agent", "agency", "represented"],
    ),
    (
        booking::SELF_BOOKED,
        &["self_booked", "self-booked", "self booked", "book myself", "diy"],
    ),
    (
        booking::SEEKING,
        &[
            "seeking",
            "seeking agent",
            "seeking booking",
            "looking for an agent",
            "looking for booking",
        ],
    ),
    (booking::NONE, &["none", "no agent", "no booking", "n/a"]),
];

fn normalize_with(input: &str, table: SynonymTable) -> Option<String> {
    let value = input.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }

    let canonical = table
        .iter()
        .find(|(_, synonyms)| synonyms.contains(&value.as_str()))
        .map(|(canonical, _)| (*canonical).to_string());

    Some(canonical.unwrap_or(value))
}

/// Label status: "Signed to Label" → `signed`, "unsigned" → `independent`, ...
pub fn normalize_contact_status(input: &str) -> Option<String> {
    normalize_with(input, CONTACT_SYNONYMS)
}

/// Management status: "self-managed" → `self_managed`, ...
pub fn normalize_manager_status(input: &str) -> Option<String> {
    normalize_with(input, MANAGER_SYNONYMS)
}

/// Booking status: "booking agent" → `agent`, ...
pub fn normalize_booking_status(input: &str) -> Option<String> {
    normalize_with(input, BOOKING_SYNONYMS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_table(table: SynonymTable, f: fn(&str) -> Option<String>) {
        for (canonical, synonyms) in table {
            for synonym in *synonyms {
                assert_eq!(f(synonym).as_deref(), Some(*canonical), "synonym {synonym:?}");
                let shouted = format!("  {}  ", synonym.to_uppercase());
                assert_eq!(f(&shouted).as_deref(), Some(*canonical), "synonym {shouted:?}");
            }
        }
    }

    #[test]
    fn test_every_contact_synonym_maps() {
        assert_table(CONTACT_SYNONYMS, normalize_contact_status);
    }

    #[test]
    fn test_every_manager_synonym_maps() {
        assert_table(MANAGER_SYNONYMS, normalize_manager_status);
    }

    #[test]
    fn test_every_booking_synonym_maps() {
        assert_table(BOOKING_SYNONYMS, normalize_booking_status);
    }

    #[test]
    fn test_common_phrasings() {
        assert_eq!(normalize_contact_status("Signed to Label").as_deref(), Some("signed"));
        assert_eq!(normalize_manager_status("self-managed").as_deref(), Some("self_managed"));
    }

    #[test]
    fn test_unrecognized_passes_through() {
        assert_eq!(
            normalize_contact_status("  Distribution Deal ").as_deref(),
            Some("distribution deal")
        );
        assert_eq!(normalize_manager_status("Co-Managed").as_deref(), Some("co-managed"));
        assert_eq!(normalize_booking_status("Festival Only").as_deref(), Some("festival only"));
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(normalize_contact_status(""), None);
        assert_eq!(normalize_manager_status("   "), None);
        assert_eq!(normalize_booking_status("\t"), None);
    }
}
