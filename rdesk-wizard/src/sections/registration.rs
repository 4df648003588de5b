//! Release registration: title and barcode, with GTIN lookup
//!
//! Typing into the barcode field feeds [`GtinLookupFlow`]. Once the digits
//! reach UPC or EAN length a 1000 ms debounce starts; when it fires the code
//! is validated locally and, if valid, looked up. A hit pre-fills title,
//! type, track count and country. Any miss or failure falls back to manual
//! entry and never blocks the user.

use std::time::{Duration, Instant};
use tracing::{debug, warn};

use rdesk_common::config::DEFAULT_LOOKUP_DEBOUNCE_MS;
use rdesk_common::model::{GtinLookup, TitleSource};
use rdesk_common::validators::{strip_non_digits, validate_gtin, GtinKind};

use crate::autosave::Debouncer;
use crate::client::ReleaseBackend;
use crate::reducer::ReleaseAction;

/// What the registration form should show after a lookup attempt
#[derive(Debug, Clone, PartialEq)]
pub enum GtinOutcome {
    /// Local validation failed; shown inline, no lookup made
    Invalid(String),
    /// Metadata found; apply the actions to pre-fill the form
    Found {
        lookup: GtinLookup,
        actions: Vec<ReleaseAction>,
    },
    /// Not found or service unavailable; the user enters details by hand
    ManualEntry(String),
}

/// Debounced GTIN lookup state for the barcode field
#[derive(Debug, Clone)]
pub struct GtinLookupFlow {
    debouncer: Debouncer,
    pending: Option<String>,
}

impl Default for GtinLookupFlow {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_LOOKUP_DEBOUNCE_MS))
    }
}

impl GtinLookupFlow {
    pub fn new(window: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(window),
            pending: None,
        }
    }

    /// Keystroke in the barcode field
    ///
    /// Arms the debounce only when the stripped input has UPC or EAN length;
    /// any other length cancels a pending lookup.
    pub fn on_input(&mut self, raw: &str, now: Instant) {
        let digits = strip_non_digits(raw);
        if GtinKind::from_len(digits.len()).is_some() {
            self.pending = Some(digits);
            self.debouncer.touch(now);
        } else {
            self.pending = None;
            self.debouncer.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Code ready for lookup once the input has been idle long enough
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        if self.debouncer.take_due(now) {
            self.pending.take()
        } else {
            None
        }
    }
}

/// Validate `code` and look it up
pub async fn run_gtin_lookup(backend: &dyn ReleaseBackend, code: &str) -> GtinOutcome {
    let check = validate_gtin(code);
    if !check.valid {
        return GtinOutcome::Invalid(check.error.unwrap_or_else(|| "Invalid barcode".into()));
    }

    let digits = strip_non_digits(code);
    match backend.lookup_gtin(&digits).await {
        Ok(lookup) if lookup.found => {
            debug!(gtin = %digits, "GTIN lookup hit");
            let actions = prefill_actions(&lookup);
            GtinOutcome::Found { lookup, actions }
        }
        Ok(_) => GtinOutcome::ManualEntry(
            "We couldn't find this barcode. Please enter the release details manually.".into(),
        ),
        Err(e) => {
            warn!(gtin = %digits, "GTIN lookup failed: {}", e);
            GtinOutcome::ManualEntry(
                "Barcode lookup is unavailable right now. \
                 Please enter the release details manually."
                    .into(),
            )
        }
    }
}

/// Actions that pre-fill the form from lookup metadata
pub fn prefill_actions(lookup: &GtinLookup) -> Vec<ReleaseAction> {
    let mut actions = Vec::new();
    if let Some(title) = lookup.title.as_deref().filter(|t| !t.trim().is_empty()) {
        actions.push(ReleaseAction::SetReleaseTitle(title.trim().to_string()));
        actions.push(ReleaseAction::SetTitleSource(TitleSource::Gtin));
    }
    if let Some(release_type) = lookup.release_type {
        actions.push(ReleaseAction::SetReleaseType(Some(release_type)));
    }
    if let Some(count) = lookup.track_count.filter(|c| *c > 0) {
        actions.push(ReleaseAction::SetTrackCount(count));
    }
    if let Some(country) = lookup.country.as_deref().filter(|c| !c.trim().is_empty()) {
        actions.push(ReleaseAction::SetCountryOfOrigin(country.to_string()));
    }
    actions
}

/// Field action for a barcode edit, routed by digit count (13 → EAN, else UPC)
pub fn barcode_action(raw: &str) -> ReleaseAction {
    let digits = strip_non_digits(raw);
    if GtinKind::from_len(digits.len()) == Some(GtinKind::Ean) {
        ReleaseAction::SetEan(digits)
    } else {
        ReleaseAction::SetUpc(digits)
    }
}
