//! Lenient field coercion for JSON payloads
//!
//! Browsers post form state with stringly-typed values: `"3"` for a track
//! count, `"true"` for a checkbox, `""` for an unset option. Payloads are
//! normalized in place before typed deserialization so those still parse.
//! Nulls are dropped so defaulted fields fall back to their defaults.

use serde_json::{Map, Number, Value};

const BOOL_KEYS: &[&str] = &[
    "availableHome",
    "availableSpecific",
    "availableWorldwide",
    "confirmAccuracy",
    "confirmOwnership",
    "confirmReview",
    "confirmed",
    "eanConfirmed",
    "isrcConfirmed",
    "iswcConfirmed",
    "publisherIndependent",
    "publishersConfirmed",
    "recordLabelIndependent",
    "recordLabelsConfirmed",
    "releaseTitleConfirmed",
    "termsDistribution",
    "termsPrivacy",
    "termsRights",
    "upcConfirmed",
    "wroteComposition",
];

const INT_KEYS: &[&str] = &[
    "durationSeconds",
    "previewStartSeconds",
    "revision",
    "trackCount",
    "trackNumber",
];

/// Optional fields where an empty string means "not set"
const EMPTY_AS_UNSET_KEYS: &[&str] = &[
    "audioUrl",
    "childSafeContent",
    "coverArtwork",
    "explicitContent",
    "goLiveDate",
    "goLiveOption",
    "id",
    "ipiCae",
    "lyricsFile",
    "releaseType",
    "releaseId",
    "signatoryRole",
    "videoUrl",
    "wroteComposition",
];

/// Normalize `value` in place, recursing into objects and arrays
pub fn coerce_payload(value: &mut Value) {
    match value {
        Value::Object(map) => coerce_object(map),
        Value::Array(items) => items.iter_mut().for_each(coerce_payload),
        _ => {}
    }
}

fn coerce_object(map: &mut Map<String, Value>) {
    map.retain(|key, value| {
        if value.is_null() {
            return false;
        }
        if EMPTY_AS_UNSET_KEYS.contains(&key.as_str()) {
            if let Value::String(s) = value {
                if s.trim().is_empty() {
                    return false;
                }
            }
        }
        true
    });

    for (key, value) in map.iter_mut() {
        if BOOL_KEYS.contains(&key.as_str()) {
            if let Some(b) = parse_bool(value) {
                *value = Value::Bool(b);
            }
        } else if INT_KEYS.contains(&key.as_str()) {
            if let Some(n) = parse_int(value) {
                *value = Value::Number(Number::from(n));
            }
        } else {
            coerce_payload(value);
        }
    }
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Whole, non-negative numbers only; anything else is left for serde to reject
fn parse_int(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdesk_common::model::ReleaseData;
    use serde_json::json;

    #[test]
    fn test_form_strings_become_typed_values() {
        let mut payload = json!({
            "id": "",
            "releaseTitle": "Night Drive",
            "releaseTitleConfirmed": "true",
            "trackCount": "2",
            "revision": 3.0,
            "availableWorldwide": "on",
            "releaseType": "",
            "recordLabels": null,
            "distributor": {"name": "Fresh Tunes", "confirmed": "1"},
            "tracks": [
                {"trackNumber": "1", "title": "One", "isrcConfirmed": "false"},
                {"trackNumber": 2, "title": "Two", "durationSeconds": "185"}
            ]
        });
        coerce_payload(&mut payload);

        let release: ReleaseData = serde_json::from_value(payload).unwrap();
        assert_eq!(release.id, None);
        assert!(release.release_title_confirmed);
        assert_eq!(release.track_count, 2);
        assert_eq!(release.revision, 3);
        assert!(release.available_worldwide);
        assert_eq!(release.release_type, None);
        assert!(release.record_labels.is_empty());
        assert!(release.distributor.confirmed);
        assert_eq!(release.tracks[0].track_number, 1);
        assert!(!release.tracks[0].isrc_confirmed);
        assert_eq!(release.tracks[1].duration_seconds, Some(185));
    }

    #[test]
    fn test_unparseable_values_are_left_alone() {
        let mut payload = json!({"trackCount": "lots", "upcConfirmed": "maybe", "revision": -1});
        coerce_payload(&mut payload);
        assert_eq!(payload["trackCount"], "lots");
        assert_eq!(payload["upcConfirmed"], "maybe");
        assert_eq!(payload["revision"], -1);
    }
}
