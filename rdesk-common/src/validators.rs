//! Identifier and field format validators
//!
//! GTIN (UPC/EAN) checksum arithmetic follows the GS1 mod-10 scheme. ISRC and
//! ISWC checks are format-only apart from the ISWC check digit. All functions
//! are total: malformed input yields `false` or an error value, never a panic.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// UPC-A digit count
pub const UPC_LENGTH: usize = 12;
/// EAN-13 digit count
pub const EAN_LENGTH: usize = 13;
/// ISRC character count once hyphens are removed
pub const ISRC_LENGTH: usize = 12;
/// Upper bound for a single audio upload (2 GiB)
pub const MAX_AUDIO_UPLOAD_BYTES: u64 = 2 * 1024 * 1024 * 1024;
/// Upper bound for artwork, proof documents and lyrics files
pub const MAX_DOCUMENT_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

static ISRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{3}[0-9]{7}$").expect("static ISRC pattern"));

static ISWC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^T[0-9]{10}$").expect("static ISWC pattern"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern")
});

static AUDIO_FILENAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^.+ - .+\.(wav|aiff|aif)$").expect("static audio filename pattern")
});

/// Which barcode family a code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GtinKind {
    Upc,
    Ean,
}

impl GtinKind {
    /// Classify by digit count; `None` for any other length
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            UPC_LENGTH => Some(GtinKind::Upc),
            EAN_LENGTH => Some(GtinKind::Ean),
            _ => None,
        }
    }

    pub fn digit_count(self) -> usize {
        match self {
            GtinKind::Upc => UPC_LENGTH,
            GtinKind::Ean => EAN_LENGTH,
        }
    }
}

/// Result of [`validate_gtin`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GtinValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<GtinKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GtinValidation {
    fn ok(kind: GtinKind) -> Self {
        Self {
            valid: true,
            kind: Some(kind),
            error: None,
        }
    }

    fn fail(kind: Option<GtinKind>, error: impl Into<String>) -> Self {
        Self {
            valid: false,
            kind,
            error: Some(error.into()),
        }
    }
}

/// Keep only ASCII digits
pub fn strip_non_digits(code: &str) -> String {
    code.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// GS1 check digit over the payload digits (everything but the check digit)
fn gs1_check_digit(payload: &[u32]) -> u32 {
    let sum: u32 = payload
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();
    (10 - sum % 10) % 10
}

/// Verify the GS1 mod-10 check digit of a 12- or 13-digit code
///
/// Non-digit characters are ignored, so `"0-36000-29145-2"` is accepted.
pub fn validate_gtin_checksum(code: &str) -> bool {
    let digits: Vec<u32> = code.chars().filter_map(|c| c.to_digit(10)).collect();
    if GtinKind::from_len(digits.len()).is_none() {
        return false;
    }
    let (payload, check) = digits.split_at(digits.len() - 1);
    gs1_check_digit(payload) == check[0]
}

/// Full GTIN validation with a human-readable reason on failure
pub fn validate_gtin(code: &str) -> GtinValidation {
    let cleaned = strip_non_digits(code);
    if cleaned.is_empty() {
        return GtinValidation::fail(None, "GTIN is required");
    }

    let Some(kind) = GtinKind::from_len(cleaned.len()) else {
        return GtinValidation::fail(
            None,
            format!(
                "GTIN must be 12 digits (UPC) or 13 digits (EAN), got {}",
                cleaned.len()
            ),
        );
    };

    if !validate_gtin_checksum(&cleaned) {
        return GtinValidation::fail(
            Some(kind),
            "Invalid check digit: this barcode does not pass the GS1 checksum",
        );
    }

    GtinValidation::ok(kind)
}

/// Insert display hyphens: UPC 1-5-5-1, EAN 1-6-6
///
/// Purely cosmetic. Codes of any other length are returned digits-only.
pub fn format_gtin(code: &str) -> String {
    let d = strip_non_digits(code);
    match GtinKind::from_len(d.len()) {
        Some(GtinKind::Upc) => format!("{}-{}-{}-{}", &d[0..1], &d[1..6], &d[6..11], &d[11..12]),
        Some(GtinKind::Ean) => format!("{}-{}-{}", &d[0..1], &d[1..7], &d[7..13]),
        None => d,
    }
}

/// Uppercase and remove hyphens/whitespace from an ISRC
pub fn clean_isrc(code: &str) -> String {
    code.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// ISRC format: 2-letter country, 3 alphanumeric registrant, 2-digit year,
/// 5-digit designation
pub fn validate_isrc(code: &str) -> bool {
    let cleaned = clean_isrc(code);
    cleaned.len() == ISRC_LENGTH && ISRC_RE.is_match(&cleaned)
}

/// Display form `CC-XXX-YY-NNNNN`; unchanged cleaned value when malformed
pub fn format_isrc(code: &str) -> String {
    let c = clean_isrc(code);
    if !validate_isrc(&c) {
        return c;
    }
    format!("{}-{}-{}-{}", &c[0..2], &c[2..5], &c[5..7], &c[7..12])
}

/// Uppercase and remove ISWC punctuation (`T-123.456.789-0`)
pub fn clean_iswc(code: &str) -> String {
    code.chars()
        .filter(|c| !matches!(c, '-' | '.') && !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// ISWC: `T`, nine work digits, one check digit
///
/// Check digit = `(10 - (1 + Σ i·dᵢ) mod 10) mod 10` for i = 1..9.
pub fn validate_iswc(code: &str) -> bool {
    let cleaned = clean_iswc(code);
    if !ISWC_RE.is_match(&cleaned) {
        return false;
    }
    let digits: Vec<u32> = cleaned[1..].chars().filter_map(|c| c.to_digit(10)).collect();
    let weighted: u32 = digits[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| (i as u32 + 1) * d)
        .sum();
    (10 - (1 + weighted) % 10) % 10 == digits[9]
}

/// Syntactic email check used for signatures and contact blocks
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Reasons an audio file is refused before upload starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioFileError {
    BadFilename(String),
    TooLarge { size: u64, max: u64 },
}

impl std::fmt::Display for AudioFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioFileError::BadFilename(name) => write!(
                f,
                "\"{}\" must be named \"Artist - Title\" with a .wav, .aiff or .aif extension",
                name
            ),
            AudioFileError::TooLarge { size, max } => write!(
                f,
                "File is {} bytes, larger than the {} byte limit",
                size, max
            ),
        }
    }
}

impl std::error::Error for AudioFileError {}

/// `"<Artist> - <Title>.<wav|aiff|aif>"`, case-insensitive
pub fn is_valid_audio_filename(filename: &str) -> bool {
    AUDIO_FILENAME_RE.is_match(filename)
}

/// Check filename contract and size cap for an audio upload
pub fn validate_audio_file(filename: &str, size: u64) -> Result<(), AudioFileError> {
    if !is_valid_audio_filename(filename) {
        return Err(AudioFileError::BadFilename(filename.to_string()));
    }
    if size > MAX_AUDIO_UPLOAD_BYTES {
        return Err(AudioFileError::TooLarge {
            size,
            max: MAX_AUDIO_UPLOAD_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gtin_checksum_known_upc() {
        assert!(validate_gtin_checksum("036000291452"));
        assert!(!validate_gtin_checksum("036000291453"));
    }

    #[test]
    fn test_gtin_checksum_known_ean() {
        assert!(validate_gtin_checksum("4006381333931"));
        assert!(validate_gtin_checksum("5901234123457"));
        assert!(!validate_gtin_checksum("5901234123458"));
    }

    #[test]
    fn test_gtin_checksum_ignores_separators() {
        assert!(validate_gtin_checksum("0-36000-29145-2"));
        assert!(validate_gtin_checksum(" 036000 291452 "));
    }

    #[test]
    fn test_gtin_checksum_rejects_wrong_lengths() {
        assert!(!validate_gtin_checksum(""));
        assert!(!validate_gtin_checksum("12345"));
        assert!(!validate_gtin_checksum("00000000000000"));
    }

    #[test]
    fn test_validate_gtin_empty() {
        let v = validate_gtin("");
        assert!(!v.valid);
        assert_eq!(v.error.as_deref(), Some("GTIN is required"));
    }

    #[test]
    fn test_validate_gtin_wrong_length() {
        let v = validate_gtin("12345");
        assert!(!v.valid);
        assert!(v.error.unwrap().contains("got 5"));
    }

    #[test]
    fn test_validate_gtin_bad_checksum() {
        // 12345678901 -> check digit 2
        let v = validate_gtin("123456789012");
        assert!(v.valid);
        let v = validate_gtin("123456789013");
        assert!(!v.valid);
        assert_eq!(v.kind, Some(GtinKind::Upc));
        assert!(v.error.unwrap().contains("check digit"));
    }

    #[test]
    fn test_validate_gtin_ean_kind() {
        let v = validate_gtin("4006381333931");
        assert!(v.valid);
        assert_eq!(v.kind, Some(GtinKind::Ean));
    }

    #[test]
    fn test_format_gtin_groupings() {
        assert_eq!(format_gtin("036000291452"), "0-36000-29145-2");
        assert_eq!(format_gtin("4006381333931"), "4-006381-333931");
        assert_eq!(format_gtin("12-34"), "1234");
    }

    #[test]
    fn test_format_gtin_idempotent_under_stripping() {
        for code in ["036000291452", "4006381333931", "123", "0-36000-29145-2", ""] {
            let once = format_gtin(code);
            let twice = format_gtin(&once.replace('-', ""));
            assert_eq!(once, twice, "input {code:?}");
        }
    }

    #[test]
    fn test_isrc_format() {
        assert!(validate_isrc("USRC17607839"));
        assert!(validate_isrc("US-RC1-76-07839"));
        assert!(validate_isrc("gbaye0601498"));
        assert!(!validate_isrc("USRC1760783"));
        assert!(!validate_isrc("1SRC17607839"));
        assert!(!validate_isrc("USRC1760783X"));
    }

    #[test]
    fn test_format_isrc() {
        assert_eq!(format_isrc("usrc17607839"), "US-RC1-76-07839");
        assert_eq!(format_isrc("bad"), "BAD");
    }

    #[test]
    fn test_iswc_check_digit() {
        // T-034.524.680-1 is the published example
        assert!(validate_iswc("T-034.524.680-1"));
        assert!(validate_iswc("T0345246801"));
        assert!(!validate_iswc("T0345246802"));
        assert!(!validate_iswc("0345246801"));
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("artist@example.com"));
        assert!(is_valid_email("  a.b+c@label.co.uk "));
        assert!(!is_valid_email("artist@"));
        assert!(!is_valid_email("no at sign"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_audio_filename_contract() {
        assert!(is_valid_audio_filename("Nova - First Light.wav"));
        assert!(is_valid_audio_filename("Nova - First Light.AIFF"));
        assert!(is_valid_audio_filename("Nova - First Light (Remix).aif"));
        assert!(!is_valid_audio_filename("First Light.wav"));
        assert!(!is_valid_audio_filename("Nova - First Light.mp3"));
        assert!(!is_valid_audio_filename("Nova-First Light.wav"));
    }

    #[test]
    fn test_audio_size_cap() {
        assert!(validate_audio_file("A - B.wav", MAX_AUDIO_UPLOAD_BYTES).is_ok());
        assert_eq!(
            validate_audio_file("A - B.wav", MAX_AUDIO_UPLOAD_BYTES + 1),
            Err(AudioFileError::TooLarge {
                size: MAX_AUDIO_UPLOAD_BYTES + 1,
                max: MAX_AUDIO_UPLOAD_BYTES
            })
        );
    }
}
