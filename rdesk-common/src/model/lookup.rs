//! Metadata lookup results returned by the GTIN / ISRC / ISWC routes
//!
//! A miss is a normal result (`found: false`), never an error.

use serde::{Deserialize, Serialize};

use super::ReleaseType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GtinLookup {
    pub found: bool,
    pub gtin: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub release_type: Option<ReleaseType>,
    pub track_count: Option<u32>,
    /// ISO 3166-1 alpha-2
    pub country: Option<String>,
    pub release_date: Option<String>,
}

impl GtinLookup {
    pub fn not_found(gtin: impl Into<String>) -> Self {
        Self {
            gtin: gtin.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IsrcLookup {
    pub found: bool,
    pub isrc: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub duration_seconds: Option<u32>,
}

impl IsrcLookup {
    pub fn not_found(isrc: impl Into<String>) -> Self {
        Self {
            isrc: isrc.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IswcLookup {
    pub found: bool,
    pub iswc: String,
    pub title: Option<String>,
    pub writers: Vec<String>,
}

impl IswcLookup {
    pub fn not_found(iswc: impl Into<String>) -> Self {
        Self {
            iswc: iswc.into(),
            ..Default::default()
        }
    }
}
