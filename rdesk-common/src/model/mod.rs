//! Release, track and artist profile data model
//!
//! [`ReleaseData`] is the single value object a wizard session edits. It is
//! serialized camelCase on the wire and mapped 1:1 onto snake_case columns by
//! `db::releases`.

/// Shared string-enum plumbing: `as_str`, `Display`, `FromStr`
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        crate::Error::InvalidInput(format!(
                            "unknown {} value: {:?}",
                            stringify!($name),
                            s
                        ))
                    })
            }
        }
    };
}

pub(crate) use string_enum;

pub mod lookup;
pub mod profile;
pub mod release;
pub mod rights;
pub mod track;
pub mod wire;

pub use lookup::{GtinLookup, IsrcLookup, IswcLookup};
pub use profile::{ArtistProfile, ProfileUpdate};
pub use release::{
    GoLiveOption, ReleaseData, ReleaseStatus, ReleaseType, ReleaseVersion, SignatoryRole,
    TitleSource,
};
pub use rights::{ContactBlock, RightsEntry, TerritoryScope};
pub use track::{
    ChildSafeContent, Clearance, ClearanceStatus, Contributor, ContributorRole, ExplicitContent,
    TrackData,
};
pub use wire::{
    ErrorBody, ErrorDetail, ErrorReport, Invite, InviteRole, NewInvite, SaveReleaseResponse,
    SaveTrackRequest, UploadKind, UploadResponse,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file picked on the client that has not been uploaded yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFile {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, size, path }
    }
}

/// File reference: a local handle before upload, the storage URL after
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileRef {
    Remote(String),
    Local(LocalFile),
}

impl FileRef {
    /// Uploaded URL, if the file has been uploaded
    pub fn url(&self) -> Option<&str> {
        match self {
            FileRef::Remote(url) if !url.trim().is_empty() => Some(url),
            _ => None,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.url().is_some()
    }
}
