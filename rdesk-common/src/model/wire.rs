//! Request and response bodies shared by the API service and its client

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{string_enum, ReleaseStatus};

/// Value of the multipart `type` field on `/api/upload`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Audio,
    Artwork,
    Proof,
    Lyrics,
}

string_enum!(UploadKind {
    Audio => "audio",
    Artwork => "artwork",
    Proof => "proof",
    Lyrics => "lyrics",
});

/// `/api/upload` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub size: u64,
}

/// `POST /api/music-releases` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReleaseResponse {
    pub success: bool,
    pub id: Uuid,
    pub revision: i64,
    pub status: ReleaseStatus,
}

/// `POST /api/music-tracks` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTrackRequest {
    pub release_id: Uuid,
    pub track: super::TrackData,
}

/// Error body: `{"error": {"code", "message"}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// `POST /api/music-release-errors` body
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorReport {
    pub release_id: Option<Uuid>,
    pub step: Option<String>,
    pub message: String,
    /// Free-form diagnostic payload
    pub context: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteRole {
    Collaborator,
    Manager,
    LabelRepresentative,
    Viewer,
}

string_enum!(InviteRole {
    Collaborator => "collaborator",
    Manager => "manager",
    LabelRepresentative => "label_representative",
    Viewer => "viewer",
});

/// `POST /api/music-release-invites` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvite {
    pub release_id: Uuid,
    pub email: String,
    pub role: InviteRole,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub id: Uuid,
    pub release_id: Uuid,
    pub email: String,
    pub role: InviteRole,
    pub status: String,
    /// Acceptance token delivered to the invitee
    pub token: String,
}
