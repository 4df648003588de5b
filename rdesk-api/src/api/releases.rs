//! Release and track persistence
//!
//! `POST /api/music-releases` upserts the wizard's whole snapshot. Bodies go
//! through [`coerce_payload`] first so form-shaped values (`"true"`, `"3"`,
//! `""`) land in the typed model. Moving a draft to `pending_review` re-runs
//! the submission checks on the server; under [`ApprovalMode::Auto`] the
//! release is published in the same request.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rdesk_common::config::ApprovalMode;
use rdesk_common::db::releases::{list_releases, load_release, save_release, set_release_status};
use rdesk_common::db::tracks::save_track;
use rdesk_common::model::{ReleaseData, ReleaseStatus, SaveReleaseResponse, SaveTrackRequest};
use rdesk_common::steps::submission_problems;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::coerce::coerce_payload;
use crate::error::{ApiError, ApiResult};
use crate::session::CurrentUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReleaseQuery {
    pub id: Option<String>,
}

/// GET /api/music-releases[?id=<uuid>]
///
/// Without `id`: the caller's release list. With `id`: the full release
/// including track slots, 404 if it is missing or belongs to someone else.
pub async fn get_releases(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReleaseQuery>,
) -> ApiResult<Response> {
    let Some(id) = query.id.filter(|id| !id.trim().is_empty()) else {
        let releases = list_releases(&state.db, &user.id).await?;
        return Ok(Json(releases).into_response());
    };

    let id = Uuid::parse_str(id.trim())
        .map_err(|_| ApiError::BadRequest(format!("Invalid release id: {}", id)))?;
    match load_release(&state.db, &user.id, id).await? {
        Some(release) => Ok(Json(release).into_response()),
        None => Err(ApiError::NotFound(format!("Release {}", id))),
    }
}

/// Whether moving from `stored` to `incoming` is allowed, and whether it is
/// a submission that needs re-validation
///
/// Only review may publish or reject. A published release stays published.
pub fn check_transition(
    stored: ReleaseStatus,
    incoming: ReleaseStatus,
) -> Result<bool, ApiError> {
    use ReleaseStatus::*;

    match (stored, incoming) {
        (from, to) if from == to => Ok(false),
        (Draft | Rejected, PendingReview) => Ok(true),
        (PendingReview | Rejected, Draft) => Ok(false),
        (from, to) => Err(ApiError::BadRequest(format!(
            "Release status cannot change from {} to {}",
            from, to
        ))),
    }
}

async fn stored_status(
    pool: &SqlitePool,
    user_id: &str,
    id: Option<Uuid>,
) -> ApiResult<ReleaseStatus> {
    let Some(id) = id else {
        return Ok(ReleaseStatus::Draft);
    };
    // Unknown ids are new drafts; foreign ids are refused by the save itself
    Ok(load_release(pool, user_id, id)
        .await?
        .map(|r| r.status)
        .unwrap_or_default())
}

/// POST /api/music-releases
pub async fn post_release(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut payload): Json<Value>,
) -> ApiResult<Json<SaveReleaseResponse>> {
    coerce_payload(&mut payload);
    let mut release: ReleaseData = serde_json::from_value(payload)
        .map_err(|e| ApiError::BadRequest(format!("Invalid release: {}", e)))?;
    release.sync_track_slots();
    release.enforce_flags();

    let stored = stored_status(&state.db, &user.id, release.id).await?;
    let submitting = check_transition(stored, release.status)?;

    if submitting {
        let problems = submission_problems(&release, Utc::now().date_naive());
        if !problems.is_empty() {
            return Err(ApiError::BadRequest(problems.join("; ")));
        }
    }

    let mut saved = save_release(&state.db, &user.id, &release).await?;

    if submitting {
        info!("Release {} submitted for review by {}", saved.id, user.id);
        if state.approval_mode == ApprovalMode::Auto {
            saved.revision =
                set_release_status(&state.db, saved.id, ReleaseStatus::Published).await?;
            saved.status = ReleaseStatus::Published;
            info!("Release {} published (automatic approval)", saved.id);
        }
    }

    Ok(Json(SaveReleaseResponse {
        success: true,
        id: saved.id,
        revision: saved.revision,
        status: saved.status,
    }))
}

/// POST /api/music-tracks
pub async fn post_track(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut payload): Json<Value>,
) -> ApiResult<Json<Value>> {
    coerce_payload(&mut payload);
    let mut request: SaveTrackRequest = serde_json::from_value(payload)
        .map_err(|e| ApiError::BadRequest(format!("Invalid track: {}", e)))?;
    request.track.enforce_content_flags();

    save_track(&state.db, &user.id, request.release_id, &request.track).await?;
    Ok(Json(json!({
        "success": true,
        "releaseId": request.release_id,
        "trackNumber": request.track.track_number,
    })))
}

pub fn release_routes() -> Router<AppState> {
    Router::new()
        .route("/api/music-releases", get(get_releases).post(post_release))
        .route("/api/music-tracks", post(post_track))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_to_pending_is_a_submission() {
        assert!(check_transition(ReleaseStatus::Draft, ReleaseStatus::PendingReview).unwrap());
        assert!(check_transition(ReleaseStatus::Rejected, ReleaseStatus::PendingReview).unwrap());
    }

    #[test]
    fn test_unchanged_status_is_not_a_submission() {
        for status in ReleaseStatus::ALL {
            assert!(!check_transition(*status, *status).unwrap());
        }
    }

    #[test]
    fn test_client_cannot_publish_or_reject() {
        assert!(check_transition(ReleaseStatus::Draft, ReleaseStatus::Published).is_err());
        assert!(check_transition(ReleaseStatus::PendingReview, ReleaseStatus::Rejected).is_err());
        assert!(check_transition(ReleaseStatus::Published, ReleaseStatus::Draft).is_err());
    }

    #[test]
    fn test_withdraw_back_to_draft() {
        assert!(!check_transition(ReleaseStatus::PendingReview, ReleaseStatus::Draft).unwrap());
    }
}
