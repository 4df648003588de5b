//! Client-side error reports
//!
//! Accepted with or without a session so failures on the sign-in path are
//! still recorded.

use axum::{extract::State, routing::post, Json, Router};
use rdesk_common::db::error_reports::record_error_report;
use rdesk_common::model::ErrorReport;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::session::MaybeUser;
use crate::AppState;

/// POST /api/music-release-errors
pub async fn post_error_report(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(report): Json<ErrorReport>,
) -> ApiResult<Json<Value>> {
    let user_id = user.as_ref().map(|u| u.id.as_str());
    let id = record_error_report(&state.db, user_id, &report).await?;
    Ok(Json(json!({ "success": true, "id": id })))
}

pub fn error_report_routes() -> Router<AppState> {
    Router::new().route("/api/music-release-errors", post(post_error_report))
}
