//! Collaborator invites

use axum::{extract::State, routing::post, Json, Router};
use rdesk_common::db::invites::create_invite;
use rdesk_common::model::{Invite, NewInvite};

use crate::error::ApiResult;
use crate::session::CurrentUser;
use crate::AppState;

/// POST /api/music-release-invites
///
/// Only the release owner may invite; anyone else gets 404.
pub async fn post_invite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(invite): Json<NewInvite>,
) -> ApiResult<Json<Invite>> {
    let invite = create_invite(&state.db, &user.id, &invite).await?;
    Ok(Json(invite))
}

pub fn invite_routes() -> Router<AppState> {
    Router::new().route("/api/music-release-invites", post(post_invite))
}
