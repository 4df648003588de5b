//! Artist profile: read by the wizard to pre-fill contact blocks and the
//! signature, written from the profile screen.

use axum::{extract::State, routing::get, Json, Router};
use rdesk_common::db::profiles::{load_profile, update_profile};
use rdesk_common::model::{ArtistProfile, ProfileUpdate};

use crate::error::ApiResult;
use crate::session::CurrentUser;
use crate::AppState;

/// GET /api/artist-profile
///
/// `null` until the caller saves a profile for the first time.
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Option<ArtistProfile>>> {
    let profile = load_profile(&state.db, &user.id).await?;
    Ok(Json(profile))
}

/// POST /api/artist-profile
///
/// Fields left out of the body keep their stored values.
pub async fn post_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<ArtistProfile>> {
    let profile = update_profile(&state.db, &user.id, update).await?;
    Ok(Json(profile))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/api/artist-profile", get(get_profile).post(post_profile))
}
