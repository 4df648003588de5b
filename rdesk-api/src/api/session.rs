//! Session status for the wizard's sign-in gate

use axum::{routing::get, Json, Router};
use rdesk_common::db::sessions::User;
use serde::Serialize;

use crate::session::MaybeUser;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: Option<User>,
}

/// GET /api/auth/session
pub async fn get_session(MaybeUser(user): MaybeUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        authenticated: user.is_some(),
        user,
    })
}

pub fn session_routes() -> Router<AppState> {
    Router::new().route("/api/auth/session", get(get_session))
}
