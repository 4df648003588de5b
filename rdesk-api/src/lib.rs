//! rdesk-api library: HTTP service behind the release wizard
//!
//! Session lookup, profile and release persistence, uploads and metadata
//! lookups. Exposed as a library so integration tests can build the router
//! around an in-memory database.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use rdesk_common::config::ApprovalMode;
use rdesk_common::validators::MAX_AUDIO_UPLOAD_BYTES;

pub mod api;
pub mod coerce;
pub mod error;
pub mod lookup;
pub mod session;
pub mod storage;

pub use crate::error::{ApiError, ApiResult};

use crate::lookup::MetadataLookup;
use crate::storage::{LocalFsStore, ObjectStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub store: Arc<dyn ObjectStore>,
    pub lookup: Arc<dyn MetadataLookup>,
    /// What happens to a release submitted for review
    pub approval_mode: ApprovalMode,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        store: Arc<dyn ObjectStore>,
        lookup: Arc<dyn MetadataLookup>,
        approval_mode: ApprovalMode,
    ) -> Self {
        Self {
            db,
            store,
            lookup,
            approval_mode,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// When `uploads` is given its directory is served at the store's URL
/// prefix; a remote object store serves its own URLs.
pub fn build_router(state: AppState, uploads: Option<&LocalFsStore>) -> Router {
    // Multipart bodies may carry a full-size audio file plus form fields
    let body_limit = usize::try_from(MAX_AUDIO_UPLOAD_BYTES + 1024 * 1024).unwrap_or(usize::MAX);

    let mut router = Router::new()
        .merge(api::health_routes())
        .merge(api::session_routes())
        .merge(api::profile_routes())
        .merge(api::release_routes())
        .merge(api::upload_routes().layer(DefaultBodyLimit::max(body_limit)))
        .merge(api::lookup_routes())
        .merge(api::invite_routes())
        .merge(api::error_report_routes());

    if let Some(store) = uploads {
        let prefix = store.url_for("");
        let prefix = prefix.trim_end_matches('/');
        if prefix.starts_with('/') {
            router = router.nest_service(prefix, ServeDir::new(store.root()));
        }
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
