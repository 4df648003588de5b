//! Code lookups proxied to the metadata service
//!
//! Codes are validated locally first: a malformed code is a 400 and never
//! reaches MusicBrainz. A well-formed code with no match is `found: false`
//! with status 200.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use rdesk_common::model::{GtinLookup, IsrcLookup, IswcLookup};
use rdesk_common::validators::{
    clean_isrc, clean_iswc, strip_non_digits, validate_gtin, validate_isrc, validate_iswc,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GtinQuery {
    #[serde(default)]
    pub gtin: String,
}

#[derive(Debug, Deserialize)]
pub struct IsrcQuery {
    #[serde(default)]
    pub isrc: String,
}

#[derive(Debug, Deserialize)]
pub struct IswcQuery {
    #[serde(default)]
    pub iswc: String,
}

/// GET /api/gtin-lookup?gtin=
pub async fn gtin_lookup(
    State(state): State<AppState>,
    Query(query): Query<GtinQuery>,
) -> ApiResult<Json<GtinLookup>> {
    let validation = validate_gtin(&query.gtin);
    if !validation.valid {
        return Err(ApiError::BadRequest(
            validation.error.unwrap_or_else(|| "Invalid GTIN".to_string()),
        ));
    }

    let gtin = strip_non_digits(&query.gtin);
    let result = state.lookup.release_by_barcode(&gtin).await?;
    debug!(gtin = %gtin, found = result.found, "GTIN lookup");
    Ok(Json(result))
}

/// GET /api/verify-isrc?isrc=
pub async fn verify_isrc(
    State(state): State<AppState>,
    Query(query): Query<IsrcQuery>,
) -> ApiResult<Json<IsrcLookup>> {
    if !validate_isrc(&query.isrc) {
        return Err(ApiError::BadRequest(format!("Invalid ISRC: {}", query.isrc)));
    }

    let isrc = clean_isrc(&query.isrc);
    let result = state.lookup.recording_by_isrc(&isrc).await?;
    debug!(isrc = %isrc, found = result.found, "ISRC lookup");
    Ok(Json(result))
}

/// GET /api/verify-iswc?iswc=
pub async fn verify_iswc(
    State(state): State<AppState>,
    Query(query): Query<IswcQuery>,
) -> ApiResult<Json<IswcLookup>> {
    if !validate_iswc(&query.iswc) {
        return Err(ApiError::BadRequest(format!("Invalid ISWC: {}", query.iswc)));
    }

    let iswc = clean_iswc(&query.iswc);
    let result = state.lookup.work_by_iswc(&iswc).await?;
    debug!(iswc = %iswc, found = result.found, "ISWC lookup");
    Ok(Json(result))
}

pub fn lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/api/gtin-lookup", get(gtin_lookup))
        .route("/api/verify-isrc", get(verify_isrc))
        .route("/api/verify-iswc", get(verify_iswc))
}
