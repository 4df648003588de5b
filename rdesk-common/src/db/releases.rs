//! `music_releases` row mapping
//!
//! One row per release, keyed by release id and owned by one user. Every
//! write bumps `revision`; a write carrying a revision other than the stored
//! one is rejected with [`Error::StaleRevision`].

use once_cell::sync::Lazy;
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{json_column, parse_enum_column, to_json_text, to_u32, tracks, upsert_sql};
use crate::model::{ContactBlock, FileRef, ReleaseData, ReleaseStatus, TrackData};
use crate::{Error, Result};

const RELEASE_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "status",
    "revision",
    "release_title",
    "release_title_confirmed",
    "release_title_source",
    "upc",
    "upc_confirmed",
    "ean",
    "ean_confirmed",
    "country_of_origin",
    "release_type",
    "track_count",
    "release_version",
    "available_home",
    "available_specific",
    "available_worldwide",
    "specific_territories",
    "go_live_option",
    "go_live_date",
    "record_label_independent",
    "record_labels",
    "record_labels_confirmed",
    "publisher_independent",
    "publishers",
    "publishers_confirmed",
    "distributor_name",
    "distributor_confirmed",
    "distributor_contact_name",
    "distributor_contact_email",
    "wrote_composition",
    "pro_name",
    "pro_confirmed",
    "pro_contact_name",
    "pro_contact_email",
    "mcs_name",
    "mcs_confirmed",
    "mcs_contact_name",
    "mcs_contact_email",
    "cover_artwork_url",
    "cover_caption",
    "terms_distribution",
    "terms_rights",
    "terms_privacy",
    "confirm_accuracy",
    "confirm_ownership",
    "confirm_review",
    "signatory_role",
    "signature_name",
    "signature_email",
];

static RELEASE_UPSERT_SQL: Lazy<String> =
    Lazy::new(|| upsert_sql("music_releases", RELEASE_COLUMNS, &["id"]));

/// Outcome of a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRelease {
    pub id: Uuid,
    pub revision: i64,
    pub status: ReleaseStatus,
}

/// Row for the release list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSummary {
    pub id: Uuid,
    pub release_title: String,
    pub status: ReleaseStatus,
    pub track_count: u32,
    pub revision: i64,
    pub updated_at: String,
}

/// Insert or update `release` on behalf of `user_id`
///
/// A release without an id gets a fresh one. An existing row must belong to
/// `user_id` (otherwise [`Error::NotFound`]) and its revision must equal
/// `release.revision`. Track rows above `track_count` are pruned in the same
/// transaction.
pub async fn save_release(
    pool: &SqlitePool,
    user_id: &str,
    release: &ReleaseData,
) -> Result<SavedRelease> {
    let id = release.id.unwrap_or_else(Uuid::new_v4);
    let id_text = id.to_string();

    let mut tx = pool.begin().await?;

    let existing = sqlx::query("SELECT user_id, revision, status FROM music_releases WHERE id = ?")
        .bind(&id_text)
        .fetch_optional(&mut *tx)
        .await?;

    let (revision, was_draft) = match existing {
        Some(row) => {
            let owner: String = row.get("user_id");
            if owner != user_id {
                return Err(Error::NotFound(format!("Release {}", id)));
            }
            let stored: i64 = row.get("revision");
            if release.revision != stored {
                return Err(Error::StaleRevision {
                    submitted: release.revision,
                    current: stored,
                });
            }
            let status: String = row.get("status");
            (stored + 1, status == ReleaseStatus::Draft.as_str())
        }
        None => (1, true),
    };

    let go_live_date = release
        .go_live_date
        .map(|d| d.format("%Y-%m-%d").to_string());

    sqlx::query(RELEASE_UPSERT_SQL.as_str())
        .bind(&id_text)
        .bind(user_id)
        .bind(release.status.as_str())
        .bind(revision)
        .bind(&release.release_title)
        .bind(release.release_title_confirmed)
        .bind(release.release_title_source.as_str())
        .bind(&release.upc)
        .bind(release.upc_confirmed)
        .bind(&release.ean)
        .bind(release.ean_confirmed)
        .bind(&release.country_of_origin)
        .bind(release.release_type.map(|t| t.as_str()))
        .bind(i64::from(release.track_count))
        .bind(release.release_version.as_str())
        .bind(release.available_home)
        .bind(release.available_specific)
        .bind(release.available_worldwide)
        .bind(to_json_text(&release.specific_territories)?)
        .bind(release.go_live_option.map(|o| o.as_str()))
        .bind(go_live_date)
        .bind(release.record_label_independent)
        .bind(to_json_text(&release.record_labels)?)
        .bind(release.record_labels_confirmed)
        .bind(release.publisher_independent)
        .bind(to_json_text(&release.publishers)?)
        .bind(release.publishers_confirmed)
        .bind(&release.distributor.name)
        .bind(release.distributor.confirmed)
        .bind(&release.distributor.contact_name)
        .bind(&release.distributor.contact_email)
        .bind(release.wrote_composition)
        .bind(&release.pro.name)
        .bind(release.pro.confirmed)
        .bind(&release.pro.contact_name)
        .bind(&release.pro.contact_email)
        .bind(&release.mcs.name)
        .bind(release.mcs.confirmed)
        .bind(&release.mcs.contact_name)
        .bind(&release.mcs.contact_email)
        .bind(release.cover_artwork_url())
        .bind(&release.cover_caption)
        .bind(release.terms_distribution)
        .bind(release.terms_rights)
        .bind(release.terms_privacy)
        .bind(release.confirm_accuracy)
        .bind(release.confirm_ownership)
        .bind(release.confirm_review)
        .bind(release.signatory_role.map(|r| r.as_str()))
        .bind(&release.signature_name)
        .bind(&release.signature_email)
        .execute(&mut *tx)
        .await?;

    if was_draft && release.status != ReleaseStatus::Draft {
        sqlx::query("UPDATE music_releases SET submitted_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(&id_text)
            .execute(&mut *tx)
            .await?;
        info!("Release {} submitted with status {}", id, release.status);
    }

    let pruned = sqlx::query("DELETE FROM music_tracks WHERE release_id = ? AND track_number > ?")
        .bind(&id_text)
        .bind(i64::from(release.track_count.max(1)))
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if pruned > 0 {
        debug!("Pruned {} track rows from release {}", pruned, id);
    }

    tx.commit().await?;

    debug!("Saved release {} at revision {}", id, revision);
    Ok(SavedRelease {
        id,
        revision,
        status: release.status,
    })
}

/// Load one of the caller's releases, including its track rows
pub async fn load_release(
    pool: &SqlitePool,
    user_id: &str,
    id: Uuid,
) -> Result<Option<ReleaseData>> {
    let row = sqlx::query("SELECT * FROM music_releases WHERE id = ? AND user_id = ?")
        .bind(id.to_string())
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut release = release_from_row(&row);
    release.id = Some(id);

    // Slots without a stored row stay placeholders
    let mut slots: Vec<TrackData> = (1..=release.track_count).map(TrackData::placeholder).collect();
    for track in tracks::load_tracks(pool, id).await? {
        let index = (track.track_number as usize).checked_sub(1);
        if let Some(slot) = index.and_then(|i| slots.get_mut(i)) {
            *slot = track;
        }
    }
    release.tracks = slots;

    Ok(Some(release))
}

/// The caller's releases, most recently updated first
pub async fn list_releases(pool: &SqlitePool, user_id: &str) -> Result<Vec<ReleaseSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT id, release_title, status, track_count, revision, updated_at
        FROM music_releases
        WHERE user_id = ?
        ORDER BY updated_at DESC, id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        let id: String = row.get("id");
        let id = Uuid::parse_str(&id)
            .map_err(|e| Error::Internal(format!("Bad release id {:?}: {}", id, e)))?;
        summaries.push(ReleaseSummary {
            id,
            release_title: row.get("release_title"),
            status: parse_enum_column(row.get("status"), "status").unwrap_or_default(),
            track_count: to_u32(row.get("track_count")),
            revision: row.get("revision"),
            updated_at: row.get("updated_at"),
        });
    }
    Ok(summaries)
}

/// Owner of a release, if it exists
pub async fn release_owner(pool: &SqlitePool, id: Uuid) -> Result<Option<String>> {
    let owner = sqlx::query_scalar("SELECT user_id FROM music_releases WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;
    Ok(owner)
}

/// Workflow status change outside the wizard (approval, rejection)
pub async fn set_release_status(pool: &SqlitePool, id: Uuid, status: ReleaseStatus) -> Result<i64> {
    let revision: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE music_releases
        SET status = ?, revision = revision + 1, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        RETURNING revision
        "#,
    )
    .bind(status.as_str())
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    revision.ok_or_else(|| Error::NotFound(format!("Release {}", id)))
}

fn contact_from_row(row: &SqliteRow, prefix: &str) -> ContactBlock {
    ContactBlock {
        name: row.get(format!("{prefix}_name").as_str()),
        confirmed: row.get(format!("{prefix}_confirmed").as_str()),
        contact_name: row.get(format!("{prefix}_contact_name").as_str()),
        contact_email: row.get(format!("{prefix}_contact_email").as_str()),
    }
}

fn release_from_row(row: &SqliteRow) -> ReleaseData {
    let go_live_date: Option<String> = row.get("go_live_date");
    let go_live_date = go_live_date.and_then(|d| d.parse().ok());
    let cover_artwork_url: Option<String> = row.get("cover_artwork_url");

    ReleaseData {
        id: None,
        status: parse_enum_column(row.get("status"), "status").unwrap_or_default(),
        revision: row.get("revision"),
        release_title: row.get("release_title"),
        release_title_confirmed: row.get("release_title_confirmed"),
        release_title_source: parse_enum_column(
            row.get("release_title_source"),
            "release_title_source",
        )
        .unwrap_or_default(),
        upc: row.get("upc"),
        upc_confirmed: row.get("upc_confirmed"),
        ean: row.get("ean"),
        ean_confirmed: row.get("ean_confirmed"),
        country_of_origin: row.get("country_of_origin"),
        release_type: parse_enum_column(row.get("release_type"), "release_type"),
        track_count: to_u32(row.get("track_count")).max(1),
        release_version: parse_enum_column(row.get("release_version"), "release_version")
            .unwrap_or_default(),
        available_home: row.get("available_home"),
        available_specific: row.get("available_specific"),
        available_worldwide: row.get("available_worldwide"),
        specific_territories: json_column(row, "specific_territories"),
        go_live_option: parse_enum_column(row.get("go_live_option"), "go_live_option"),
        go_live_date,
        record_label_independent: row.get("record_label_independent"),
        record_labels: json_column(row, "record_labels"),
        record_labels_confirmed: row.get("record_labels_confirmed"),
        publisher_independent: row.get("publisher_independent"),
        publishers: json_column(row, "publishers"),
        publishers_confirmed: row.get("publishers_confirmed"),
        distributor: contact_from_row(row, "distributor"),
        wrote_composition: row.get("wrote_composition"),
        pro: contact_from_row(row, "pro"),
        mcs: contact_from_row(row, "mcs"),
        cover_artwork: cover_artwork_url.map(FileRef::Remote),
        cover_caption: row.get("cover_caption"),
        terms_distribution: row.get("terms_distribution"),
        terms_rights: row.get("terms_rights"),
        terms_privacy: row.get("terms_privacy"),
        confirm_accuracy: row.get("confirm_accuracy"),
        confirm_ownership: row.get("confirm_ownership"),
        confirm_review: row.get("confirm_review"),
        signatory_role: parse_enum_column(row.get("signatory_role"), "signatory_role"),
        signature_name: row.get("signature_name"),
        signature_email: row.get("signature_email"),
        tracks: Vec::new(),
    }
}
