//! `artist_profiles` row mapping

use once_cell::sync::Lazy;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use super::{json_column, to_json_text, upsert_sql};
use crate::model::{ArtistProfile, ProfileUpdate};
use crate::Result;

const PROFILE_COLUMNS: &[&str] = &[
    "user_id",
    "artist_name",
    "biography",
    "location",
    "website",
    "contact_email",
    "genres",
    "label_status",
    "label_name",
    "manager_status",
    "manager_name",
    "manager_email",
    "booking_status",
    "booking_agent",
    "booking_email",
];

static PROFILE_UPSERT_SQL: Lazy<String> =
    Lazy::new(|| upsert_sql("artist_profiles", PROFILE_COLUMNS, &["user_id"]));

pub async fn load_profile(pool: &SqlitePool, user_id: &str) -> Result<Option<ArtistProfile>> {
    let row = sqlx::query("SELECT * FROM artist_profiles WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(profile_from_row))
}

pub async fn save_profile(pool: &SqlitePool, profile: &ArtistProfile) -> Result<()> {
    sqlx::query(PROFILE_UPSERT_SQL.as_str())
        .bind(&profile.user_id)
        .bind(&profile.artist_name)
        .bind(&profile.biography)
        .bind(&profile.location)
        .bind(&profile.website)
        .bind(&profile.contact_email)
        .bind(to_json_text(&profile.genres)?)
        .bind(profile.label_status.as_deref())
        .bind(&profile.label_name)
        .bind(profile.manager_status.as_deref())
        .bind(&profile.manager_name)
        .bind(&profile.manager_email)
        .bind(profile.booking_status.as_deref())
        .bind(&profile.booking_agent)
        .bind(&profile.booking_email)
        .execute(pool)
        .await?;

    Ok(())
}

/// Merge `update` into the caller's profile, creating it on first use
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    update: ProfileUpdate,
) -> Result<ArtistProfile> {
    let mut profile = load_profile(pool, user_id)
        .await?
        .unwrap_or_else(|| ArtistProfile::new(user_id));
    profile.merge(update);
    save_profile(pool, &profile).await?;
    debug!("Updated artist profile for {}", user_id);
    Ok(profile)
}

fn profile_from_row(row: &SqliteRow) -> ArtistProfile {
    ArtistProfile {
        user_id: row.get("user_id"),
        artist_name: row.get("artist_name"),
        biography: row.get("biography"),
        location: row.get("location"),
        website: row.get("website"),
        contact_email: row.get("contact_email"),
        genres: json_column(row, "genres"),
        label_status: row.get("label_status"),
        label_name: row.get("label_name"),
        manager_status: row.get("manager_status"),
        manager_name: row.get("manager_name"),
        manager_email: row.get("manager_email"),
        booking_status: row.get("booking_status"),
        booking_agent: row.get("booking_agent"),
        booking_email: row.get("booking_email"),
    }
}
