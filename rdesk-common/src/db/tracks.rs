//! `music_tracks` row mapping, keyed by (release id, track number)

use once_cell::sync::Lazy;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{json_column, parse_enum_column, to_json_text, to_u32, upsert_sql};
use crate::model::{Clearance, FileRef, TrackData};
use crate::{Error, Result};

const TRACK_COLUMNS: &[&str] = &[
    "release_id",
    "track_number",
    "title",
    "version",
    "isrc",
    "isrc_confirmed",
    "iswc",
    "iswc_confirmed",
    "musical_work_title",
    "primary_artists",
    "featured_artists",
    "session_artists",
    "creators",
    "producers",
    "cover_rights",
    "cover_rights_proof_url",
    "remix_rights",
    "remix_rights_proof_url",
    "sample_rights",
    "sample_rights_proof_url",
    "genres",
    "moods",
    "languages",
    "explicit_content",
    "child_safe_content",
    "audio_url",
    "duration_seconds",
    "lyrics_text",
    "lyrics_url",
    "video_url",
    "preview_start_seconds",
];

static TRACK_UPSERT_SQL: Lazy<String> =
    Lazy::new(|| upsert_sql("music_tracks", TRACK_COLUMNS, &["release_id", "track_number"]));

/// Upsert one track of a release owned by `user_id`
///
/// The track number must name one of the release's slots. Local file
/// handles are not persisted; only uploaded URLs are stored.
pub async fn save_track(
    pool: &SqlitePool,
    user_id: &str,
    release_id: Uuid,
    track: &TrackData,
) -> Result<()> {
    if track.track_number == 0 {
        return Err(Error::InvalidInput("track number must be 1 or greater".into()));
    }

    let slots: Option<(String, i64)> =
        sqlx::query_as("SELECT user_id, track_count FROM music_releases WHERE id = ?")
            .bind(release_id.to_string())
            .fetch_optional(pool)
            .await?;
    match slots {
        Some((owner, track_count)) if owner == user_id => {
            if i64::from(track.track_number) > track_count.max(1) {
                return Err(Error::InvalidInput(format!(
                    "track {} is beyond the release's {} tracks",
                    track.track_number, track_count
                )));
            }
        }
        _ => return Err(Error::NotFound(format!("Release {}", release_id))),
    }

    sqlx::query(TRACK_UPSERT_SQL.as_str())
        .bind(release_id.to_string())
        .bind(i64::from(track.track_number))
        .bind(&track.title)
        .bind(&track.version)
        .bind(&track.isrc)
        .bind(track.isrc_confirmed)
        .bind(&track.iswc)
        .bind(track.iswc_confirmed)
        .bind(&track.musical_work_title)
        .bind(to_json_text(&track.primary_artists)?)
        .bind(to_json_text(&track.featured_artists)?)
        .bind(to_json_text(&track.session_artists)?)
        .bind(to_json_text(&track.creators)?)
        .bind(to_json_text(&track.producers)?)
        .bind(track.cover_rights.status.as_str())
        .bind(proof_url(&track.cover_rights))
        .bind(track.remix_rights.status.as_str())
        .bind(proof_url(&track.remix_rights))
        .bind(track.sample_rights.status.as_str())
        .bind(proof_url(&track.sample_rights))
        .bind(to_json_text(&track.genres)?)
        .bind(to_json_text(&track.moods)?)
        .bind(to_json_text(&track.languages)?)
        .bind(track.explicit_content.map(|c| c.as_str()))
        .bind(track.child_safe_content.map(|c| c.as_str()))
        .bind(track.audio_url.as_deref())
        .bind(track.duration_seconds.map(i64::from))
        .bind(&track.lyrics_text)
        .bind(track.lyrics_file.as_ref().and_then(FileRef::url))
        .bind(track.video_url.as_deref())
        .bind(i64::from(track.preview_start_seconds))
        .execute(pool)
        .await?;

    debug!("Saved track {} of release {}", track.track_number, release_id);
    Ok(())
}

/// Stored tracks of a release in track order
pub async fn load_tracks(pool: &SqlitePool, release_id: Uuid) -> Result<Vec<TrackData>> {
    let rows = sqlx::query("SELECT * FROM music_tracks WHERE release_id = ? ORDER BY track_number")
        .bind(release_id.to_string())
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(track_from_row).collect())
}

fn proof_url(clearance: &Clearance) -> Option<&str> {
    clearance.proof.as_ref().and_then(FileRef::url)
}

fn clearance_from_row(row: &SqliteRow, column: &str) -> Clearance {
    let proof: Option<String> = row.get(format!("{column}_proof_url").as_str());
    Clearance {
        status: parse_enum_column(row.get(column), column).unwrap_or_default(),
        proof: proof.map(FileRef::Remote),
    }
}

fn track_from_row(row: &SqliteRow) -> TrackData {
    let duration: Option<i64> = row.get("duration_seconds");
    let lyrics_url: Option<String> = row.get("lyrics_url");

    TrackData {
        track_number: to_u32(row.get("track_number")),
        title: row.get("title"),
        version: row.get("version"),
        isrc: row.get("isrc"),
        isrc_confirmed: row.get("isrc_confirmed"),
        iswc: row.get("iswc"),
        iswc_confirmed: row.get("iswc_confirmed"),
        musical_work_title: row.get("musical_work_title"),
        primary_artists: json_column(row, "primary_artists"),
        featured_artists: json_column(row, "featured_artists"),
        session_artists: json_column(row, "session_artists"),
        creators: json_column(row, "creators"),
        producers: json_column(row, "producers"),
        cover_rights: clearance_from_row(row, "cover_rights"),
        remix_rights: clearance_from_row(row, "remix_rights"),
        sample_rights: clearance_from_row(row, "sample_rights"),
        genres: json_column(row, "genres"),
        moods: json_column(row, "moods"),
        languages: json_column(row, "languages"),
        explicit_content: parse_enum_column(row.get("explicit_content"), "explicit_content"),
        child_safe_content: parse_enum_column(row.get("child_safe_content"), "child_safe_content"),
        audio_file: None,
        audio_url: row.get("audio_url"),
        duration_seconds: duration.map(to_u32),
        lyrics_text: row.get("lyrics_text"),
        lyrics_file: lyrics_url.map(FileRef::Remote),
        video_url: row.get("video_url"),
        preview_start_seconds: to_u32(row.get("preview_start_seconds")),
    }
}
