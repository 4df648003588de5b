//! Database initialization
//!
//! Creates the SQLite database on first run and the catalog tables if they
//! are missing. Every `create_*_table` function is idempotent and public so
//! tests can build just the tables they exercise on an in-memory pool.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Schema version written to `schema_version` by [`init_database`]
pub const SCHEMA_VERSION: i64 = 1;

/// Open (creating if needed) the database at `db_path` and ensure the schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// In-memory database with the full schema (tests and tooling)
///
/// A single connection so every query sees the same memory database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Create every table and record the schema version
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    create_schema_version_table(pool).await?;
    create_users_table(pool).await?;
    create_sessions_table(pool).await?;
    create_artist_profiles_table(pool).await?;
    create_music_releases_table(pool).await?;
    create_music_tracks_table(pool).await?;
    create_release_invites_table(pool).await?;
    create_release_errors_table(pool).await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Session tokens issued by the external auth provider
pub async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            expires_at INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_artist_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artist_profiles (
            user_id TEXT PRIMARY KEY,
            artist_name TEXT NOT NULL DEFAULT '',
            biography TEXT NOT NULL DEFAULT '',
            location TEXT NOT NULL DEFAULT '',
            website TEXT NOT NULL DEFAULT '',
            contact_email TEXT NOT NULL DEFAULT '',
            genres TEXT NOT NULL DEFAULT '[]',
            label_status TEXT,
            label_name TEXT NOT NULL DEFAULT '',
            manager_status TEXT,
            manager_name TEXT NOT NULL DEFAULT '',
            manager_email TEXT NOT NULL DEFAULT '',
            booking_status TEXT,
            booking_agent TEXT NOT NULL DEFAULT '',
            booking_email TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// One row per release draft; list-valued fields are JSON text
pub async fn create_music_releases_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS music_releases (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            revision INTEGER NOT NULL DEFAULT 1,

            release_title TEXT NOT NULL DEFAULT '',
            release_title_confirmed INTEGER NOT NULL DEFAULT 0,
            release_title_source TEXT NOT NULL DEFAULT 'manual',
            upc TEXT NOT NULL DEFAULT '',
            upc_confirmed INTEGER NOT NULL DEFAULT 0,
            ean TEXT NOT NULL DEFAULT '',
            ean_confirmed INTEGER NOT NULL DEFAULT 0,
            country_of_origin TEXT NOT NULL DEFAULT '',

            release_type TEXT,
            track_count INTEGER NOT NULL DEFAULT 1,
            release_version TEXT NOT NULL DEFAULT 'original',

            available_home INTEGER NOT NULL DEFAULT 0,
            available_specific INTEGER NOT NULL DEFAULT 0,
            available_worldwide INTEGER NOT NULL DEFAULT 0,
            specific_territories TEXT NOT NULL DEFAULT '[]',

            go_live_option TEXT,
            go_live_date TEXT,

            record_label_independent INTEGER NOT NULL DEFAULT 0,
            record_labels TEXT NOT NULL DEFAULT '[]',
            record_labels_confirmed INTEGER NOT NULL DEFAULT 0,
            publisher_independent INTEGER NOT NULL DEFAULT 0,
            publishers TEXT NOT NULL DEFAULT '[]',
            publishers_confirmed INTEGER NOT NULL DEFAULT 0,

            distributor_name TEXT NOT NULL DEFAULT '',
            distributor_confirmed INTEGER NOT NULL DEFAULT 0,
            distributor_contact_name TEXT NOT NULL DEFAULT '',
            distributor_contact_email TEXT NOT NULL DEFAULT '',
            wrote_composition INTEGER,
            pro_name TEXT NOT NULL DEFAULT '',
            pro_confirmed INTEGER NOT NULL DEFAULT 0,
            pro_contact_name TEXT NOT NULL DEFAULT '',
            pro_contact_email TEXT NOT NULL DEFAULT '',
            mcs_name TEXT NOT NULL DEFAULT '',
            mcs_confirmed INTEGER NOT NULL DEFAULT 0,
            mcs_contact_name TEXT NOT NULL DEFAULT '',
            mcs_contact_email TEXT NOT NULL DEFAULT '',

            cover_artwork_url TEXT,
            cover_caption TEXT NOT NULL DEFAULT '',

            terms_distribution INTEGER NOT NULL DEFAULT 0,
            terms_rights INTEGER NOT NULL DEFAULT 0,
            terms_privacy INTEGER NOT NULL DEFAULT 0,
            confirm_accuracy INTEGER NOT NULL DEFAULT 0,
            confirm_ownership INTEGER NOT NULL DEFAULT 0,
            confirm_review INTEGER NOT NULL DEFAULT 0,
            signatory_role TEXT,
            signature_name TEXT NOT NULL DEFAULT '',
            signature_email TEXT NOT NULL DEFAULT '',

            submitted_at TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_music_releases_user ON music_releases(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// One row per track slot, keyed by (release, position)
pub async fn create_music_tracks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS music_tracks (
            release_id TEXT NOT NULL REFERENCES music_releases(id) ON DELETE CASCADE,
            track_number INTEGER NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            version TEXT NOT NULL DEFAULT '',
            isrc TEXT NOT NULL DEFAULT '',
            isrc_confirmed INTEGER NOT NULL DEFAULT 0,
            iswc TEXT NOT NULL DEFAULT '',
            iswc_confirmed INTEGER NOT NULL DEFAULT 0,
            musical_work_title TEXT NOT NULL DEFAULT '',
            primary_artists TEXT NOT NULL DEFAULT '[]',
            featured_artists TEXT NOT NULL DEFAULT '[]',
            session_artists TEXT NOT NULL DEFAULT '[]',
            creators TEXT NOT NULL DEFAULT '[]',
            producers TEXT NOT NULL DEFAULT '[]',
            cover_rights TEXT NOT NULL DEFAULT 'not_applicable',
            cover_rights_proof_url TEXT,
            remix_rights TEXT NOT NULL DEFAULT 'not_applicable',
            remix_rights_proof_url TEXT,
            sample_rights TEXT NOT NULL DEFAULT 'not_applicable',
            sample_rights_proof_url TEXT,
            genres TEXT NOT NULL DEFAULT '[]',
            moods TEXT NOT NULL DEFAULT '[]',
            languages TEXT NOT NULL DEFAULT '[]',
            explicit_content TEXT,
            child_safe_content TEXT,
            audio_url TEXT,
            duration_seconds INTEGER,
            lyrics_text TEXT NOT NULL DEFAULT '',
            lyrics_url TEXT,
            video_url TEXT,
            preview_start_seconds INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (release_id, track_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_release_invites_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS music_release_invites (
            id TEXT PRIMARY KEY,
            release_id TEXT NOT NULL REFERENCES music_releases(id) ON DELETE CASCADE,
            invited_by TEXT NOT NULL,
            email TEXT NOT NULL,
            role TEXT NOT NULL,
            message TEXT NOT NULL DEFAULT '',
            token TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (release_id, email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Client-side error reports (no foreign keys: reports may reference drafts
/// that were never saved)
pub async fn create_release_errors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS music_release_errors (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            release_id TEXT,
            step TEXT,
            message TEXT NOT NULL,
            context TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
