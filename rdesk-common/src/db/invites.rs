//! Collaborator invites on a release

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::{parse_enum_column, releases};
use crate::model::{Invite, InviteRole, NewInvite};
use crate::validators::is_valid_email;
use crate::{Error, Result};

/// Record an invite from the release owner
///
/// Re-inviting the same address updates role and message and keeps the
/// original token.
pub async fn create_invite(
    pool: &SqlitePool,
    invited_by: &str,
    invite: &NewInvite,
) -> Result<Invite> {
    let email = invite.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(Error::InvalidInput(format!("invalid email address: {:?}", invite.email)));
    }

    match releases::release_owner(pool, invite.release_id).await? {
        Some(owner) if owner == invited_by => {}
        _ => return Err(Error::NotFound(format!("Release {}", invite.release_id))),
    }

    let row = sqlx::query(
        r#"
        INSERT INTO music_release_invites (id, release_id, invited_by, email, role, message, token)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (release_id, email) DO UPDATE SET
            role = excluded.role,
            message = excluded.message
        RETURNING id, release_id, email, role, status, token
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(invite.release_id.to_string())
    .bind(invited_by)
    .bind(&email)
    .bind(invite.role.as_str())
    .bind(invite.message.trim())
    .bind(Uuid::new_v4().simple().to_string())
    .fetch_one(pool)
    .await?;

    let stored = invite_from_row(&row)?;
    info!("Invited {} to release {} as {}", stored.email, stored.release_id, stored.role);
    Ok(stored)
}

pub async fn list_invites(pool: &SqlitePool, release_id: Uuid) -> Result<Vec<Invite>> {
    let rows = sqlx::query(
        r#"
        SELECT id, release_id, email, role, status, token
        FROM music_release_invites
        WHERE release_id = ?
        ORDER BY created_at, email
        "#,
    )
    .bind(release_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(invite_from_row).collect()
}

fn parse_uuid(raw: String) -> Result<Uuid> {
    Uuid::parse_str(&raw).map_err(|e| Error::Internal(format!("Bad uuid {:?}: {}", raw, e)))
}

fn invite_from_row(row: &SqliteRow) -> Result<Invite> {
    Ok(Invite {
        id: parse_uuid(row.get("id"))?,
        release_id: parse_uuid(row.get("release_id"))?,
        email: row.get("email"),
        role: parse_enum_column(row.get("role"), "role").unwrap_or(InviteRole::Viewer),
        status: row.get("status"),
        token: row.get("token"),
    })
}
