//! Users and session tokens
//!
//! Sign-in itself is handled by an external provider. This module only
//! records who a session token belongs to and until when it is valid.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

pub async fn create_user(pool: &SqlitePool, email: &str, display_name: &str) -> Result<User> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(Error::InvalidInput("email is required".into()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        display_name: display_name.trim().to_string(),
    };

    sqlx::query("INSERT INTO users (id, email, display_name) VALUES (?, ?, ?)")
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .execute(pool)
        .await?;

    info!("Created user {} <{}>", user.id, user.email);
    Ok(user)
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, email, display_name FROM users WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| User {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
    }))
}

/// Issue a new opaque token for `user_id`, valid for `ttl`
pub async fn create_session(
    pool: &SqlitePool,
    user_id: &str,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<String> {
    let token = Uuid::new_v4().simple().to_string();
    let expires_at = (now + ttl).timestamp();

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(token)
}

/// User owning an unexpired `token`
pub async fn find_session_user(
    pool: &SqlitePool,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT u.id, u.email, u.display_name
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ? AND s.expires_at > ?
        "#,
    )
    .bind(token)
    .bind(now.timestamp())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| User {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
    }))
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Drop expired tokens; returns how many were removed
pub async fn purge_expired_sessions(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64> {
    let removed = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now.timestamp())
        .execute(pool)
        .await?
        .rows_affected();
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    #[tokio::test]
    async fn test_session_lookup_honours_expiry() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, " Nova@Example.com ", "Nova").await.unwrap();
        assert_eq!(user.email, "nova@example.com");

        let now = Utc::now();
        let token = create_session(&pool, &user.id, now, Duration::hours(1))
            .await
            .unwrap();

        let found = find_session_user(&pool, &token, now).await.unwrap();
        assert_eq!(found, Some(user));

        let later = now + Duration::hours(2);
        assert!(find_session_user(&pool, &token, later).await.unwrap().is_none());
        assert_eq!(purge_expired_sessions(&pool, later).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_and_deleted_tokens() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "nova@example.com", "Nova").await.unwrap();
        let now = Utc::now();
        let token = create_session(&pool, &user.id, now, Duration::days(1))
            .await
            .unwrap();

        assert!(find_session_user(&pool, "nope", now).await.unwrap().is_none());
        delete_session(&pool, &token).await.unwrap();
        assert!(find_session_user(&pool, &token, now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = init_memory_database().await.unwrap();
        create_user(&pool, "nova@example.com", "Nova").await.unwrap();
        assert!(create_user(&pool, "NOVA@example.com", "Nova again").await.is_err());
        assert!(create_user(&pool, "   ", "Blank").await.is_err());
    }

    #[tokio::test]
    async fn test_find_user_by_email_ignores_case() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "kite@example.com", "Kite").await.unwrap();

        let found = find_user_by_email(&pool, " KITE@example.com").await.unwrap();
        assert_eq!(found, Some(user));
        assert_eq!(find_user_by_email(&pool, "nobody@example.com").await.unwrap(), None);
    }
}
