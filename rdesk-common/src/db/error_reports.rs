//! Client-side error reports sent by the wizard

use sqlx::{Row, SqlitePool};
use tracing::warn;
use uuid::Uuid;

use super::to_json_text;
use crate::model::ErrorReport;
use crate::{Error, Result};

/// Longest message kept; longer reports are truncated
pub const MAX_REPORT_MESSAGE_CHARS: usize = 4000;

/// Store a report and return its id
pub async fn record_error_report(
    pool: &SqlitePool,
    user_id: Option<&str>,
    report: &ErrorReport,
) -> Result<Uuid> {
    let message = report.message.trim();
    if message.is_empty() {
        return Err(Error::InvalidInput("error report message is required".into()));
    }
    let message: String = message.chars().take(MAX_REPORT_MESSAGE_CHARS).collect();

    let context = if report.context.is_null() {
        "{}".to_string()
    } else {
        to_json_text(&report.context)?
    };

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO music_release_errors (id, user_id, release_id, step, message, context)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(user_id)
    .bind(report.release_id.map(|r| r.to_string()))
    .bind(report.step.as_deref())
    .bind(&message)
    .bind(context)
    .execute(pool)
    .await?;

    warn!(
        "Client error report {} (release {:?}, step {:?}): {}",
        id, report.release_id, report.step, message
    );
    Ok(id)
}

pub async fn count_error_reports(pool: &SqlitePool, release_id: Uuid) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM music_release_errors WHERE release_id = ?")
        .bind(release_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(row.get("n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;
    use serde_json::json;

    #[tokio::test]
    async fn test_report_stored_without_release_row() {
        let pool = init_memory_database().await.unwrap();
        let release_id = Uuid::new_v4();

        let report = ErrorReport {
            release_id: Some(release_id),
            step: Some("tracks".into()),
            message: "upload failed: 502".into(),
            context: json!({"track": 2}),
        };
        record_error_report(&pool, Some("user-1"), &report).await.unwrap();
        record_error_report(&pool, None, &report).await.unwrap();

        assert_eq!(count_error_reports(&pool, release_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_blank_message_rejected_and_long_message_truncated() {
        let pool = init_memory_database().await.unwrap();
        let blank = ErrorReport::default();
        assert!(record_error_report(&pool, None, &blank).await.is_err());

        let long = ErrorReport {
            message: "x".repeat(MAX_REPORT_MESSAGE_CHARS + 50),
            ..Default::default()
        };
        let id = record_error_report(&pool, None, &long).await.unwrap();
        let sql = "SELECT message FROM music_release_errors WHERE id = ?";
        let stored: String = sqlx::query_scalar(sql)
            .bind(id.to_string())
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored.len(), MAX_REPORT_MESSAGE_CHARS);
    }
}
