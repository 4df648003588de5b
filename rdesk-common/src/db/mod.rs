//! SQLite persistence: schema and row mapping
//!
//! Rows are mapped by hand with `row.get`. List-valued model fields live in
//! JSON text columns; enum fields are stored as their canonical strings.

pub mod error_reports;
pub mod init;
pub mod invites;
pub mod profiles;
pub mod releases;
pub mod sessions;
pub mod tracks;

pub use init::*;

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use std::str::FromStr;
use tracing::warn;

use crate::Result;

/// `INSERT ... ON CONFLICT (...) DO UPDATE` for a fixed column list
///
/// Bind values in `columns` order. Key columns are not updated.
pub(crate) fn upsert_sql(table: &str, columns: &[&str], conflict_keys: &[&str]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    let updates = columns
        .iter()
        .filter(|c| !conflict_keys.contains(c))
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders}) \
         ON CONFLICT ({}) DO UPDATE SET {updates}, updated_at = CURRENT_TIMESTAMP",
        columns.join(", "),
        conflict_keys.join(", "),
    )
}

pub(crate) fn to_json_text<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Parse a JSON text column, falling back to the default on bad data
pub(crate) fn from_json_text<T: DeserializeOwned + Default>(raw: &str, column: &str) -> T {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Unreadable JSON in column {}: {}", column, e);
            T::default()
        }
    }
}

/// Read a JSON text column from `row`
pub(crate) fn json_column<T: DeserializeOwned + Default>(row: &SqliteRow, column: &str) -> T {
    let raw: String = row.get(column);
    from_json_text(&raw, column)
}

/// Parse an optional enum column; unknown values are logged and dropped
pub(crate) fn parse_enum_column<T: FromStr>(raw: Option<String>, column: &str) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Unknown value {:?} in column {}", raw, column);
            None
        }
    }
}

/// Non-negative integer column into `u32`
pub(crate) fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
