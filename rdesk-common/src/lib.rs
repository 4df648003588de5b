//! # ReleaseDesk Common Library
//!
//! Shared code for the release wizard and the API service:
//! - Identifier validators (GTIN, ISRC, ISWC) and status normalizers
//! - Release, track and artist profile data model
//! - Wizard step definitions and completion predicates
//! - Configuration loading and root folder resolution
//! - SQLite schema and row mapping (feature `sqlx`)

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod model;
pub mod normalize;
pub mod steps;
pub mod validators;

pub use error::{Error, Result};
