//! Release submission wizard
//!
//! Client-side state machine for building a release draft step by step:
//! a reducer over [`rdesk_common::model::ReleaseData`], a controller that
//! gates navigation and debounces autosave, and per-step form helpers.
//! The server is reached through [`client::ReleaseBackend`].

pub mod autosave;
pub mod client;
pub mod controller;
#[cfg(test)]
mod fake;
pub mod notice;
pub mod reducer;
pub mod sections;

pub use autosave::{Clock, ManualClock, SystemClock};
pub use client::{ClientError, HttpBackend, ReleaseBackend};
pub use controller::{NavigationError, SubmitError, WizardController};
pub use notice::{Notice, NoticeLevel};
pub use reducer::{reduce, ReleaseAction, Term, TrackAction};
