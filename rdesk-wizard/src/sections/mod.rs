//! Per-step form helpers
//!
//! Each module turns user input into [`ReleaseAction`](crate::reducer::ReleaseAction)s
//! and derives inline messages from a draft. The ones that talk to the
//! backend take it as `&dyn ReleaseBackend` and never fail hard.

pub mod artwork;
pub mod date;
pub mod geography;
pub mod registration;
pub mod release_type;
pub mod rights;
pub mod royalties;
pub mod submit;
pub mod tracks;
