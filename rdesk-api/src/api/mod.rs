//! HTTP API handlers for rdesk-api

pub mod error_reports;
pub mod health;
pub mod invites;
pub mod lookup;
pub mod profile;
pub mod releases;
pub mod session;
pub mod upload;

pub use error_reports::error_report_routes;
pub use health::health_routes;
pub use invites::invite_routes;
pub use lookup::lookup_routes;
pub use profile::profile_routes;
pub use releases::release_routes;
pub use session::session_routes;
pub use upload::upload_routes;
