//! HTTP middleware for admin.
//!
//! The stack, outermost first: Sentry, `TraceLayer`, request id. Every
//! `/api` route additionally takes the [`RequireAdminToken`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::RequireAdminToken;
pub use request_id::request_id_middleware;
