//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (reuse or generate `x-request-id`)
//! 4. Rate limiting on `POST /contact` and `/api` (governor)

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::{api_rate_limiter, contact_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
