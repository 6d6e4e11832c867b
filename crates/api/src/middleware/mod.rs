//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. `TraceLayer` (request tracing)
//! 2. Request ID (add unique ID to each request)
//!
//! Authentication is handled by extractors ([`RequireAdmin`],
//! [`OptionalUser`]) rather than a layer, so public endpoints carry no
//! session machinery.

pub mod auth;
pub mod request_id;

pub use auth::{OptionalUser, RequireAdmin};
pub use request_id::{make_request_span, request_id_middleware};
