//! Admin console handlers.
//!
//! Every handler here takes the [`RequireAdmin`](crate::middleware::RequireAdmin)
//! extractor, so a request without an admin-role bearer token is rejected
//! before the handler body runs.

pub mod orders;
pub mod reviews;
