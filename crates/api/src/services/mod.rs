//! Outbound service clients: payment gateway, identity provider, token
//! issuance, and the confirmation email sink.

pub mod auth;
pub mod email;
pub mod payments;

pub use auth::{Claims, IdentityVerifier, TokenService};
pub use email::EmailService;
pub use payments::{PaymentClient, PaymentIntent};
