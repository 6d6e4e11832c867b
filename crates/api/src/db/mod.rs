//! Database operations for the Steeped `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `users` - Accounts provisioned through the identity exchange
//! - `products` - Beverage catalog
//! - `cart_items` - Per-user product/quantity mapping, unique per (user, product)
//! - `orders` / `order_items` - Purchase lifecycle records
//! - `reviews` - Customer reviews under moderation
//!
//! Queries use the runtime sqlx API (`query_as`/`QueryBuilder`) so the
//! workspace builds without a live database. Multi-step mutations (cart
//! upsert/removal plus total recompute, order confirmation) run inside
//! explicit transactions.
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p steeped-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod cart;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

pub use cart::CartRepository;
pub use orders::{AdminOrderFilter, ConfirmOutcome, OrderRepository, TransitionOutcome};
pub use products::{ProductListFilter, ProductRepository};
pub use reviews::{AdminReviewFilter, ReviewRepository, ReviewSortField, SortDirection};
pub use users::UserRepository;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
