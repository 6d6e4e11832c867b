//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (verifies database)
//!
//! # Catalog
//! GET  /products                        - Paginated, filterable product listing
//!
//! # Cart
//! POST   /users/{user_id}/cart              - Upsert a cart line, returns new total
//! DELETE /users/{user_id}/cart/{product_id} - Remove a cart line, returns new total
//!
//! # Checkout
//! POST /payments/create-order           - Create a gateway payment intent + local order
//! POST /payments/verify                 - Verify a checkout callback signature
//!
//! # Identity
//! POST /users/google                    - Exchange an identity token for a session token
//!
//! # Admin (admin-role bearer token required)
//! GET    /orders                        - Filterable denormalized order listing
//! PATCH  /orders/{order_id}             - Order status transition
//! GET    /reviews                       - Filterable, sortable review listing
//! PATCH  /reviews/{review_id}           - Review moderation transition
//! DELETE /reviews/{review_id}           - Review removal
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod payments;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list))
        .route("/users/google", post(auth::google_exchange))
        .route("/users/{user_id}/cart", post(cart::update))
        .route("/users/{user_id}/cart/{product_id}", delete(cart::remove))
        .route("/payments/create-order", post(payments::create_order))
        .route("/payments/verify", post(payments::verify))
        .merge(admin_routes())
}

/// Moderation endpoints; each handler is gated by the `RequireAdmin`
/// extractor.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::orders::list))
        .route("/orders/{order_id}", patch(admin::orders::update_status))
        .route("/reviews", get(admin::reviews::list))
        .route(
            "/reviews/{review_id}",
            patch(admin::reviews::update_status).delete(admin::reviews::remove),
        )
}
