//! Domain models shared by repositories and route handlers.

pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use order::{AdminOrderItem, AdminOrderRow, Order, OrderWithCustomer};
pub use product::Product;
pub use review::{AdminReviewRow, Review};
pub use user::User;
