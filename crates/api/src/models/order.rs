//! Order lifecycle models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use steeped_core::{Email, OrderId, OrderStatus, ProductId, UserId};

/// A persisted record of intent to purchase.
///
/// Created in [`OrderStatus::Created`] when a payment intent is requested;
/// `provider_order_id` links it to the gateway's intent so verification can
/// find it without assuming id equality.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub provider_order_id: Option<String>,
    pub order_date: DateTime<Utc>,
}

/// Order joined with its owner's email, used after payment verification to
/// dispatch the confirmation mail.
#[derive(Debug, Clone)]
pub struct OrderWithCustomer {
    pub order: Order,
    pub customer_email: Option<Email>,
}

/// A line of an admin order projection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i32,
}

/// Denormalized order row for the admin console.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderRow {
    pub order_id: OrderId,
    pub customer_name: Option<String>,
    pub items: Vec<AdminOrderItem>,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}
