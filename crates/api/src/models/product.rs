//! Product catalog model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use steeped_core::ProductId;

/// A catalog entry: a beverage with provenance and tasting metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub ingredients: Option<String>,
    pub origin: Option<String>,
    pub tasting_notes: Option<String>,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}
