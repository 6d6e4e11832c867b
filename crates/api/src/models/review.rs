//! Product review models.

use serde::Serialize;

use steeped_core::{ProductId, Rating, ReviewId, ReviewStatus, UserId};

/// A customer review awaiting or past moderation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: Rating,
    pub comment: Option<String>,
    pub status: ReviewStatus,
}

/// Denormalized review row for the admin console.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminReviewRow {
    pub review_id: ReviewId,
    pub product_id: ProductId,
    pub product_name: String,
    pub user_id: UserId,
    pub user_name: String,
    pub rating: Rating,
    pub comment: Option<String>,
    pub status: ReviewStatus,
}
