//! Admin review moderation.

use axum::extract::{Json, Path, Query, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use steeped_core::{ReviewId, ReviewStatus};

use crate::db::{
    AdminReviewFilter, RepositoryError, ReviewRepository, ReviewSortField, SortDirection,
};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Review listing query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsQuery {
    status: Option<String>,
    rating: Option<i32>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

/// `GET /reviews` - denormalized review listing with optional status and
/// rating filters and whitelisted sorting.
#[instrument(skip(state))]
pub async fn list(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Response> {
    let status = query
        .status
        .map(|s| s.parse::<ReviewStatus>())
        .transpose()
        .map_err(|_| AppError::Validation("Invalid review status".to_string()))?;

    if let Some(rating) = query.rating
        && !(1..=5).contains(&rating)
    {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let sort_by = query
        .sort_by
        .map(|s| s.parse::<ReviewSortField>())
        .transpose()
        .map_err(|_| AppError::Validation("Invalid sort field".to_string()))?
        .unwrap_or_default();

    let sort_order = query
        .sort_order
        .map(|s| s.parse::<SortDirection>())
        .transpose()
        .map_err(|_| AppError::Validation("Invalid sort order".to_string()))?
        .unwrap_or_default();

    let filter = AdminReviewFilter {
        status,
        rating: query.rating,
        sort_by,
        sort_order,
    };

    let reviews = ReviewRepository::new(state.pool()).admin_list(&filter).await?;

    Ok(ApiResponse::ok("Reviews fetched successfully", reviews))
}

/// Moderation transition request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    status: String,
}

/// `PATCH /reviews/{review_id}` - apply a moderation transition.
///
/// The current status is read first so an out-of-table transition is
/// rejected without writing.
#[instrument(skip(state, body))]
pub async fn update_status(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(review_id): Path<i32>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Response> {
    let next: ReviewStatus = body
        .status
        .parse()
        .map_err(|_| AppError::Validation("Invalid review status".to_string()))?;

    let review_id = ReviewId::new(review_id);
    let repo = ReviewRepository::new(state.pool());

    let review = repo
        .get_by_id(review_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    if !review.status.can_transition_to(next) {
        return Err(AppError::Validation(format!(
            "cannot change review status from {} to {next}",
            review.status
        )));
    }

    repo.set_status(review_id, next).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::NotFound("Review not found".to_string()),
        other => AppError::Database(other),
    })?;

    Ok(ApiResponse::ok(
        "Review status updated successfully",
        json!({
            "reviewId": review_id,
            "status": next,
        }),
    ))
}

/// `DELETE /reviews/{review_id}` - remove a review entirely.
#[instrument(skip(state))]
pub async fn remove(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(review_id): Path<i32>,
) -> Result<Response> {
    let review_id = ReviewId::new(review_id);

    ReviewRepository::new(state.pool())
        .delete(review_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Review not found".to_string()),
            other => AppError::Database(other),
        })?;

    Ok(ApiResponse::ok(
        "Review deleted successfully",
        json!({ "reviewId": review_id }),
    ))
}
