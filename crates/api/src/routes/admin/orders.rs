//! Admin order listing and status transitions.

use axum::extract::{Json, Path, Query, State};
use axum::response::Response;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use steeped_core::{OrderId, OrderStatus};

use crate::db::{AdminOrderFilter, OrderRepository, RepositoryError, TransitionOutcome};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Order listing query parameters.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    status: Option<String>,
    date: Option<String>,
    customer: Option<String>,
}

/// `GET /orders` - denormalized order listing with optional status, date
/// and customer-name filters.
#[instrument(skip(state))]
pub async fn list(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Response> {
    let status = query
        .status
        .map(|s| s.parse::<OrderStatus>())
        .transpose()
        .map_err(|_| AppError::Validation("Invalid order status".to_string()))?;

    let date = query
        .date
        .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::Validation("Invalid date, expected YYYY-MM-DD".to_string()))?;

    let filter = AdminOrderFilter {
        status,
        date,
        customer: query.customer,
    };

    let orders = OrderRepository::new(state.pool()).admin_list(&filter).await?;

    Ok(ApiResponse::ok("Orders fetched successfully", orders))
}

/// Status transition request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    status: String,
}

/// `PATCH /orders/{order_id}` - apply an order status transition.
///
/// Transitions outside the lifecycle table are rejected without touching
/// the row.
#[instrument(skip(state, body))]
pub async fn update_status(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Response> {
    let next: OrderStatus = body
        .status
        .parse()
        .map_err(|_| AppError::Validation("Invalid order status".to_string()))?;

    let outcome = OrderRepository::new(state.pool())
        .transition(OrderId::new(order_id), next)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order not found".to_string()),
            other => AppError::Database(other),
        })?;

    match outcome {
        TransitionOutcome::Applied(order) => Ok(ApiResponse::ok(
            "Order status updated successfully",
            json!({
                "orderId": order.id,
                "status": order.status,
            }),
        )),
        TransitionOutcome::Invalid(current) => Err(AppError::Validation(format!(
            "cannot change order status from {current} to {next}"
        ))),
    }
}
