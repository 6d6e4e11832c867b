//! Cart mutation handlers.
//!
//! Each mutation delegates to [`CartRepository`], which wraps the write and
//! the total recompute in one transaction, and answers with the updated
//! cart total so clients never re-derive it.

use axum::extract::State;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use steeped_core::{ProductId, UserId};

use crate::db::{CartRepository, ProductRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Cart upsert request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdateRequest {
    product_id: i32,
    quantity: i32,
}

/// `POST /users/{user_id}/cart` - upsert a cart line.
///
/// A quantity of zero removes the line; negative or non-numeric input is a
/// validation error.
#[instrument(skip(state, user_id, payload))]
pub async fn update(
    State(state): State<AppState>,
    user_id: std::result::Result<Path<i32>, PathRejection>,
    payload: std::result::Result<Json<CartUpdateRequest>, JsonRejection>,
) -> Result<Response> {
    let Path(user_id) = user_id
        .map_err(|_| AppError::Validation("Invalid user ID".to_string()))?;
    let Json(body) = payload
        .map_err(|_| AppError::Validation("Invalid product ID or quantity".to_string()))?;

    if body.quantity < 0 {
        return Err(AppError::Validation(
            "Invalid product ID or quantity".to_string(),
        ));
    }

    let user_id = UserId::new(user_id);
    let product_id = ProductId::new(body.product_id);

    if !UserRepository::new(state.pool()).exists(user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    if !ProductRepository::new(state.pool()).exists(product_id).await? {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let total = CartRepository::new(state.pool())
        .upsert(user_id, product_id, body.quantity)
        .await?;

    Ok(ApiResponse::ok(
        "Cart updated successfully",
        json!({
            "productId": product_id,
            "quantity": body.quantity,
            "totalAmount": total,
        }),
    ))
}

/// Cart removal response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartRemoveResponse {
    product_id: ProductId,
    total_amount: rust_decimal::Decimal,
}

/// `DELETE /users/{user_id}/cart/{product_id}` - remove a cart line.
#[instrument(skip(state, path))]
pub async fn remove(
    State(state): State<AppState>,
    path: std::result::Result<Path<(i32, i32)>, PathRejection>,
) -> Result<Response> {
    let Path((user_id, product_id)) = path
        .map_err(|_| AppError::Validation("Invalid user ID or product ID".to_string()))?;

    let total = CartRepository::new(state.pool())
        .remove(UserId::new(user_id), ProductId::new(product_id))
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("Product not found in cart".to_string())
            }
            other => AppError::Database(other),
        })?;

    Ok(ApiResponse::ok(
        "Product removed from cart successfully",
        CartRemoveResponse {
            product_id: ProductId::new(product_id),
            total_amount: total,
        },
    ))
}
