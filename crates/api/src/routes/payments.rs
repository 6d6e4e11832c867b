//! Checkout handlers: payment intent creation and callback verification.

use std::collections::HashMap;

use axum::extract::{Json, State};
use axum::response::Response;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};

use crate::db::{ConfirmOutcome, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::OptionalUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Intent creation request body.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    amount: Decimal,
    receipt: String,
    #[serde(default)]
    notes: HashMap<String, String>,
}

/// `POST /payments/create-order` - create a gateway payment intent and a
/// local order in `created` status linked to it.
///
/// The order is attributed to the requesting user when a valid bearer
/// token accompanies the request; guest checkouts persist without one.
#[instrument(skip(state, user, body))]
pub async fn create_order(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Response> {
    if body.amount <= Decimal::ZERO || body.receipt.is_empty() {
        return Err(AppError::Validation(
            "Amount and receipt are required".to_string(),
        ));
    }

    let intent = state
        .payments()
        .create_intent(body.amount, &body.receipt, &body.notes)
        .await?;

    let user_id = user.map(|claims| claims.user_id());
    OrderRepository::new(state.pool())
        .create(user_id, body.amount, &intent.id)
        .await?;

    Ok(ApiResponse::created(
        "Order created successfully",
        json!({
            "orderId": intent.id,
            "amount": intent.amount,
            "currency": intent.currency,
        }),
    ))
}

/// Verification request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    order_id: String,
    payment_id: String,
    signature: String,
}

/// `POST /payments/verify` - verify a checkout callback signature and
/// confirm the linked order.
///
/// A signature mismatch changes nothing and returns 400. A repeated valid
/// verification is idempotent: the order stays confirmed and no second
/// confirmation email is dispatched.
#[instrument(skip(state, body))]
pub async fn verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyRequest>,
) -> Result<Response> {
    if !state
        .payments()
        .verify_signature(&body.order_id, &body.payment_id, &body.signature)
    {
        return Err(AppError::Validation(
            "Invalid payment verification".to_string(),
        ));
    }

    let outcome = OrderRepository::new(state.pool())
        .confirm_by_provider_id(&body.order_id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Order not found".to_string())
            }
            other => AppError::Database(other),
        })?;

    let message = match outcome {
        ConfirmOutcome::Confirmed(confirmed) => {
            if let (Some(email_service), Some(customer_email)) =
                (state.email(), confirmed.customer_email)
            {
                // Best-effort: delivery failure never fails the request
                let email_service = email_service.clone();
                let order_ref = body.order_id.clone();
                tokio::spawn(async move {
                    if let Err(e) = email_service
                        .send_order_confirmation(&customer_email, &order_ref)
                        .await
                    {
                        warn!(error = %e, order = %order_ref, "Confirmation email failed");
                    }
                });
            }
            "Payment verified successfully"
        }
        ConfirmOutcome::AlreadyConfirmed(_) => "Payment already verified",
        ConfirmOutcome::NotConfirmable(status) => {
            return Err(AppError::Validation(format!(
                "order cannot be confirmed from status {status}"
            )));
        }
    };

    Ok(ApiResponse::ok(
        message,
        json!({
            "orderId": body.order_id,
            "paymentId": body.payment_id,
        }),
    ))
}
