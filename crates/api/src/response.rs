//! JSON response envelope.
//!
//! Every endpoint answers `{ success, message, data? }`; error responses add
//! a machine-readable `code` (see [`crate::error`]).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Success envelope wrapping a payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK envelope.
    pub fn ok(message: impl Into<String>, data: T) -> Response {
        Self::with_status(StatusCode::OK, message, data)
    }

    /// 201 Created envelope.
    pub fn created(message: impl Into<String>, data: T) -> Response {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> Response {
        let body = Self {
            success: true,
            message: message.into(),
            data: Some(data),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_shape() {
        let body = ApiResponse {
            success: true,
            message: "Cart updated successfully".to_string(),
            data: Some(serde_json::json!({ "productId": 3, "quantity": 2 })),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Cart updated successfully");
        assert_eq!(json["data"]["productId"], 3);
    }

    #[test]
    fn test_data_omitted_when_none() {
        let body: ApiResponse<()> = ApiResponse {
            success: true,
            message: "ok".to_string(),
            data: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_created_status() {
        let resp = ApiResponse::created("Order created successfully", serde_json::json!({}));
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_monetary_amounts_serialize_as_strings() {
        // Decimal wire fields are strings, not floats; clients parse them.
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Totals {
            total_amount: rust_decimal::Decimal,
        }

        let body = ApiResponse {
            success: true,
            message: "Cart updated successfully".to_string(),
            data: Some(Totals {
                total_amount: rust_decimal::Decimal::new(2500, 2),
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["data"]["totalAmount"], "25.00");
    }
}
