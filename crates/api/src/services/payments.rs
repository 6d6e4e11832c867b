//! Payment gateway client.
//!
//! Wraps the hosted gateway's REST API: creates remote payment intents and
//! verifies the HMAC signature the gateway attaches to checkout callbacks.
//! Requests carry a bounded timeout; intent creation retries once on a
//! connect/timeout failure and never thereafter.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, instrument, warn};

use crate::config::PaymentConfig;
use crate::error::ErrorCode;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("gateway request failed: {0}")]
    Request(String),

    /// Failed to parse the gateway response.
    #[error("gateway response error: {0}")]
    Response(String),

    /// Gateway rejected the request.
    #[error("gateway error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Amount cannot be represented in the gateway's minor units.
    #[error("unrepresentable amount: {0}")]
    Amount(Decimal),
}

impl PaymentError {
    /// Error code exposed to clients.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Request(_) | Self::Response(_) | Self::Api { .. } => ErrorCode::UpstreamError,
            Self::Amount(_) => ErrorCode::ValidationError,
        }
    }

    /// Client-facing message; gateway detail stays server-side.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Request(_) | Self::Response(_) | Self::Api { .. } => {
                "Payment provider error".to_string()
            }
            Self::Amount(_) => "Invalid amount".to_string(),
        }
    }
}

/// A remote payment intent issued by the gateway.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    /// Provider-issued handle for the pending charge.
    pub id: String,
    /// Amount in the currency's major unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
}

#[derive(Debug, Serialize)]
struct CreateIntentRequest<'a> {
    /// Amount in minor units, as the gateway expects.
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CreateIntentResponse {
    id: String,
    amount: i64,
    currency: String,
}

/// Client for the hosted payment gateway.
#[derive(Clone)]
pub struct PaymentClient {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: SecretString,
    currency: String,
}

impl std::fmt::Debug for PaymentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentClient")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl PaymentClient {
    /// Create a new gateway client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Request` if the HTTP client cannot be built.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            currency: config.currency.clone(),
        })
    }

    /// Create a remote payment intent for `amount` (major units).
    ///
    /// Retries once if the first attempt fails to connect or times out;
    /// gateway-side rejections are never retried.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Amount` if the amount has no minor-unit
    /// representation, and request/response variants for transport faults.
    #[instrument(skip(self, notes), fields(receipt = %receipt))]
    pub async fn create_intent(
        &self,
        amount: Decimal,
        receipt: &str,
        notes: &HashMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError> {
        let minor_units = (amount * Decimal::from(100))
            .round()
            .to_i64()
            .ok_or(PaymentError::Amount(amount))?;

        let body = CreateIntentRequest {
            amount: minor_units,
            currency: &self.currency,
            receipt,
            notes,
        };

        let response = match self.post_intent(&body).await {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() => {
                warn!(error = %e, "Gateway intent creation failed, retrying once");
                self.post_intent(&body)
                    .await
                    .map_err(|e| PaymentError::Request(e.to_string()))?
            }
            Err(e) => return Err(PaymentError::Request(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let intent: CreateIntentResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Response(e.to_string()))?;

        debug!(intent_id = %intent.id, "Payment intent created");

        Ok(PaymentIntent {
            id: intent.id,
            amount: Decimal::from(intent.amount) / Decimal::from(100),
            currency: intent.currency,
        })
    }

    async fn post_intent(
        &self,
        body: &CreateIntentRequest<'_>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(body)
            .send()
            .await
    }

    /// Verify a checkout callback signature.
    ///
    /// The gateway signs `"{order_id}|{payment_id}"` with the key secret
    /// using HMAC-SHA256 and sends the hex digest. Comparison is constant
    /// time via the MAC's own verification.
    #[must_use]
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };

        let Ok(mut mac) = HmacSha256::new_from_slice(self.key_secret.expose_secret().as_bytes())
        else {
            return false;
        };
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn test_client(secret: &str) -> PaymentClient {
        PaymentClient::new(&PaymentConfig {
            base_url: "https://gateway.invalid".to_string(),
            key_id: "rzp_test_key".to_string(),
            key_secret: SecretString::from(secret.to_string()),
            currency: "INR".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_signature_accepts_valid() {
        let client = test_client("gateway-secret");
        let sig = sign("gateway-secret", "order_abc123", "pay_xyz789");
        assert!(client.verify_signature("order_abc123", "pay_xyz789", &sig));
    }

    #[test]
    fn test_verify_signature_rejects_tampered() {
        let client = test_client("gateway-secret");
        let sig = sign("gateway-secret", "order_abc123", "pay_xyz789");

        // Tampered payment id
        assert!(!client.verify_signature("order_abc123", "pay_other", &sig));
        // Tampered order id
        assert!(!client.verify_signature("order_other", "pay_xyz789", &sig));
        // Signed with the wrong secret
        let wrong = sign("other-secret", "order_abc123", "pay_xyz789");
        assert!(!client.verify_signature("order_abc123", "pay_xyz789", &wrong));
    }

    #[test]
    fn test_verify_signature_rejects_malformed_hex() {
        let client = test_client("gateway-secret");
        assert!(!client.verify_signature("order_abc123", "pay_xyz789", "not-hex!"));
        assert!(!client.verify_signature("order_abc123", "pay_xyz789", ""));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PaymentError::Request("timeout".to_string()).code(),
            ErrorCode::UpstreamError
        );
        assert_eq!(
            PaymentError::Amount(Decimal::MAX).code(),
            ErrorCode::ValidationError
        );
    }

    #[test]
    fn test_client_message_is_opaque() {
        let err = PaymentError::Api {
            status: 401,
            body: "key_id rzp_live_abc is invalid".to_string(),
        };
        assert_eq!(err.client_message(), "Payment provider error");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let client = test_client("very-secret-key");
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("very-secret-key"));
    }
}
