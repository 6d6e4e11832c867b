//! Session tokens and identity-provider exchange.
//!
//! One flow, one payload, one expiry: an external identity token (or a
//! pre-verified email/name pair) is exchanged for a local account and an
//! HS256 session token carrying `{sub, email, role, exp}`.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use steeped_core::{Email, UserId, UserRole};

use crate::error::ErrorCode;
use crate::models::User;

/// Errors from token issuance or identity verification.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The external identity token did not verify.
    #[error("invalid identity token: {0}")]
    InvalidIdentityToken(String),

    /// The identity provider could not be reached.
    #[error("identity provider request failed: {0}")]
    ProviderUnavailable(String),

    /// The session token is missing, malformed, or expired.
    #[error("invalid session token: {0}")]
    InvalidSessionToken(String),

    /// Token could not be signed.
    #[error("token issuance failed: {0}")]
    Issuance(String),
}

impl AuthError {
    /// Error code exposed to clients.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidIdentityToken(_) => ErrorCode::ValidationError,
            Self::ProviderUnavailable(_) => ErrorCode::UpstreamError,
            Self::InvalidSessionToken(_) => ErrorCode::Unauthorized,
            Self::Issuance(_) => ErrorCode::InternalError,
        }
    }

    /// Client-facing message; provider detail stays server-side.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidIdentityToken(_) => "Invalid identity token".to_string(),
            Self::ProviderUnavailable(_) => "Identity provider error".to_string(),
            Self::InvalidSessionToken(_) => "Invalid or expired session".to_string(),
            Self::Issuance(_) => "Internal server error".to_string(),
        }
    }
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    /// Account email.
    pub email: String,
    /// Role, gates the admin endpoints.
    pub role: UserRole,
    /// Expiry as a UTC timestamp.
    pub exp: u64,
    /// Issued-at as a UTC timestamp.
    pub iat: u64,
}

impl Claims {
    /// Typed user id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }
}

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from the signing secret and expiry policy.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl,
        }
    }

    /// Issue a session token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Issuance` if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: user.id.as_i32(),
            email: user.email.to_string(),
            role: user.role,
            exp: now + self.ttl.as_secs(),
            iat: now,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Issuance(e.to_string()))
    }

    /// Verify a session token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidSessionToken` for a malformed, forged, or
    /// expired token.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AuthError::InvalidSessionToken("expired".to_string())
                }
                _ => AuthError::InvalidSessionToken(e.to_string()),
            })
    }
}

/// A verified external identity.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub email: Email,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfoResponse {
    email: Option<String>,
    name: Option<String>,
}

/// Verifies external identity tokens against the provider's tokeninfo
/// endpoint.
#[derive(Debug, Clone)]
pub struct IdentityVerifier {
    client: Client,
    tokeninfo_url: String,
}

impl IdentityVerifier {
    /// Create a verifier for the configured introspection endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProviderUnavailable` if the HTTP client cannot
    /// be built.
    pub fn new(tokeninfo_url: String, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            tokeninfo_url,
        })
    }

    /// Verify an identity token and extract the subject's email and name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidIdentityToken` for a rejected token or a
    /// response without an email, `AuthError::ProviderUnavailable` for
    /// transport faults.
    #[instrument(skip(self, token))]
    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidIdentityToken(format!(
                "provider returned {}",
                response.status()
            )));
        }

        let info: TokenInfoResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        let email = info
            .email
            .as_deref()
            .ok_or_else(|| AuthError::InvalidIdentityToken("no email in token".to_string()))?;
        let email = Email::parse(email)
            .map_err(|e| AuthError::InvalidIdentityToken(e.to_string()))?;

        Ok(VerifiedIdentity {
            email,
            name: info.name,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn service(ttl: Duration) -> TokenService {
        TokenService::new(&SecretString::from("k".repeat(48)), ttl)
    }

    fn test_user(role: UserRole) -> User {
        User {
            id: UserId::new(7),
            email: Email::parse("shopper@example.com").unwrap(),
            username: "shopper".to_string(),
            name: Some("Shopper".to_string()),
            role,
            is_verified: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let svc = service(Duration::from_secs(3600));
        let token = svc.issue(&test_user(UserRole::User)).unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.user_id(), UserId::new(7));
        assert_eq!(claims.email, "shopper@example.com");
        assert_eq!(claims.role, UserRole::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_role_survives_roundtrip() {
        let svc = service(Duration::from_secs(3600));
        let token = svc.issue(&test_user(UserRole::Admin)).unwrap();
        assert_eq!(svc.verify(&token).unwrap().role, UserRole::Admin);
    }

    #[test]
    fn test_verify_rejects_forged_token() {
        let svc = service(Duration::from_secs(3600));
        let other = TokenService::new(&SecretString::from("m".repeat(48)), Duration::from_secs(3600));

        let token = other.issue(&test_user(UserRole::Admin)).unwrap();
        assert!(matches!(
            svc.verify(&token),
            Err(AuthError::InvalidSessionToken(_))
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let svc = service(Duration::from_secs(3600));
        assert!(svc.verify("not.a.token").is_err());
        assert!(svc.verify("").is_err());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AuthError::InvalidIdentityToken("x".to_string()).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(
            AuthError::InvalidSessionToken("x".to_string()).code(),
            ErrorCode::Unauthorized
        );
        assert_eq!(
            AuthError::ProviderUnavailable("x".to_string()).code(),
            ErrorCode::UpstreamError
        );
    }
}
