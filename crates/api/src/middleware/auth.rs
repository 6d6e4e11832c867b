//! Authentication extractors.
//!
//! Session tokens arrive as `Authorization: Bearer <jwt>`. The admin guard
//! lives here once; handlers never repeat inline role checks.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Claims;
use crate::state::AppState;

/// Extractor that requires an admin-role session.
///
/// A missing, invalid, or non-admin token rejects with 403 and no data,
/// matching the moderation endpoints' contract.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)
            .ok_or_else(|| AppError::Forbidden("Unauthorized access".to_string()))?;

        if !claims.role.is_admin() {
            return Err(AppError::Forbidden("Unauthorized access".to_string()));
        }

        Ok(Self(claims))
    }
}

/// Extractor that optionally resolves the current user.
///
/// Unlike [`RequireAdmin`], this never rejects: an absent or invalid token
/// yields `None`.
pub struct OptionalUser(pub Option<Claims>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(bearer_claims(parts, state)))
    }
}

/// Pull and verify the bearer token, if any.
fn bearer_claims(parts: &Parts, state: &AppState) -> Option<Claims> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))?;

    state.tokens().verify(token).ok()
}
