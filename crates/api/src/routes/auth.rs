//! Identity exchange handler.

use axum::extract::{Json, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use steeped_core::Email;

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::models::User;
use crate::response::ApiResponse;
use crate::services::auth::VerifiedIdentity;
use crate::state::AppState;

/// Identity exchange request body.
///
/// Either an identity-provider token or a pre-verified email (with
/// optional display name) from a trusted frontend session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleExchangeRequest {
    google_token: Option<String>,
    email: Option<String>,
    name: Option<String>,
}

/// `POST /users/google` - exchange an external identity for a session token.
///
/// Finds or creates the account by email (username defaults to the email
/// local-part) and issues one HS256 session token with the configured TTL.
#[instrument(skip(state, body))]
pub async fn google_exchange(
    State(state): State<AppState>,
    Json(body): Json<GoogleExchangeRequest>,
) -> Result<Response> {
    let identity = match (body.google_token, body.email) {
        (Some(token), _) => state.identity().verify(&token).await?,
        (None, Some(email)) => {
            let email = Email::parse(&email)
                .map_err(|e| AppError::Validation(e.to_string()))?;
            VerifiedIdentity {
                email,
                name: body.name,
            }
        }
        (None, None) => {
            return Err(AppError::Validation(
                "Missing Google token or email".to_string(),
            ));
        }
    };

    let user = find_or_create(&state, &identity).await?;
    let token = state.tokens().issue(&user)?;

    Ok(ApiResponse::ok(
        "User successfully authenticated",
        json!({
            "user": user,
            "token": token,
        }),
    ))
}

/// Find the account by email, provisioning it on first login.
///
/// A concurrent first login can race the insert; the unique-email conflict
/// resolves by re-reading the winner's row.
async fn find_or_create(state: &AppState, identity: &VerifiedIdentity) -> Result<User> {
    let users = UserRepository::new(state.pool());

    if let Some(user) = users.get_by_email(&identity.email).await? {
        return Ok(user);
    }

    let username = identity.email.local_part().to_string();
    match users
        .create(&identity.email, &username, identity.name.as_deref())
        .await
    {
        Ok(user) => Ok(user),
        Err(RepositoryError::Conflict(_)) => users
            .get_by_email(&identity.email)
            .await?
            .ok_or_else(|| AppError::Internal("user vanished after conflict".to_string())),
        Err(e) => Err(e.into()),
    }
}
