//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use steeped_core::{Email, UserId, UserRole};

/// A registered user account.
///
/// Accounts are provisioned through the identity exchange endpoint; the
/// username defaults to the email local-part when not supplied.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}
