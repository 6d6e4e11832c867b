//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::auth::{AuthError, IdentityVerifier, TokenService};
use crate::services::email::EmailService;
use crate::services::payments::{PaymentClient, PaymentError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("payment client: {0}")]
    Payment(#[from] PaymentError),
    #[error("identity verifier: {0}")]
    Identity(#[from] AuthError),
    #[error("email service: {0}")]
    Email(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the connection pool and
/// the outbound service clients built from the configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    payments: PaymentClient,
    tokens: TokenService,
    identity: IdentityVerifier,
    email: Option<EmailService>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The email sink is only constructed when SMTP is configured;
    /// everything else is required.
    ///
    /// # Errors
    ///
    /// Returns an error if any service client cannot be built.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, StateError> {
        let payments = PaymentClient::new(&config.payment)?;
        let tokens = TokenService::new(&config.token_secret, config.token_ttl);
        let identity = IdentityVerifier::new(
            config.identity_tokeninfo_url.clone(),
            config.payment.timeout,
        )?;
        let email = config.email.as_ref().map(EmailService::new).transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                pool,
                payments,
                tokens,
                identity,
                email,
            }),
        })
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }

    /// Get a reference to the session token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get a reference to the identity verifier.
    #[must_use]
    pub fn identity(&self) -> &IdentityVerifier {
        &self.inner.identity
    }

    /// Get the email sink, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}
