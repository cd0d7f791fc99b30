//! Authentication extractors for the Conference Central API.
//!
//! - [`AuthenticatedCaller`]: resolves the bearer token to a [`Caller`]; 401 otherwise
//! - [`TaskAuthorized`]: checks `X-Task-Token` on the internal task endpoints; 403 otherwise
//!
//! # Usage
//!
//! ```rust,ignore
//! async fn get_profile(
//!     State(state): State<AppState>,
//!     AuthenticatedCaller(caller): AuthenticatedCaller,
//! ) -> Result<Json<ProfileForm>, AppError> {
//!     Ok(Json(state.service.get_profile(&caller).await?))
//! }
//! ```

use crate::server::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use conference_core::providers::IdentityProvider;
use conference_core::{Caller, ConferenceError, Result, UserId};
use conference_web::{AppError, BearerToken};
use std::sync::Arc;

/// Header carrying the shared secret for `/tasks/*` and `/crons/*`.
pub const TASK_TOKEN_HEADER: &str = "X-Task-Token";

/// Turns bearer tokens into callers.
///
/// When a test token is configured, it authenticates as [`test_caller`]
/// without consulting the identity provider.
#[derive(Clone)]
pub struct Authenticator {
    provider: Arc<dyn IdentityProvider>,
    test_token: Option<String>,
}

impl Authenticator {
    /// Create an authenticator over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            test_token: None,
        }
    }

    /// Accept `token` as the fixed test user. **Testing only.**
    #[must_use]
    pub fn with_test_token(mut self, token: Option<String>) -> Self {
        self.test_token = token;
        self
    }

    /// Resolve the caller behind `token`.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` when the token is absent or unknown; provider
    /// failures otherwise.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Caller> {
        let token = token.ok_or(ConferenceError::Unauthenticated)?;

        if self.test_token.as_deref() == Some(token) {
            return Ok(test_caller());
        }

        self.provider
            .resolve(token)
            .await?
            .ok_or(ConferenceError::Unauthenticated)
    }
}

/// The user behind the configured test token.
#[must_use]
pub fn test_caller() -> Caller {
    Caller {
        user_id: UserId::new("test-user"),
        email: "test@example.com".to_string(),
        nickname: "Test User".to_string(),
    }
}

/// Authenticated caller.
///
/// Use this as a handler parameter to require authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(BearerToken::parse);

        let caller = state.authenticator.authenticate(token.as_deref()).await?;
        tracing::debug!(user_id = %caller.user_id, "Caller authenticated");
        Ok(Self(caller))
    }
}

/// Proof that the request carried the configured task token.
#[derive(Debug, Clone, Copy)]
pub struct TaskAuthorized;

#[async_trait]
impl FromRequestParts<AppState> for TaskAuthorized {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let supplied = parts
            .headers
            .get(TASK_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        match (state.task_token.as_deref(), supplied) {
            (Some(expected), Some(supplied)) if expected == supplied => Ok(Self),
            _ => Err(AppError::forbidden("Task endpoints require a valid X-Task-Token")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use conference_testing::{StaticIdentityProvider, fixtures};

    fn authenticator() -> Authenticator {
        Authenticator::new(Arc::new(
            StaticIdentityProvider::new().with_token("t-ann", fixtures::caller("ann")),
        ))
    }

    #[tokio::test]
    async fn known_tokens_resolve() {
        let caller = authenticator().authenticate(Some("t-ann")).await.unwrap();
        assert_eq!(caller, fixtures::caller("ann"));
    }

    #[tokio::test]
    async fn missing_or_unknown_tokens_are_unauthenticated() {
        let auth = authenticator();
        assert_eq!(auth.authenticate(None).await, Err(ConferenceError::Unauthenticated));
        assert_eq!(
            auth.authenticate(Some("t-bob")).await,
            Err(ConferenceError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_token_bypasses_the_provider() {
        let auth = authenticator().with_test_token(Some("let-me-in".into()));
        assert_eq!(auth.authenticate(Some("let-me-in")).await.unwrap(), test_caller());
    }
}
