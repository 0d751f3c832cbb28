//! Authentication module for caller identity and API key validation.
//!
//! Every command is attributed to the address bound to the presented
//! `X-API-Key`. Commands without a valid key are refused; reads are open
//! unless keys are configured.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use clmm_provider_domain::Address;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication configuration.
///
/// Each API key is bound to exactly one address; a request acts as the
/// address of the key it presents.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Valid API keys and the identity each one authenticates.
    pub api_keys: HashMap<String, Address>,
    /// Whether read routes also require an API key.
    pub require_api_key: bool,
}

impl AuthConfig {
    /// Creates a config that requires one of `keys` on every route.
    #[must_use]
    pub fn with_api_keys(keys: impl IntoIterator<Item = (String, Address)>) -> Self {
        Self {
            api_keys: keys.into_iter().collect(),
            require_api_key: true,
        }
    }

    /// Identity bound to `key`, if the key is known.
    #[must_use]
    pub fn identity_for(&self, key: &str) -> Option<Address> {
        self.api_keys.get(key).copied()
    }
}

/// Authentication state shared across requests.
#[derive(Clone)]
pub struct AuthState {
    /// Authentication configuration.
    pub config: Arc<AuthConfig>,
}

impl AuthState {
    /// Creates a new auth state.
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Authentication error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The API key header is missing.
    #[error("missing API key")]
    MissingApiKey,
    /// The API key is not known.
    #[error("invalid API key")]
    InvalidApiKey,
    /// The route acts on behalf of a caller and no key authenticated one.
    #[error("this operation requires an authenticated caller")]
    Unauthenticated,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": "UNAUTHORIZED",
        });

        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Address authenticated for the current request.
///
/// Set by [`auth_middleware`] from the presented API key; never taken from
/// client-supplied data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity(pub Address);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Authentication middleware.
///
/// A presented key must be known; it then authenticates its bound address
/// for the request. Requests without a key pass only when keys are optional,
/// and carry no identity.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match key {
        Some(key) => {
            let Some(caller) = auth.config.identity_for(key) else {
                warn!(path = %request.uri().path(), "Invalid API key");
                return Err(AuthError::InvalidApiKey);
            };
            debug!(caller = %caller, "API key authentication successful");
            request.extensions_mut().insert(CallerIdentity(caller));
        }
        None if auth.config.require_api_key => return Err(AuthError::MissingApiKey),
        None => {}
    }

    Ok(next.run(request).await)
}
