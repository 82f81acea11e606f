//! Per-request authentication.
//!
//! The gate never rejects a request: a missing, malformed, forged or expired
//! credential simply leaves the request anonymous, and the policy decides
//! later whether the target operation needs a principal.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;

use super::{Principal, TokenService};
use crate::AppState;

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Derive the principal for a request, if it carries a valid credential
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Option<Principal> {
    let token = bearer_token(headers)?;
    match tokens.validate(token) {
        Ok(principal) => Some(principal),
        Err(rejection) => {
            tracing::debug!(reason = %rejection, "Ignoring invalid bearer token");
            None
        }
    }
}

/// Middleware that attaches a [`Principal`] to the request extensions when the
/// request is authenticated.
pub async fn authentication_layer(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(principal) = authenticate(request.headers(), &state.tokens) {
        request.extensions_mut().insert(principal);
    }
    next.run(request).await
}

/// Extractor for the request's principal; `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Option<Principal>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentPrincipal(parts.extensions.get::<Principal>().cloned()))
    }
}
