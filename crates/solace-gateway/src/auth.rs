// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer token middleware for the gateway.
//!
//! The gateway never verifies credentials itself. The bearer token is
//! forwarded to the configured [`AuthAdapter`] and the returned
//! [`Identity`] is stored in the request extensions for handlers.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use solace_core::{AuthAdapter, Identity, SolaceError};

use crate::error::ApiError;

/// Shared handle to the auth collaborator.
pub type SharedAuth = Arc<dyn AuthAdapter + Send + Sync>;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects requests without a valid bearer token.
pub async fn auth_middleware(
    State(auth): State<SharedAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| SolaceError::Unauthorized("missing bearer token".into()))?;
    let identity = auth.authenticate(token).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Lets anonymous requests through, but a presented token must be valid.
pub async fn optional_auth_middleware(
    State(auth): State<SharedAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = bearer_token(request.headers()) {
        let identity = auth.authenticate(token).await?;
        request.extensions_mut().insert(identity);
    }
    Ok(next.run(request).await)
}

/// The authenticated caller. Rejects with 401 when the middleware did not run.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Caller)
            .ok_or_else(|| ApiError(SolaceError::Unauthorized("authentication required".into())))
    }
}

/// The caller if one authenticated.
#[derive(Debug, Clone)]
pub struct MaybeCaller(pub Option<Identity>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeCaller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeCaller(parts.extensions.get::<Identity>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
    }

    #[test]
    fn ignores_other_schemes_and_blank_tokens() {
        assert_eq!(bearer_token(&headers("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
