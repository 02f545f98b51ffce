//! Token authentication: `Authorization: Token <key>`.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use modkit::api::problem::{internal_error, ProblemResponse};
use tracing::debug;

use crate::api::rest::error::{map_domain_error, not_authenticated};
use crate::contract::model::User;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

const SCHEME: &str = "token";

/// The requester, if a token was sent. An unknown token is rejected with 401.
pub struct Viewer(pub Option<User>);

impl Viewer {
    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(|u| u.id)
    }
}

/// The requester; anonymous requests are rejected with 401.
pub struct Authenticated(pub User);

/// `Some(key)` for a `Token` authorization header, `Some("")` when the key is
/// missing, `None` for other schemes or no header.
fn token_key(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, rest) = value.split_once(' ').unwrap_or((value, ""));
    scheme.eq_ignore_ascii_case(SCHEME).then(|| rest.trim())
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(key) = token_key(&parts.headers) else {
            return Ok(Self(None));
        };
        if key.is_empty() {
            return Err(map_domain_error(&DomainError::InvalidToken, parts.uri.path()));
        }

        let svc = parts
            .extensions
            .get::<Arc<Service>>()
            .cloned()
            .ok_or_else(|| internal_error("Service not available"))?;
        match svc.authenticate(key).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(e) => {
                debug!("Rejected token: {}", e);
                Err(map_domain_error(&e, parts.uri.path()))
            }
        }
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Viewer::from_request_parts(parts, state).await?.0 {
            Some(user) => Ok(Self(user)),
            None => Err(not_authenticated(parts.uri.path())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(v: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(v).unwrap());
        h
    }

    #[test]
    fn parses_token_scheme() {
        assert_eq!(token_key(&headers("Token abc123")), Some("abc123"));
        assert_eq!(token_key(&headers("token   abc123 ")), Some("abc123"));
        assert_eq!(token_key(&headers("Token")), Some(""));
        assert_eq!(token_key(&headers("Bearer abc123")), None);
        assert_eq!(token_key(&HeaderMap::new()), None);
    }
}
