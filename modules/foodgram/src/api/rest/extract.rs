//! Extractors whose rejections render as problem responses.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use modkit::api::problem::ProblemResponse;
use serde::de::DeserializeOwned;

use crate::api::rest::error::from_parts;

/// JSON body; malformed payloads become a 400 problem.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_owned();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(from_parts(
                StatusCode::BAD_REQUEST,
                "FOODGRAM_INVALID_BODY",
                "Invalid request body",
                rejection.body_text(),
                &instance,
            )),
        }
    }
}

/// Query string; unparseable values become a 400 problem.
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(from_parts(
                StatusCode::BAD_REQUEST,
                "FOODGRAM_INVALID_QUERY",
                "Invalid query parameters",
                rejection.body_text(),
                parts.uri.path(),
            )),
        }
    }
}
