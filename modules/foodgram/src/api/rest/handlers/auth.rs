use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    Extension, Json,
};
use modkit::api::problem::ProblemResponse;
use tracing::{error, info};

use crate::api::rest::auth::Authenticated;
use crate::api::rest::dto::{LoginReq, TokenDto};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::JsonBody;
use crate::domain::service::Service;

/// Obtain an API token
#[utoipa::path(
    post,
    path = "/api/auth/token/login",
    tag = "auth",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Token", body = TokenDto),
        (status = 400, description = "Invalid credentials", body = modkit::Problem)
    )
)]
pub async fn login(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    JsonBody(req): JsonBody<LoginReq>,
) -> Result<Json<TokenDto>, ProblemResponse> {
    match svc.login(&req.email, req.password).await {
        Ok(auth_token) => Ok(Json(TokenDto { auth_token })),
        Err(e) => {
            info!("Login failed: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Revoke the current token
#[utoipa::path(
    post,
    path = "/api/auth/token/logout",
    tag = "auth",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Not authenticated", body = modkit::Problem)
    )
)]
pub async fn logout(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    match svc.logout(user.id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to log out user {}: {}", user.id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
