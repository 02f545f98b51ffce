use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    Extension, Json,
};
use modkit::api::pagination::{PageQuery, Paginated};
use modkit::api::problem::ProblemResponse;
use tracing::{error, info};

use super::page_request;
use crate::api::rest::auth::{Authenticated, Viewer};
use crate::api::rest::dto::{AvatarDto, AvatarReq, CreateUserReq, CreatedUserDto, SetPasswordReq, UserDto};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{JsonBody, QueryParams};
use crate::contract::model::UserProfile;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of users", body = Paginated<UserDto>),
        (status = 401, description = "Invalid token", body = modkit::Problem)
    )
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    viewer: Viewer,
    QueryParams(page): QueryParams<PageQuery>,
    uri: Uri,
) -> Result<Json<Paginated<UserDto>>, ProblemResponse> {
    let (req, spec) = page_request(&svc, page);
    match svc.list_profiles(viewer.id(), spec).await {
        Ok(page) => {
            let results = page
                .items
                .into_iter()
                .map(|p| UserDto::new(p, &svc))
                .collect();
            Ok(Json(Paginated::new(results, page.total, req, &uri)))
        }
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "Registered", body = CreatedUserDto),
        (status = 400, description = "Validation error", body = modkit::Problem)
    )
)]
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    JsonBody(req): JsonBody<CreateUserReq>,
) -> Result<(StatusCode, Json<CreatedUserDto>), ProblemResponse> {
    info!("Registering user '{}'", req.username);

    match svc.register_user(req.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(user.into()))),
        Err(e) => {
            error!("Failed to register user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a user profile
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserDto),
        (status = 404, description = "Not found", body = modkit::Problem)
    )
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    viewer: Viewer,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<Json<UserDto>, ProblemResponse> {
    match svc.get_profile(viewer.id(), id).await {
        Ok(profile) => Ok(Json(UserDto::new(profile, &svc))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Not authenticated", body = modkit::Problem)
    )
)]
pub async fn me(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
) -> Json<UserDto> {
    Json(UserDto::new(
        UserProfile {
            user,
            is_subscribed: false,
        },
        &svc,
    ))
}

/// Change the current user's password
#[utoipa::path(
    post,
    path = "/api/users/set_password",
    tag = "users",
    request_body = SetPasswordReq,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation error", body = modkit::Problem),
        (status = 401, description = "Not authenticated", body = modkit::Problem)
    )
)]
pub async fn set_password(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    uri: Uri,
    JsonBody(req): JsonBody<SetPasswordReq>,
) -> Result<StatusCode, ProblemResponse> {
    match svc
        .set_password(user.id, req.current_password, req.new_password)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to change password of user {}: {}", user.id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Upload an avatar
#[utoipa::path(
    put,
    path = "/api/users/me/avatar",
    tag = "users",
    request_body = AvatarReq,
    responses(
        (status = 200, description = "Avatar stored", body = AvatarDto),
        (status = 400, description = "Validation error", body = modkit::Problem),
        (status = 401, description = "Not authenticated", body = modkit::Problem)
    )
)]
pub async fn set_avatar(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    uri: Uri,
    JsonBody(req): JsonBody<AvatarReq>,
) -> Result<Json<AvatarDto>, ProblemResponse> {
    let Some(raw) = req.avatar else {
        let e = DomainError::validation("avatar", "This field is required.");
        return Err(map_domain_error(&e, uri.path()));
    };
    match svc.set_avatar(&user, &raw).await {
        Ok(updated) => Ok(Json(AvatarDto {
            avatar: updated.avatar.as_deref().map(|p| svc.media_url(p)),
        })),
        Err(e) => {
            error!("Failed to set avatar of user {}: {}", user.id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Remove the avatar
#[utoipa::path(
    delete,
    path = "/api/users/me/avatar",
    tag = "users",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 400, description = "No avatar", body = modkit::Problem),
        (status = 401, description = "Not authenticated", body = modkit::Problem)
    )
)]
pub async fn delete_avatar(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    match svc.delete_avatar(&user).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete avatar of user {}: {}", user.id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
