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
use crate::api::rest::auth::Authenticated;
use crate::api::rest::dto::{SubscribeDto, SubscriptionDto, SubscriptionsQuery};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::QueryParams;
use crate::domain::service::Service;

/// Authors the current user follows
#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    params(PageQuery, SubscriptionsQuery),
    responses(
        (status = 200, description = "Page of followed authors", body = Paginated<SubscriptionDto>),
        (status = 401, description = "Not authenticated", body = modkit::Problem)
    )
)]
pub async fn list_subscriptions(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    QueryParams(page): QueryParams<PageQuery>,
    QueryParams(q): QueryParams<SubscriptionsQuery>,
    uri: Uri,
) -> Result<Json<Paginated<SubscriptionDto>>, ProblemResponse> {
    let (req, spec) = page_request(&svc, page);

    match svc
        .subscriptions(user.id, spec, q.recipes_limit.as_deref())
        .await
    {
        Ok(page) => {
            let results = page
                .items
                .into_iter()
                .map(|s| SubscriptionDto::new(s, &svc))
                .collect();
            Ok(Json(Paginated::new(results, page.total, req, &uri)))
        }
        Err(e) => {
            error!("Failed to list subscriptions of user {}: {}", user.id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Follow an author
#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(("id" = i32, Path, description = "Author id")),
    responses(
        (status = 201, description = "Subscribed", body = SubscribeDto),
        (status = 400, description = "Self or duplicate subscription", body = modkit::Problem),
        (status = 401, description = "Not authenticated", body = modkit::Problem),
        (status = 404, description = "Author not found", body = modkit::Problem)
    )
)]
pub async fn subscribe(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<(StatusCode, Json<SubscribeDto>), ProblemResponse> {
    match svc.subscribe(&user, id).await {
        Ok(receipt) => Ok((StatusCode::CREATED, Json(receipt.into()))),
        Err(e) => {
            info!("User {} could not subscribe to {}: {}", user.id, id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Stop following an author
#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe",
    tag = "users",
    params(("id" = i32, Path, description = "Author id")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Self subscription", body = modkit::Problem),
        (status = 401, description = "Not authenticated", body = modkit::Problem),
        (status = 404, description = "Not subscribed", body = modkit::Problem)
    )
)]
pub async fn unsubscribe(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    match svc.unsubscribe(&user, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            info!("User {} could not unsubscribe from {}: {}", user.id, id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
