use std::sync::Arc;

use axum::{
    extract::Path,
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE, HOST},
        HeaderMap, StatusCode, Uri,
    },
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use modkit::api::pagination::{PageQuery, Paginated};
use modkit::api::problem::ProblemResponse;
use tracing::{error, info};

use super::page_request;
use crate::api::rest::auth::{Authenticated, Viewer};
use crate::api::rest::dto::{
    RecipeFilterQuery, RecipeReadDto, RecipeSummaryDto, RecipeWriteDto, RecipeWriteReq,
    ShortLinkDto,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{JsonBody, QueryParams};
use crate::contract::model::RecipeRelation;
use crate::domain::error::DomainError;
use crate::domain::service::Service;
use crate::domain::shopping_list;

/// List recipes, newest first
#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(PageQuery, RecipeFilterQuery),
    responses(
        (status = 200, description = "Page of recipes", body = Paginated<RecipeReadDto>),
        (status = 400, description = "Invalid filter", body = modkit::Problem)
    )
)]
pub async fn list_recipes(
    Extension(svc): Extension<Arc<Service>>,
    viewer: Viewer,
    QueryParams(page): QueryParams<PageQuery>,
    QueryParams(filter): QueryParams<RecipeFilterQuery>,
    uri: Uri,
) -> Result<Json<Paginated<RecipeReadDto>>, ProblemResponse> {
    let filter = filter.into_filter().map_err(|raw| {
        let e = DomainError::validation("author", format!("'{raw}' is not a valid author id."));
        map_domain_error(&e, uri.path())
    })?;
    let (req, spec) = page_request(&svc, page);

    match svc.list_recipes(viewer.id(), &filter, spec).await {
        Ok(page) => {
            let results = page
                .items
                .into_iter()
                .map(|d| RecipeReadDto::new(d, &svc))
                .collect();
            Ok(Json(Paginated::new(results, page.total, req, &uri)))
        }
        Err(e) => {
            error!("Failed to list recipes: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a recipe
#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = RecipeWriteReq,
    responses(
        (status = 201, description = "Created", body = RecipeWriteDto),
        (status = 400, description = "Validation error", body = modkit::Problem),
        (status = 401, description = "Not authenticated", body = modkit::Problem)
    )
)]
pub async fn create_recipe(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    uri: Uri,
    JsonBody(req): JsonBody<RecipeWriteReq>,
) -> Result<(StatusCode, Json<RecipeWriteDto>), ProblemResponse> {
    info!("Creating recipe {:?} for user {}", req.name, user.id);

    match svc.create_recipe(&user, req.into()).await {
        Ok(details) => Ok((
            StatusCode::CREATED,
            Json(RecipeWriteDto::new(details, &svc)),
        )),
        Err(e) => {
            error!("Failed to create recipe: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a recipe
#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeReadDto),
        (status = 404, description = "Not found", body = modkit::Problem)
    )
)]
pub async fn get_recipe(
    Extension(svc): Extension<Arc<Service>>,
    viewer: Viewer,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<Json<RecipeReadDto>, ProblemResponse> {
    match svc.get_recipe(viewer.id(), id).await {
        Ok(details) => Ok(Json(RecipeReadDto::new(details, &svc))),
        Err(e) => {
            error!("Failed to get recipe {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Update a recipe (author only)
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    request_body = RecipeWriteReq,
    responses(
        (status = 200, description = "Updated", body = RecipeWriteDto),
        (status = 400, description = "Validation error", body = modkit::Problem),
        (status = 401, description = "Not authenticated", body = modkit::Problem),
        (status = 403, description = "Not the author", body = modkit::Problem),
        (status = 404, description = "Not found", body = modkit::Problem)
    )
)]
pub async fn update_recipe(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    Path(id): Path<i32>,
    uri: Uri,
    JsonBody(req): JsonBody<RecipeWriteReq>,
) -> Result<Json<RecipeWriteDto>, ProblemResponse> {
    info!("Updating recipe {} by user {}", id, user.id);

    match svc.update_recipe(&user, id, req.into()).await {
        Ok(details) => Ok(Json(RecipeWriteDto::new(details, &svc))),
        Err(e) => {
            error!("Failed to update recipe {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a recipe (author only)
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not authenticated", body = modkit::Problem),
        (status = 403, description = "Not the author", body = modkit::Problem),
        (status = 404, description = "Not found", body = modkit::Problem)
    )
)]
pub async fn delete_recipe(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting recipe {} by user {}", id, user.id);

    match svc.delete_recipe(&user, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete recipe {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

async fn add_to(
    svc: &Service,
    relation: RecipeRelation,
    user_id: i32,
    recipe_id: i32,
    uri: &Uri,
) -> Result<(StatusCode, Json<RecipeSummaryDto>), ProblemResponse> {
    match svc.add_to(relation, user_id, recipe_id).await {
        Ok(summary) => Ok((StatusCode::CREATED, Json(summary.into()))),
        Err(e) => {
            info!("Failed to add recipe {} to {}: {}", recipe_id, relation.label(), e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

async fn remove_from(
    svc: &Service,
    relation: RecipeRelation,
    user_id: i32,
    recipe_id: i32,
    uri: &Uri,
) -> Result<StatusCode, ProblemResponse> {
    match svc.remove_from(relation, user_id, recipe_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            info!("Failed to remove recipe {} from {}: {}", recipe_id, relation.label(), e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Add a recipe to favorites
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added", body = RecipeSummaryDto),
        (status = 400, description = "Already in favorites", body = modkit::Problem),
        (status = 401, description = "Not authenticated", body = modkit::Problem),
        (status = 404, description = "Recipe not found", body = modkit::Problem)
    )
)]
pub async fn add_favorite(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<(StatusCode, Json<RecipeSummaryDto>), ProblemResponse> {
    add_to(&svc, RecipeRelation::Favorite, user.id, id, &uri).await
}

/// Remove a recipe from favorites
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Not authenticated", body = modkit::Problem),
        (status = 404, description = "Not in favorites", body = modkit::Problem)
    )
)]
pub async fn remove_favorite(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    remove_from(&svc, RecipeRelation::Favorite, user.id, id, &uri).await
}

/// Add a recipe to the shopping cart
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/shopping_cart",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added", body = RecipeSummaryDto),
        (status = 400, description = "Already in the cart", body = modkit::Problem),
        (status = 401, description = "Not authenticated", body = modkit::Problem),
        (status = 404, description = "Recipe not found", body = modkit::Problem)
    )
)]
pub async fn add_to_cart(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<(StatusCode, Json<RecipeSummaryDto>), ProblemResponse> {
    add_to(&svc, RecipeRelation::ShoppingCart, user.id, id, &uri).await
}

/// Remove a recipe from the shopping cart
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/shopping_cart",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed"),
        (status = 401, description = "Not authenticated", body = modkit::Problem),
        (status = 404, description = "Not in the cart", body = modkit::Problem)
    )
)]
pub async fn remove_from_cart(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    remove_from(&svc, RecipeRelation::ShoppingCart, user.id, id, &uri).await
}

/// Download the aggregated shopping list as text
#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    responses(
        (status = 200, description = "Shopping list", content_type = "text/plain", body = String),
        (status = 401, description = "Not authenticated", body = modkit::Problem)
    )
)]
pub async fn download_shopping_cart(
    Extension(svc): Extension<Arc<Service>>,
    Authenticated(user): Authenticated,
    uri: Uri,
) -> Result<impl IntoResponse, ProblemResponse> {
    match svc.render_shopping_list(user.id, Utc::now()).await {
        Ok(text) => Ok((
            [
                (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", shopping_list::FILE_NAME),
                ),
            ],
            text,
        )),
        Err(e) => {
            error!("Failed to build shopping list for user {}: {}", user.id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Short link of a recipe
#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Short link", body = ShortLinkDto),
        (status = 404, description = "Not found", body = modkit::Problem)
    )
)]
pub async fn get_link(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<ShortLinkDto>, ProblemResponse> {
    if let Err(e) = svc.short_link_target(id).await {
        return Err(map_domain_error(&e, uri.path()));
    }

    let base = match &svc.config().public_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => {
            let host = headers
                .get(HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("localhost");
            format!("http://{host}")
        }
    };
    Ok(Json(ShortLinkDto {
        short_link: format!("{base}/s/{id}"),
    }))
}
