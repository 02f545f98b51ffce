use std::sync::Arc;

use axum::{extract::Path, http::Uri, Extension, Json};
use modkit::api::problem::ProblemResponse;
use tracing::error;

use crate::api::rest::dto::{IngredientDto, IngredientSearchQuery};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::QueryParams;
use crate::domain::service::Service;

/// Search ingredients by name
#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(IngredientSearchQuery),
    responses((status = 200, description = "Matching ingredients", body = [IngredientDto]))
)]
pub async fn list_ingredients(
    Extension(svc): Extension<Arc<Service>>,
    QueryParams(query): QueryParams<IngredientSearchQuery>,
    uri: Uri,
) -> Result<Json<Vec<IngredientDto>>, ProblemResponse> {
    match svc.search_ingredients(query.name.as_deref()).await {
        Ok(items) => Ok(Json(items.into_iter().map(Into::into).collect())),
        Err(e) => {
            error!("Failed to search ingredients: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get an ingredient
#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    tag = "ingredients",
    params(("id" = i32, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientDto),
        (status = 404, description = "Not found", body = modkit::Problem)
    )
)]
pub async fn get_ingredient(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<Json<IngredientDto>, ProblemResponse> {
    match svc.get_ingredient(id).await {
        Ok(item) => Ok(Json(item.into())),
        Err(e) => {
            error!("Failed to get ingredient {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
