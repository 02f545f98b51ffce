use std::sync::Arc;

use axum::{
    extract::Path,
    http::{header::LOCATION, StatusCode, Uri},
    response::IntoResponse,
    Extension,
};
use modkit::api::problem::ProblemResponse;
use tracing::debug;

use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

/// Resolve a short link to the recipe page
#[utoipa::path(
    get,
    path = "/s/{id}",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe id")),
    responses(
        (status = 302, description = "Redirect to the recipe page"),
        (status = 404, description = "Not found", body = modkit::Problem)
    )
)]
pub async fn redirect(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    uri: Uri,
) -> Result<impl IntoResponse, ProblemResponse> {
    match svc.short_link_target(id).await {
        Ok(target) => Ok((StatusCode::FOUND, [(LOCATION, target)])),
        Err(e) => {
            debug!("Short link {} not resolved: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
