use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use modkit::api::OpenApiRegistry;
use tower_http::services::ServeDir;
use tracing::debug;
use utoipa::OpenApi;

use crate::api::rest::handlers::{auth, ingredients, recipes, short_link, subscriptions, users};
use crate::api::rest::openapi::ApiDoc;
use crate::domain::service::Service;

/// Where uploaded images are served from.
#[derive(Debug, Clone)]
pub struct MediaMount {
    /// URL prefix, e.g. `/media/`.
    pub url_prefix: String,
    pub root: PathBuf,
}

pub fn register_routes(
    router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
    media: Option<MediaMount>,
) -> anyhow::Result<Router> {
    openapi.register_document(ApiDoc::openapi());

    let mut router = router
        // auth
        .route("/api/auth/token/login", post(auth::login))
        .route("/api/auth/token/logout", post(auth::logout))
        // users
        .route(
            "/api/users",
            get(users::list_users).post(users::create_user),
        )
        .route("/api/users/me", get(users::me))
        .route("/api/users/set_password", post(users::set_password))
        .route(
            "/api/users/me/avatar",
            put(users::set_avatar).delete(users::delete_avatar),
        )
        .route(
            "/api/users/subscriptions",
            get(subscriptions::list_subscriptions),
        )
        .route("/api/users/{id}", get(users::get_user))
        .route(
            "/api/users/{id}/subscribe",
            post(subscriptions::subscribe).delete(subscriptions::unsubscribe),
        )
        // ingredients
        .route("/api/ingredients", get(ingredients::list_ingredients))
        .route("/api/ingredients/{id}", get(ingredients::get_ingredient))
        // recipes
        .route(
            "/api/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/api/recipes/download_shopping_cart",
            get(recipes::download_shopping_cart),
        )
        .route(
            "/api/recipes/{id}",
            get(recipes::get_recipe)
                .patch(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/api/recipes/{id}/favorite",
            post(recipes::add_favorite).delete(recipes::remove_favorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart",
            post(recipes::add_to_cart).delete(recipes::remove_from_cart),
        )
        .route("/api/recipes/{id}/get-link", get(recipes::get_link))
        .route("/s/{id}", get(short_link::redirect));

    if let Some(media) = media {
        let prefix = media.url_prefix.trim_end_matches('/');
        if prefix.starts_with('/') && prefix.len() > 1 {
            debug!("Serving media from {} at {}", media.root.display(), prefix);
            router = router.nest_service(prefix, ServeDir::new(media.root));
        } else {
            debug!("Media URL '{}' is not a local path; not serving media", media.url_prefix);
        }
    }

    Ok(router.layer(Extension(service)))
}
