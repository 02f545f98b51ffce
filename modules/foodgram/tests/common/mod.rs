#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use foodgram::{
    api::rest::routes::{self, MediaMount},
    contract::model::{NewIngredient, NewUser, User},
    domain::service::{Service, ServiceConfig},
    infra::{
        media::FsImageStore,
        storage::{migrations::Migrator, repo::repositories},
    },
};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;

/// 1x1 transparent PNG.
pub const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub fn png_data_uri() -> String {
    format!("data:image/png;base64,{PNG_B64}")
}

/// Fresh in-memory database per test.
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        bcrypt_cost: 4,
        ..ServiceConfig::default()
    }
}

/// Service over a fresh database; media goes to a temp dir that lives as
/// long as the returned guard.
pub async fn create_test_service() -> (Arc<Service>, TempDir) {
    create_test_service_with(test_config()).await
}

pub async fn create_test_service_with(config: ServiceConfig) -> (Arc<Service>, TempDir) {
    let db = create_test_db().await;
    let media = tempfile::tempdir().expect("tempdir");
    let images = FsImageStore::new(media.path(), "/media/");
    let svc = Service::new(repositories(db), Arc::new(images), config);
    (Arc::new(svc), media)
}

pub struct MockOpenApiRegistry;

impl modkit::api::OpenApiRegistry for MockOpenApiRegistry {
    fn register_document(&self, _doc: utoipa::openapi::OpenApi) {}

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

pub fn create_test_router(svc: Arc<Service>, media: &TempDir) -> Router {
    let mount = MediaMount {
        url_prefix: "/media/".to_string(),
        root: media.path().to_path_buf(),
    };
    routes::register_routes(Router::new(), &MockOpenApiRegistry, svc, Some(mount))
        .expect("Failed to register routes")
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        email: format!("{username}@example.com"),
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        password: "s3cret-pass".to_string(),
    }
}

/// Registered user plus a valid token key.
pub async fn register(svc: &Service, username: &str) -> (User, String) {
    let user = svc.register_user(new_user(username)).await.expect("register");
    let token = svc
        .login(&user.email, "s3cret-pass".to_string())
        .await
        .expect("login");
    (user, token)
}

pub async fn seed_ingredients(svc: &Service) -> Vec<i32> {
    let items = [("salt", "g"), ("sugar", "g"), ("milk", "ml")]
        .into_iter()
        .map(|(name, unit)| NewIngredient {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        })
        .collect();
    svc.import_ingredients(items).await.expect("import");
    let mut ids: Vec<i32> = svc
        .search_ingredients(None)
        .await
        .expect("search")
        .into_iter()
        .map(|i| i.id)
        .collect();
    ids.sort_unstable();
    ids
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
