//! Module lifecycle: init → migrate → REST, as the server drives it.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use axum::{http::StatusCode, Router};
use foodgram::{contract::model::NewIngredient, Foodgram};
use modkit::{ConfigProvider, DbModule, Module, ModuleCtxBuilder, RestfulModule};
use modkit_db::{ConnectOpts, DbHandle};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use common::{body_json, empty_request, MockOpenApiRegistry};

struct MapConfig(HashMap<String, serde_json::Value>);

impl ConfigProvider for MapConfig {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get(module_name)
    }
}

async fn started_module(home: &std::path::Path) -> Result<(Foodgram, Router)> {
    let db = Arc::new(DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?);
    let mut sections = HashMap::new();
    sections.insert(
        "foodgram".to_string(),
        serde_json::json!({ "default_page_size": 2, "public_url": "https://food.example/" }),
    );
    let ctx = ModuleCtxBuilder::new(CancellationToken::new())
        .with_db(db.clone())
        .with_config_provider(Arc::new(MapConfig(sections)))
        .with_home_dir(home)
        .build()
        .for_module(foodgram::module::MODULE_NAME);

    let module = Foodgram::default();
    module.init(&ctx).await?;
    module.migrate(&db).await?;
    let router = module.register_rest(&ctx, Router::new(), &MockOpenApiRegistry)?;
    Ok((module, router))
}

#[tokio::test]
async fn client_and_routes_share_the_service() -> Result<()> {
    let home = tempfile::tempdir()?;
    let (module, router) = started_module(home.path()).await?;

    let client = module.client()?;
    let inserted = client
        .import_ingredients(
            ["apple", "apricot", "banana"]
                .into_iter()
                .map(|name| NewIngredient {
                    name: name.to_string(),
                    measurement_unit: "pcs".to_string(),
                })
                .collect(),
        )
        .await?;
    assert_eq!(inserted, 3);

    let found = client.search_ingredients(Some("AP".to_string())).await?;
    assert_eq!(found.len(), 2);

    let resp = router
        .clone()
        .oneshot(empty_request("GET", "/api/ingredients?name=ban", None))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "banana");

    let err = client.get_recipe(None, 42).await.unwrap_err();
    assert_eq!(err, foodgram::error::FoodgramError::not_found("recipe", 42));
    Ok(())
}

#[tokio::test]
async fn module_config_reaches_the_service() -> Result<()> {
    let home = tempfile::tempdir()?;
    let (_module, router) = started_module(home.path()).await?;

    let resp = router
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/users",
            None,
            serde_json::json!({
                "email": "a@example.com",
                "username": "a",
                "first_name": "A",
                "last_name": "A",
                "password": "long-enough"
            }),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    for n in 0..2 {
        let resp = router
            .clone()
            .oneshot(common::json_request(
                "POST",
                "/api/users",
                None,
                serde_json::json!({
                    "email": format!("u{n}@example.com"),
                    "username": format!("u{n}"),
                    "first_name": "U",
                    "last_name": "U",
                    "password": "long-enough"
                }),
            ))
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = router
        .oneshot(empty_request("GET", "/api/users", None))
        .await?;
    let page = body_json(resp).await;
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn client_before_init_is_an_error() {
    assert!(Foodgram::default().client().is_err());
}
