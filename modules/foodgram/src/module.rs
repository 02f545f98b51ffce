use std::sync::Arc;

use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes::{self, MediaMount};
use crate::config::FoodgramConfig;
use crate::contract::client::FoodgramApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::FoodgramLocalClient;
use crate::infra::media::FsImageStore;
use crate::infra::storage::{migrations::Migrator, repo::repositories};

pub const MODULE_NAME: &str = "foodgram";

/// Recipe sharing module: REST API, storage and media for users, recipes
/// and their favorites, shopping carts and subscriptions.
#[derive(Default)]
pub struct Foodgram {
    service: arc_swap::ArcSwapOption<Service>,
    media: arc_swap::ArcSwapOption<MediaMount>,
}

impl Foodgram {
    /// In-process client; available after `init`.
    pub fn client(&self) -> anyhow::Result<Arc<dyn FoodgramApi>> {
        let service = self.service()?;
        Ok(Arc::new(FoodgramLocalClient::new(service)))
    }

    fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }
}

#[async_trait]
impl Module for Foodgram {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing foodgram module");

        let cfg: FoodgramConfig = ctx.module_config();
        debug!(
            "Loaded foodgram config: default_page_size={}, max_page_size={}, media_url={}",
            cfg.default_page_size, cfg.max_page_size, cfg.media_url
        );

        let db = ctx.db().ok_or_else(|| anyhow::anyhow!("DB required"))?;

        let media_root = ctx.resolve_path(&cfg.media_root);
        let images = FsImageStore::new(media_root.clone(), &cfg.media_url);

        let service_config = ServiceConfig {
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
            default_recipes_limit: cfg.default_recipes_limit,
            min_cooking_time: cfg.min_cooking_time,
            max_cooking_time: cfg.max_cooking_time,
            min_amount: cfg.min_amount,
            max_amount: cfg.max_amount,
            public_url: cfg.public_url.clone(),
            ..ServiceConfig::default()
        };
        let service = Service::new(repositories(db.sea()), Arc::new(images), service_config);

        self.service.store(Some(Arc::new(service)));
        self.media.store(Some(Arc::new(MediaMount {
            url_prefix: cfg.media_url,
            root: media_root,
        })));
        info!("Foodgram service ready");
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[async_trait]
impl DbModule for Foodgram {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running foodgram database migrations");
        Migrator::up(&db.sea(), None).await?;
        info!("Foodgram database migrations completed");
        Ok(())
    }
}

impl RestfulModule for Foodgram {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering foodgram REST routes");
        let service = self.service()?;
        let media = self.media.load_full().map(|m| m.as_ref().clone());
        let router = routes::register_routes(router, openapi, service, media)?;
        info!("Foodgram REST routes registered");
        Ok(router)
    }
}
