use async_trait::async_trait;
use axum::Router;

use crate::context::ModuleCtx;

pub use crate::api::OpenApiRegistry;

/// Wiring phase. Reads config and builds services; the schema may not exist yet.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()>;
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Schema phase, after every module finished `init`.
#[async_trait]
pub trait DbModule: Send + Sync {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()>;
}

/// Route phase, after migrations. Adds routes to `router` and hands its
/// OpenAPI document to `openapi`.
pub trait RestfulModule: Send + Sync {
    fn register_rest(
        &self,
        ctx: &ModuleCtx,
        router: Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<Router>;
}
