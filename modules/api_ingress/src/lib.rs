//! HTTP host: owns the listener, the global middleware stack and the merged
//! OpenAPI document that every REST module contributes to.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use axum::{
    extract::DefaultBodyLimit, http::header, middleware::from_fn, response::IntoResponse,
    routing::get, Router,
};
use modkit::api::OpenApiRegistry;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tower::Layer;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    normalize_path::NormalizePathLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub const MODULE_NAME: &str = "api_ingress";

/// API ingress: `/health`, `/openapi.json`, `/docs` plus whatever the REST
/// modules register between [`ApiIngress::rest_prepare`] and
/// [`ApiIngress::rest_finalize`].
pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    // Documents registered so far, merged on arrival
    openapi: Mutex<utoipa::openapi::OpenApi>,
    final_router: Mutex<Option<Router>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            openapi: Mutex::new(base_document()),
            final_router: Mutex::new(None),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Fill in the bind address when the module section leaves it unset.
    pub fn set_default_bind_addr(&self, addr: impl Into<String>) {
        let mut cfg = self.get_config();
        if cfg.bind_addr.is_none() {
            cfg.bind_addr = Some(addr.into());
            self.config.store(Arc::new(cfg));
        }
    }

    /// Merged OpenAPI document of every registered module.
    pub fn build_openapi(&self) -> utoipa::openapi::OpenApi {
        self.openapi.lock().clone()
    }

    /// Base router with host-owned endpoints; modules add their routes to it.
    pub fn rest_prepare(&self, router: Router) -> Router {
        tracing::debug!("REST host prepared base router with health check");
        router.route("/health", get(web::health_check))
    }

    /// Attach docs and the global middleware stack. The result is what
    /// [`ApiIngress::serve`] runs.
    pub fn rest_finalize(&self, mut router: Router) -> Result<Router> {
        let config = self.get_config();

        if config.enable_docs {
            let doc = self.build_openapi();
            tracing::info!(paths = doc.paths.paths.len(), "Serving merged OpenAPI document");
            let doc = Arc::new(serde_json::to_value(doc)?);
            router = router
                .route(
                    "/openapi.json",
                    get(move || {
                        let doc = doc.clone();
                        async move {
                            (
                                [(header::CACHE_CONTROL, "no-store")],
                                axum::Json((*doc).clone()),
                            )
                                .into_response()
                        }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        // Each `.layer` wraps the previous ones: the body limit ends up
        // innermost, request id generation outermost.
        let body_limit = config.body_limit_mb * 1024 * 1024;
        router = router
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(RequestBodyLimitLayer::new(body_limit));
        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        let x_request_id = request_id::header();
        router = router
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        // Trailing slashes must be trimmed before routing, so the whole router
        // goes behind the normalizing layer.
        let normalized = NormalizePathLayer::trim_trailing_slash().layer(router);
        let router = Router::new().fallback_service(normalized);

        *self.final_router.lock() = Some(router.clone());
        tracing::debug!("REST host finalized router");
        Ok(router)
    }

    /// Bind and serve the finalized router until `cancel` fires.
    pub async fn serve(&self, cancel: CancellationToken) -> Result<()> {
        let cfg = self.get_config();
        let bind_addr = cfg
            .bind_addr
            .ok_or_else(|| anyhow::anyhow!("api_ingress.bind_addr is not configured"))?;
        let addr: SocketAddr = bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", bind_addr, e))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {}", addr);
        self.serve_on(listener, cancel).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on(
        &self,
        listener: tokio::net::TcpListener,
        cancel: CancellationToken,
    ) -> Result<()> {
        let stored = { self.final_router.lock().take() };
        let router = match stored {
            Some(r) => r,
            None => {
                tracing::debug!("No router from REST phase, serving host endpoints only");
                self.rest_finalize(self.rest_prepare(Router::new()))?
            }
        };

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully");
        };
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

fn base_document() -> utoipa::openapi::OpenApi {
    utoipa::openapi::OpenApiBuilder::new()
        .info(
            utoipa::openapi::InfoBuilder::new()
                .title("Foodgram API")
                .version(env!("CARGO_PKG_VERSION"))
                .build(),
        )
        .build()
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &modkit::ModuleCtx) -> anyhow::Result<()> {
        let cfg = ctx.module_config::<ApiIngressConfig>();
        tracing::debug!(module = MODULE_NAME, ?cfg, "Module initialized");
        self.config.store(Arc::new(cfg));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl OpenApiRegistry for ApiIngress {
    fn register_document(&self, doc: utoipa::openapi::OpenApi) {
        let mut merged = self.openapi.lock();
        let before = merged.paths.paths.len();
        // Info of the base document wins; paths, components and tags merge.
        merged.merge(doc);
        tracing::debug!(
            added = merged.paths.paths.len() - before,
            total = merged.paths.paths.len(),
            "Registered OpenAPI document"
        );
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_merge_under_host_info() {
        let ingress = ApiIngress::default();
        let doc = utoipa::openapi::OpenApiBuilder::new()
            .info(utoipa::openapi::InfoBuilder::new().title("other").build())
            .paths(
                utoipa::openapi::PathsBuilder::new().path(
                    "/api/things",
                    utoipa::openapi::PathItem::new(
                        utoipa::openapi::HttpMethod::Get,
                        utoipa::openapi::path::OperationBuilder::new().build(),
                    ),
                ),
            )
            .build();
        ingress.register_document(doc);

        let merged = ingress.build_openapi();
        assert_eq!(merged.info.title, "Foodgram API");
        assert!(merged.paths.paths.contains_key("/api/things"));
    }

    #[test]
    fn default_bind_addr_does_not_override_config() {
        let ingress = ApiIngress::new(ApiIngressConfig {
            bind_addr: Some("0.0.0.0:9000".into()),
            ..ApiIngressConfig::default()
        });
        ingress.set_default_bind_addr("127.0.0.1:8087");
        assert_eq!(ingress.get_config().bind_addr.as_deref(), Some("0.0.0.0:9000"));

        let ingress = ApiIngress::default();
        ingress.set_default_bind_addr("127.0.0.1:8087");
        assert_eq!(ingress.get_config().bind_addr.as_deref(), Some("127.0.0.1:8087"));
    }
}
