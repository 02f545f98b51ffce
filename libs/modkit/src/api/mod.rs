//! HTTP-facing building blocks shared by module REST layers.

pub mod pagination;
pub mod problem;

/// Sink for OpenAPI documents contributed by modules.
///
/// The ingress merges every registered document into the one it serves at
/// `/openapi.json`.
pub trait OpenApiRegistry: Send + Sync {
    fn register_document(&self, doc: utoipa::openapi::OpenApi);

    /// Downcast support for accessing the concrete implementation if needed.
    fn as_any(&self) -> &dyn std::any::Any;
}
