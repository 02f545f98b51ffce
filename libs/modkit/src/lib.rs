//! # ModKit
//!
//! Small module system shared by the server and its modules.
//!
//! A module implements [`Module`] for wiring, optionally [`DbModule`] to own
//! schema migrations and [`RestfulModule`] to contribute routes and OpenAPI
//! documents. The host drives the phases in order: init → migrate → REST.
//!
//! ```rust,ignore
//! use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
//!
//! #[derive(Default)]
//! pub struct Recipes;
//!
//! #[async_trait::async_trait]
//! impl Module for Recipes {
//!     async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> { Ok(()) }
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//! }
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod api;
pub mod context;
pub mod contracts;
pub mod runtime;

pub use api::pagination::{PageQuery, PageRequest, Paginated};
pub use api::problem::{internal_error, Problem, ProblemResponse, ValidationError};
pub use api::OpenApiRegistry;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};
pub use contracts::{DbModule, Module, RestfulModule};
