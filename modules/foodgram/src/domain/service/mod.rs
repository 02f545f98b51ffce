//! Domain service: business rules of the recipe platform.
//!
//! Depends only on the persistence ports in [`crate::domain::repo`] and the
//! [`ImageStore`] port; handlers and the local gateway call into it.

use std::sync::Arc;

use crate::domain::error::DomainError;
use crate::domain::ports::ImageStore;
use crate::domain::repo::Repositories;

mod auth;
mod ingredients;
mod recipes;
mod relations;
mod shopping;
mod subscriptions;
mod users;

/// Domain service with business rules for recipes, users and their relations.
#[derive(Clone)]
pub struct Service {
    repos: Repositories,
    images: Arc<dyn ImageStore>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    /// Fallback `recipes_limit`; explicit values are bounded by `max_page_size`.
    pub default_recipes_limit: u64,
    pub min_cooking_time: i32,
    pub max_cooking_time: i32,
    pub min_amount: i32,
    pub max_amount: i32,
    pub max_recipe_name_length: usize,
    pub min_password_length: usize,
    pub bcrypt_cost: u32,
    /// Origin for short links; `None` means "derive from the request".
    pub public_url: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 6,
            max_page_size: 100,
            default_recipes_limit: 3,
            min_cooking_time: 1,
            max_cooking_time: 32_000,
            min_amount: 1,
            max_amount: 32_000,
            max_recipe_name_length: 256,
            min_password_length: 8,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            public_url: None,
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(repos: Repositories, images: Arc<dyn ImageStore>, config: ServiceConfig) -> Self {
        Self {
            repos,
            images,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Public URL of a stored media path.
    pub fn media_url(&self, path: &str) -> String {
        self.images.url(path)
    }
}

fn db_error(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

fn storage_error(e: anyhow::Error) -> DomainError {
    DomainError::storage(format!("{e:#}"))
}
