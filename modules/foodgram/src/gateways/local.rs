use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::{
    client::FoodgramApi,
    error::FoodgramError,
    model::{Ingredient, NewIngredient, RecipeDetails, ShoppingList},
};
use crate::domain::service::Service;

/// In-process [`FoodgramApi`] backed by the domain service.
pub struct FoodgramLocalClient {
    service: Arc<Service>,
}

impl FoodgramLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl FoodgramApi for FoodgramLocalClient {
    async fn get_recipe(
        &self,
        viewer: Option<i32>,
        id: i32,
    ) -> Result<RecipeDetails, FoodgramError> {
        self.service
            .get_recipe(viewer, id)
            .await
            .map_err(Into::into)
    }

    async fn search_ingredients(
        &self,
        name: Option<String>,
    ) -> Result<Vec<Ingredient>, FoodgramError> {
        self.service
            .search_ingredients(name.as_deref())
            .await
            .map_err(Into::into)
    }

    async fn shopping_list(&self, user_id: i32) -> Result<ShoppingList, FoodgramError> {
        self.service
            .shopping_list(user_id)
            .await
            .map_err(Into::into)
    }

    async fn import_ingredients(&self, items: Vec<NewIngredient>) -> Result<u64, FoodgramError> {
        self.service
            .import_ingredients(items)
            .await
            .map_err(Into::into)
    }
}
