use async_trait::async_trait;

use crate::contract::{
    error::FoodgramError,
    model::{Ingredient, NewIngredient, RecipeDetails, ShoppingList},
};

/// In-process API of the foodgram module for other modules and tooling.
#[async_trait]
pub trait FoodgramApi: Send + Sync {
    /// Recipe read form as seen by `viewer` (anonymous when `None`).
    async fn get_recipe(&self, viewer: Option<i32>, id: i32)
        -> Result<RecipeDetails, FoodgramError>;

    /// Ingredients whose name contains `name` (case-insensitive), ordered by name.
    async fn search_ingredients(&self, name: Option<String>)
        -> Result<Vec<Ingredient>, FoodgramError>;

    /// Aggregated shopping list of a user.
    async fn shopping_list(&self, user_id: i32) -> Result<ShoppingList, FoodgramError>;

    /// Bulk-insert ingredients, skipping existing (name, unit) pairs.
    /// Returns the number of new rows.
    async fn import_ingredients(&self, items: Vec<NewIngredient>) -> Result<u64, FoodgramError>;
}
