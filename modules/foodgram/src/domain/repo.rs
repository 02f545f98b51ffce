use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::model::{
    CartRecipe, Ingredient, IngredientAmount, IngredientLine, NewIngredient, Page, PageSpec,
    Recipe, RecipeRelation, ShoppingListItem, User,
};
use crate::domain::filter::RecipeQuery;

/// User row to insert; the service has already hashed the password.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Recipe row to insert; validated by the service.
#[derive(Debug, Clone)]
pub struct NewRecipeRecord {
    pub author_id: i32,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Port for the domain layer: user persistence.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>>;
    /// User and stored password hash by login email.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<(User, String)>>;
    async fn password_hash(&self, id: i32) -> anyhow::Result<Option<String>>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool>;
    async fn insert(&self, u: NewUserRecord) -> anyhow::Result<User>;
    async fn set_password_hash(&self, id: i32, hash: String) -> anyhow::Result<()>;
    async fn set_avatar(&self, id: i32, avatar: Option<String>) -> anyhow::Result<()>;
    /// Users ordered by id.
    async fn list_page(&self, page: PageSpec) -> anyhow::Result<Page<User>>;
}

/// Port: API tokens (one per user).
#[async_trait]
pub trait TokensRepository: Send + Sync {
    async fn find_user(&self, key: &str) -> anyhow::Result<Option<User>>;
    async fn key_for_user(&self, user_id: i32) -> anyhow::Result<Option<String>>;
    async fn insert(&self, user_id: i32, key: &str) -> anyhow::Result<()>;
    /// Returns the number of removed tokens.
    async fn delete_for_user(&self, user_id: i32) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait IngredientsRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Ingredient>>;
    /// Case-insensitive substring search ordered by name; `None` lists all.
    async fn search(&self, name_part: Option<&str>) -> anyhow::Result<Vec<Ingredient>>;
    /// Subset of `ids` that exist.
    async fn existing_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<i32>>;
    /// Insert, skipping (name, unit) pairs that already exist. Returns new rows.
    async fn insert_missing(&self, items: Vec<NewIngredient>) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait RecipesRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Recipe>>;
    /// Filtered listing, newest first.
    async fn list_page(&self, query: RecipeQuery, page: PageSpec) -> anyhow::Result<Page<Recipe>>;
    /// Insert the recipe and its lines in one transaction.
    async fn insert(&self, r: NewRecipeRecord, lines: &[IngredientAmount])
        -> anyhow::Result<Recipe>;
    /// Update scalar fields and replace all lines in one transaction.
    async fn update(&self, r: Recipe, lines: &[IngredientAmount]) -> anyhow::Result<Recipe>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: i32) -> anyhow::Result<bool>;
    async fn ingredient_lines(&self, recipe_id: i32) -> anyhow::Result<Vec<IngredientLine>>;
    /// Newest recipes of an author, at most `limit`.
    async fn latest_by_author(&self, author_id: i32, limit: u64) -> anyhow::Result<Vec<Recipe>>;
    async fn count_by_author(&self, author_id: i32) -> anyhow::Result<u64>;
}

/// Port: favorites and shopping cart, both (user, recipe) pairs.
#[async_trait]
pub trait RelationsRepository: Send + Sync {
    async fn exists(&self, rel: RecipeRelation, user_id: i32, recipe_id: i32)
        -> anyhow::Result<bool>;
    /// Returns false when the pair already exists.
    async fn insert(&self, rel: RecipeRelation, user_id: i32, recipe_id: i32)
        -> anyhow::Result<bool>;
    /// Returns true if a row was deleted.
    async fn delete(&self, rel: RecipeRelation, user_id: i32, recipe_id: i32)
        -> anyhow::Result<bool>;
    /// Cart contents grouped by (ingredient name, unit), summed, ordered by name.
    async fn shopping_totals(&self, user_id: i32) -> anyhow::Result<Vec<ShoppingListItem>>;
    /// Recipes in the cart with their authors, newest first.
    async fn cart_recipes(&self, user_id: i32) -> anyhow::Result<Vec<CartRecipe>>;
}

#[async_trait]
pub trait SubscriptionsRepository: Send + Sync {
    async fn exists(&self, user_id: i32, author_id: i32) -> anyhow::Result<bool>;
    /// Returns false when the subscription already exists.
    async fn insert(&self, user_id: i32, author_id: i32) -> anyhow::Result<bool>;
    /// Returns true if a row was deleted.
    async fn delete(&self, user_id: i32, author_id: i32) -> anyhow::Result<bool>;
    /// Authors followed by `user_id`, in subscription order.
    async fn authors_page(&self, user_id: i32, page: PageSpec) -> anyhow::Result<Page<User>>;
}

/// Every persistence port the service needs.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UsersRepository>,
    pub tokens: Arc<dyn TokensRepository>,
    pub ingredients: Arc<dyn IngredientsRepository>,
    pub recipes: Arc<dyn RecipesRepository>,
    pub relations: Arc<dyn RelationsRepository>,
    pub subscriptions: Arc<dyn SubscriptionsRepository>,
}
