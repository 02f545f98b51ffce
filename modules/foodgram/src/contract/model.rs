//! Transport-agnostic domain models shared with other modules.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Stored media path of the avatar, relative to the media root.
    pub avatar: Option<String>,
}

/// Registration data; the password is plain text until the service hashes it.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// A user as seen by a particular requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user: User,
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: i32,
    pub author_id: i32,
    pub name: String,
    /// Stored media path of the image, relative to the media root.
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

/// Validated (ingredient, amount) pair of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: i32,
    pub amount: i32,
}

/// An ingredient line of a stored recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub ingredient: Ingredient,
    pub amount: i32,
}

/// Raw ingredient entry of a recipe write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientInput {
    pub id: i32,
    pub amount: i64,
}

/// Recipe write form before validation. On update, absent `name`, `text`
/// and `cooking_time` keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct RecipeInput {
    pub ingredients: Option<Vec<IngredientInput>>,
    /// Base64 payload, either a data URI or bare base64.
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

/// Recipe read form scoped to the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetails {
    pub recipe: Recipe,
    pub author: UserProfile,
    pub ingredients: Vec<IngredientLine>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Per-user recipe collections sharing the same toggle semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeRelation {
    Favorite,
    ShoppingCart,
}

impl RecipeRelation {
    pub fn label(self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }
}

/// Compact recipe projection returned by favorite/cart toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: i32,
    pub name: String,
    pub author_username: String,
}

/// Query-string filters for the recipe listing. Flag values are kept raw:
/// `"1"` restricts, `"0"` excludes, anything else is ignored.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub author: Option<i32>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

/// An author the requester follows, with a capped slice of their recipes
/// in read form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSubscription {
    pub author: User,
    pub recipes: Vec<RecipeDetails>,
    pub recipes_count: u64,
}

/// Confirmation of a new subscription (usernames of both sides).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionReceipt {
    pub user: String,
    pub author: String,
}

/// One aggregated line of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRecipe {
    pub name: String,
    pub author_username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    pub items: Vec<ShoppingListItem>,
    pub recipes: Vec<CartRecipe>,
}

/// Offset window requested from a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub offset: u64,
    pub limit: u64,
}

/// One window of a listing plus the total size of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}
