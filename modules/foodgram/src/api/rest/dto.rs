use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{
    AuthorSubscription, Ingredient, IngredientInput, IngredientLine, NewUser, RecipeDetails,
    RecipeFilter, RecipeInput, RecipeSummary, SubscriptionReceipt, User, UserProfile,
};
use crate::domain::service::Service;

/// User as seen by the requester.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the requester follows this user; false for anonymous requests.
    pub is_subscribed: bool,
    /// Avatar URL, if set.
    pub avatar: Option<String>,
}

impl UserDto {
    pub fn new(profile: UserProfile, svc: &Service) -> Self {
        let UserProfile {
            user,
            is_subscribed,
        } = profile;
        Self {
            avatar: user.avatar.as_deref().map(|p| svc.media_url(p)),
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// Registration request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserReq {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            email: req.email,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            password: req.password,
        }
    }
}

/// Registration response (no password, no subscription flag)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedUserDto {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for CreatedUserDto {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetPasswordReq {
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub current_password: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AvatarReq {
    /// Base64 image, data URI or bare.
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvatarDto {
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginReq {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenDto {
    pub auth_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngredientDto {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientDto {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
            measurement_unit: i.measurement_unit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IngredientSearchQuery {
    /// Case-insensitive substring of the ingredient name.
    pub name: Option<String>,
}

/// Ingredient line of a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeIngredientDto {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<IngredientLine> for RecipeIngredientDto {
    fn from(line: IngredientLine) -> Self {
        Self {
            id: line.ingredient.id,
            name: line.ingredient.name,
            measurement_unit: line.ingredient.measurement_unit,
            amount: line.amount,
        }
    }
}

/// Recipe read form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeReadDto {
    pub id: i32,
    pub author: UserDto,
    pub ingredients: Vec<RecipeIngredientDto>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// Image URL.
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeReadDto {
    pub fn new(details: RecipeDetails, svc: &Service) -> Self {
        let RecipeDetails {
            recipe,
            author,
            ingredients,
            is_favorited,
            is_in_shopping_cart,
        } = details;
        Self {
            id: recipe.id,
            author: UserDto::new(author, svc),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            is_favorited,
            is_in_shopping_cart,
            image: svc.media_url(&recipe.image),
            name: recipe.name,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Response of create/update: the read form without the per-requester flags.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeWriteDto {
    pub id: i32,
    pub author: UserDto,
    pub ingredients: Vec<RecipeIngredientDto>,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeWriteDto {
    pub fn new(details: RecipeDetails, svc: &Service) -> Self {
        let read = RecipeReadDto::new(details, svc);
        Self {
            id: read.id,
            author: read.author,
            ingredients: read.ingredients,
            name: read.name,
            image: read.image,
            text: read.text,
            cooking_time: read.cooking_time,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct IngredientAmountReq {
    pub id: i32,
    pub amount: i64,
}

/// Recipe write form. On PATCH omitted `name`, `text` and `cooking_time`
/// keep their stored values; `ingredients` and `image` are always required.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RecipeWriteReq {
    pub ingredients: Option<Vec<IngredientAmountReq>>,
    /// Base64 image, data URI or bare.
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

impl From<RecipeWriteReq> for RecipeInput {
    fn from(req: RecipeWriteReq) -> Self {
        Self {
            ingredients: req.ingredients.map(|items| {
                items
                    .into_iter()
                    .map(|i| IngredientInput {
                        id: i.id,
                        amount: i.amount,
                    })
                    .collect()
            }),
            image: req.image,
            name: req.name,
            text: req.text,
            cooking_time: req.cooking_time,
        }
    }
}

/// Recipe listing filters. `is_favorited` / `is_in_shopping_cart`: `1` or `0`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeFilterQuery {
    /// Author id.
    pub author: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

impl RecipeFilterQuery {
    /// `Err` carries the offending raw author value.
    pub fn into_filter(self) -> Result<RecipeFilter, String> {
        let author = match self.author.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| raw.to_string())?),
        };
        Ok(RecipeFilter {
            author,
            is_favorited: self.is_favorited,
            is_in_shopping_cart: self.is_in_shopping_cart,
        })
    }
}

/// Compact recipe returned by favorite / shopping cart toggles.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipeSummaryDto {
    pub id: i32,
    pub name: String,
    /// Author username.
    pub author: String,
}

impl From<RecipeSummary> for RecipeSummaryDto {
    fn from(s: RecipeSummary) -> Self {
        Self {
            id: s.id,
            name: s.name,
            author: s.author_username,
        }
    }
}

/// A followed author with their newest recipes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionDto {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
    pub recipes: Vec<RecipeReadDto>,
    pub recipes_count: u64,
}

impl SubscriptionDto {
    pub fn new(sub: AuthorSubscription, svc: &Service) -> Self {
        let user = UserDto::new(
            UserProfile {
                user: sub.author,
                is_subscribed: true,
            },
            svc,
        );
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed: user.is_subscribed,
            avatar: user.avatar,
            recipes: sub
                .recipes
                .into_iter()
                .map(|r| RecipeReadDto::new(r, svc))
                .collect(),
            recipes_count: sub.recipes_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubscriptionsQuery {
    /// Max recipes per author, bounded by the max page size; missing or invalid
    /// values fall back to the configured default.
    pub recipes_limit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscribeDto {
    pub status: String,
    /// Author username.
    pub author: String,
    /// Subscriber username.
    pub user: String,
}

impl From<SubscriptionReceipt> for SubscribeDto {
    fn from(r: SubscriptionReceipt) -> Self {
        Self {
            status: format!("Subscribed to {}", r.author),
            author: r.author,
            user: r.user,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShortLinkDto {
    #[serde(rename = "short-link")]
    pub short_link: String,
}
