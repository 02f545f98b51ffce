//! OpenAPI document of the foodgram REST API.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::dto::{
    AvatarDto, AvatarReq, CreateUserReq, CreatedUserDto, IngredientAmountReq, IngredientDto,
    LoginReq, RecipeIngredientDto, RecipeReadDto, RecipeSummaryDto, RecipeWriteDto, RecipeWriteReq,
    SetPasswordReq, ShortLinkDto, SubscribeDto, SubscriptionDto, TokenDto, UserDto,
};
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Foodgram API",
        description = "Recipes, favorites, shopping carts and author subscriptions"
    ),
    paths(
        handlers::auth::login,
        handlers::auth::logout,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::me,
        handlers::users::set_password,
        handlers::users::set_avatar,
        handlers::users::delete_avatar,
        handlers::subscriptions::list_subscriptions,
        handlers::subscriptions::subscribe,
        handlers::subscriptions::unsubscribe,
        handlers::ingredients::list_ingredients,
        handlers::ingredients::get_ingredient,
        handlers::recipes::list_recipes,
        handlers::recipes::create_recipe,
        handlers::recipes::get_recipe,
        handlers::recipes::update_recipe,
        handlers::recipes::delete_recipe,
        handlers::recipes::add_favorite,
        handlers::recipes::remove_favorite,
        handlers::recipes::add_to_cart,
        handlers::recipes::remove_from_cart,
        handlers::recipes::download_shopping_cart,
        handlers::recipes::get_link,
        handlers::short_link::redirect,
    ),
    components(schemas(
        UserDto,
        CreateUserReq,
        CreatedUserDto,
        SetPasswordReq,
        AvatarReq,
        AvatarDto,
        LoginReq,
        TokenDto,
        IngredientDto,
        RecipeIngredientDto,
        RecipeReadDto,
        RecipeWriteDto,
        IngredientAmountReq,
        RecipeWriteReq,
        RecipeSummaryDto,
        SubscriptionDto,
        SubscribeDto,
        ShortLinkDto,
        modkit::Problem,
        modkit::ValidationError,
    )),
    tags(
        (name = "auth", description = "Token login and logout"),
        (name = "users", description = "Accounts, avatars and subscriptions"),
        (name = "ingredients", description = "Ingredient catalogue"),
        (name = "recipes", description = "Recipes, favorites and the shopping cart")
    ),
    modifiers(&TokenAuth)
)]
pub struct ApiDoc;

/// Documents the `Authorization: Token <key>` header.
struct TokenAuth;

impl Modify for TokenAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Token <key> as returned by /api/auth/token/login",
            ))),
        );
    }
}
