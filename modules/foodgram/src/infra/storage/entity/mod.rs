//! SeaORM entities of the foodgram schema.

pub mod auth_token;
pub mod favorite;
pub mod ingredient;
pub mod recipe;
pub mod recipe_ingredient;
pub mod shop_cart;
pub mod subscription;
pub mod user;
