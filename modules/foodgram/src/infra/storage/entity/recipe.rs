use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::contract::model::Recipe;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub author_id: i32,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    RecipeIngredients,
    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,
    #[sea_orm(has_many = "super::shop_cart::Entity")]
    ShopCarts,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::recipe_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl Related<super::shop_cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShopCarts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Recipe {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            author_id: m.author_id,
            name: m.name,
            image: m.image,
            text: m.text,
            cooking_time: m.cooking_time,
            pub_date: m.pub_date,
        }
    }
}
