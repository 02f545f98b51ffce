use anyhow::Context;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use super::{is_unique_violation, SeaOrmRepository};
use crate::contract::model::{CartRecipe, RecipeRelation, ShoppingListItem};
use crate::domain::repo::RelationsRepository;
use crate::infra::storage::entity::{
    favorite, ingredient, recipe, recipe_ingredient, shop_cart, user,
};

#[derive(Debug, FromQueryResult)]
struct TotalRow {
    name: String,
    measurement_unit: String,
    total_amount: i64,
}

#[derive(Debug, FromQueryResult)]
struct CartRow {
    name: String,
    author_username: String,
}

#[async_trait::async_trait]
impl<C> RelationsRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn exists(
        &self,
        rel: RecipeRelation,
        user_id: i32,
        recipe_id: i32,
    ) -> anyhow::Result<bool> {
        let count = match rel {
            RecipeRelation::Favorite => {
                favorite::Entity::find()
                    .filter(favorite::Column::UserId.eq(user_id))
                    .filter(favorite::Column::RecipeId.eq(recipe_id))
                    .count(&self.conn)
                    .await
            }
            RecipeRelation::ShoppingCart => {
                shop_cart::Entity::find()
                    .filter(shop_cart::Column::UserId.eq(user_id))
                    .filter(shop_cart::Column::RecipeId.eq(recipe_id))
                    .count(&self.conn)
                    .await
            }
        }
        .with_context(|| format!("{} lookup failed", rel.label()))?;
        Ok(count > 0)
    }

    async fn insert(
        &self,
        rel: RecipeRelation,
        user_id: i32,
        recipe_id: i32,
    ) -> anyhow::Result<bool> {
        let res = match rel {
            RecipeRelation::Favorite => {
                favorite::Entity::insert(favorite::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                    ..Default::default()
                })
                .exec_without_returning(&self.conn)
                .await
            }
            RecipeRelation::ShoppingCart => {
                shop_cart::Entity::insert(shop_cart::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                    ..Default::default()
                })
                .exec_without_returning(&self.conn)
                .await
            }
        };
        match res {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e).with_context(|| format!("insert into {} failed", rel.label())),
        }
    }

    async fn delete(
        &self,
        rel: RecipeRelation,
        user_id: i32,
        recipe_id: i32,
    ) -> anyhow::Result<bool> {
        let res = match rel {
            RecipeRelation::Favorite => {
                favorite::Entity::delete_many()
                    .filter(favorite::Column::UserId.eq(user_id))
                    .filter(favorite::Column::RecipeId.eq(recipe_id))
                    .exec(&self.conn)
                    .await
            }
            RecipeRelation::ShoppingCart => {
                shop_cart::Entity::delete_many()
                    .filter(shop_cart::Column::UserId.eq(user_id))
                    .filter(shop_cart::Column::RecipeId.eq(recipe_id))
                    .exec(&self.conn)
                    .await
            }
        }
        .with_context(|| format!("delete from {} failed", rel.label()))?;
        Ok(res.rows_affected > 0)
    }

    async fn shopping_totals(&self, user_id: i32) -> anyhow::Result<Vec<ShoppingListItem>> {
        let rows = recipe_ingredient::Entity::find()
            .select_only()
            .column_as(ingredient::Column::Name, "name")
            .column_as(ingredient::Column::MeasurementUnit, "measurement_unit")
            .column_as(
                Expr::col((recipe_ingredient::Entity, recipe_ingredient::Column::Amount)).sum(),
                "total_amount",
            )
            .join(
                JoinType::InnerJoin,
                recipe_ingredient::Relation::Ingredient.def(),
            )
            .join(JoinType::InnerJoin, recipe_ingredient::Relation::Recipe.def())
            .join(JoinType::InnerJoin, recipe::Relation::ShopCarts.def())
            .filter(shop_cart::Column::UserId.eq(user_id))
            .group_by(ingredient::Column::Name)
            .group_by(ingredient::Column::MeasurementUnit)
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::MeasurementUnit)
            .into_model::<TotalRow>()
            .all(&self.conn)
            .await
            .context("shopping totals query failed")?;

        Ok(rows
            .into_iter()
            .map(|r| ShoppingListItem {
                name: r.name,
                measurement_unit: r.measurement_unit,
                total_amount: r.total_amount,
            })
            .collect())
    }

    async fn cart_recipes(&self, user_id: i32) -> anyhow::Result<Vec<CartRecipe>> {
        let rows = recipe::Entity::find()
            .select_only()
            .column_as(recipe::Column::Name, "name")
            .column_as(user::Column::Username, "author_username")
            .join(JoinType::InnerJoin, recipe::Relation::Author.def())
            .join(JoinType::InnerJoin, recipe::Relation::ShopCarts.def())
            .filter(shop_cart::Column::UserId.eq(user_id))
            .order_by_desc(recipe::Column::PubDate)
            .order_by_desc(recipe::Column::Id)
            .into_model::<CartRow>()
            .all(&self.conn)
            .await
            .context("cart recipes query failed")?;

        Ok(rows
            .into_iter()
            .map(|r| CartRecipe {
                name: r.name,
                author_username: r.author_username,
            })
            .collect())
    }
}
