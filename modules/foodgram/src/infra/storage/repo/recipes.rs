use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};

use super::SeaOrmRepository;
use crate::contract::model::{IngredientAmount, IngredientLine, Page, PageSpec, Recipe};
use crate::domain::filter::{Membership, RecipeQuery};
use crate::domain::repo::{NewRecipeRecord, RecipesRepository};
use crate::infra::storage::entity::{favorite, ingredient, recipe, recipe_ingredient, shop_cart};

/// Newest first; ids break ties between recipes published in the same instant.
fn newest_first(select: Select<recipe::Entity>) -> Select<recipe::Entity> {
    select
        .order_by_desc(recipe::Column::PubDate)
        .order_by_desc(recipe::Column::Id)
}

fn apply_query(mut select: Select<recipe::Entity>, q: RecipeQuery) -> Select<recipe::Entity> {
    if let Some(author_id) = q.author_id {
        select = select.filter(recipe::Column::AuthorId.eq(author_id));
    }
    if let Some((user_id, membership)) = q.favorites {
        let related = Query::select()
            .column(favorite::Column::RecipeId)
            .from(favorite::Entity)
            .and_where(favorite::Column::UserId.eq(user_id))
            .to_owned();
        select = select.filter(match membership {
            Membership::Only => recipe::Column::Id.in_subquery(related),
            Membership::Exclude => recipe::Column::Id.not_in_subquery(related),
        });
    }
    if let Some((user_id, membership)) = q.shopping_cart {
        let related = Query::select()
            .column(shop_cart::Column::RecipeId)
            .from(shop_cart::Entity)
            .and_where(shop_cart::Column::UserId.eq(user_id))
            .to_owned();
        select = select.filter(match membership {
            Membership::Only => recipe::Column::Id.in_subquery(related),
            Membership::Exclude => recipe::Column::Id.not_in_subquery(related),
        });
    }
    select
}

fn line_models(
    recipe_id: i32,
    lines: &[IngredientAmount],
) -> impl Iterator<Item = recipe_ingredient::ActiveModel> + '_ {
    lines.iter().map(move |l| recipe_ingredient::ActiveModel {
        recipe_id: Set(recipe_id),
        ingredient_id: Set(l.ingredient_id),
        amount: Set(l.amount),
        ..Default::default()
    })
}

#[async_trait::async_trait]
impl<C> RecipesRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Recipe>> {
        let found = recipe::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find recipe failed")?;
        Ok(found.map(Into::into))
    }

    async fn list_page(&self, query: RecipeQuery, page: PageSpec) -> anyhow::Result<Page<Recipe>> {
        let select = newest_first(apply_query(recipe::Entity::find(), query));
        let total = select
            .clone()
            .count(&self.conn)
            .await
            .context("count recipes failed")?;
        let rows = select
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.conn)
            .await
            .context("list recipes failed")?;
        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn insert(
        &self,
        r: NewRecipeRecord,
        lines: &[IngredientAmount],
    ) -> anyhow::Result<Recipe> {
        let txn = self.conn.begin().await.context("begin failed")?;

        let created = recipe::ActiveModel {
            author_id: Set(r.author_id),
            name: Set(r.name),
            image: Set(r.image),
            text: Set(r.text),
            cooking_time: Set(r.cooking_time),
            pub_date: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("insert recipe failed")?;

        if !lines.is_empty() {
            recipe_ingredient::Entity::insert_many(line_models(created.id, lines))
                .exec_without_returning(&txn)
                .await
                .context("insert recipe ingredients failed")?;
        }

        txn.commit().await.context("commit failed")?;
        Ok(created.into())
    }

    async fn update(&self, r: Recipe, lines: &[IngredientAmount]) -> anyhow::Result<Recipe> {
        let txn = self.conn.begin().await.context("begin failed")?;

        let updated = recipe::ActiveModel {
            id: Set(r.id),
            author_id: Set(r.author_id),
            name: Set(r.name),
            image: Set(r.image),
            text: Set(r.text),
            cooking_time: Set(r.cooking_time),
            pub_date: Set(r.pub_date),
        }
        .update(&txn)
        .await
        .context("update recipe failed")?;

        recipe_ingredient::Entity::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(updated.id))
            .exec(&txn)
            .await
            .context("clear recipe ingredients failed")?;
        if !lines.is_empty() {
            recipe_ingredient::Entity::insert_many(line_models(updated.id, lines))
                .exec_without_returning(&txn)
                .await
                .context("insert recipe ingredients failed")?;
        }

        txn.commit().await.context("commit failed")?;
        Ok(updated.into())
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let res = recipe::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete recipe failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn ingredient_lines(&self, recipe_id: i32) -> anyhow::Result<Vec<IngredientLine>> {
        let rows = recipe_ingredient::Entity::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
            .find_also_related(ingredient::Entity)
            .order_by_asc(recipe_ingredient::Column::Id)
            .all(&self.conn)
            .await
            .context("load recipe ingredients failed")?;
        Ok(rows
            .into_iter()
            .filter_map(|(line, ing)| {
                ing.map(|ing| IngredientLine {
                    ingredient: ing.into(),
                    amount: line.amount,
                })
            })
            .collect())
    }

    async fn latest_by_author(&self, author_id: i32, limit: u64) -> anyhow::Result<Vec<Recipe>> {
        let rows = newest_first(
            recipe::Entity::find().filter(recipe::Column::AuthorId.eq(author_id)),
        )
        .limit(limit)
        .all(&self.conn)
        .await
        .context("latest recipes by author failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_by_author(&self, author_id: i32) -> anyhow::Result<u64> {
        recipe::Entity::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .count(&self.conn)
            .await
            .context("count recipes by author failed")
    }
}
