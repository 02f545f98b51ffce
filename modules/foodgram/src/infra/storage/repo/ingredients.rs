use anyhow::Context;
use sea_orm::sea_query::{Expr, LikeExpr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use super::SeaOrmRepository;
use crate::contract::model::{Ingredient, NewIngredient};
use crate::domain::repo::IngredientsRepository;
use crate::infra::storage::entity::ingredient;

/// Rows per INSERT statement; keeps bind parameters well under SQLite's limit.
const INSERT_CHUNK: usize = 500;

#[async_trait::async_trait]
impl<C> IngredientsRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Ingredient>> {
        let found = ingredient::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find ingredient failed")?;
        Ok(found.map(Into::into))
    }

    async fn search(&self, name_part: Option<&str>) -> anyhow::Result<Vec<Ingredient>> {
        let mut select = ingredient::Entity::find();
        if let Some(part) = name_part {
            let pattern = format!("%{}%", escape_like(&part.to_lowercase()));
            select = select.filter(
                Expr::col((ingredient::Entity, ingredient::Column::SearchName))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        let rows = select
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::Id)
            .all(&self.conn)
            .await
            .context("search ingredients failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn existing_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        ingredient::Entity::find()
            .select_only()
            .column(ingredient::Column::Id)
            .filter(ingredient::Column::Id.is_in(ids.iter().copied()))
            .into_tuple::<i32>()
            .all(&self.conn)
            .await
            .context("existing ingredient ids failed")
    }

    async fn insert_missing(&self, items: Vec<NewIngredient>) -> anyhow::Result<u64> {
        let mut inserted = 0;
        for chunk in items.chunks(INSERT_CHUNK) {
            let models = chunk.iter().map(|i| ingredient::ActiveModel {
                name: Set(i.name.clone()),
                search_name: Set(i.name.to_lowercase()),
                measurement_unit: Set(i.measurement_unit.clone()),
                ..Default::default()
            });
            inserted += ingredient::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::columns([
                        ingredient::Column::Name,
                        ingredient::Column::MeasurementUnit,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&self.conn)
                .await
                .context("bulk insert ingredients failed")?;
        }
        Ok(inserted)
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
