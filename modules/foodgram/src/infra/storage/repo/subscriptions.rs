use anyhow::Context;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, TransactionTrait,
};

use super::{is_unique_violation, SeaOrmRepository};
use crate::contract::model::{Page, PageSpec, User};
use crate::domain::repo::SubscriptionsRepository;
use crate::infra::storage::entity::{subscription, user};

#[async_trait::async_trait]
impl<C> SubscriptionsRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn exists(&self, user_id: i32, author_id: i32) -> anyhow::Result<bool> {
        let count = subscription::Entity::find()
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::AuthorId.eq(author_id))
            .count(&self.conn)
            .await
            .context("subscription lookup failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, user_id: i32, author_id: i32) -> anyhow::Result<bool> {
        let res = subscription::Entity::insert(subscription::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            ..Default::default()
        })
        .exec_without_returning(&self.conn)
        .await;
        match res {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e).context("insert subscription failed"),
        }
    }

    async fn delete(&self, user_id: i32, author_id: i32) -> anyhow::Result<bool> {
        let res = subscription::Entity::delete_many()
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::AuthorId.eq(author_id))
            .exec(&self.conn)
            .await
            .context("delete subscription failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn authors_page(&self, user_id: i32, page: PageSpec) -> anyhow::Result<Page<User>> {
        let select = user::Entity::find()
            .join(
                JoinType::InnerJoin,
                subscription::Relation::Author.def().rev(),
            )
            .filter(subscription::Column::UserId.eq(user_id))
            .order_by_asc(subscription::Column::Id);
        let total = select
            .clone()
            .count(&self.conn)
            .await
            .context("count subscriptions failed")?;
        let rows = select
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.conn)
            .await
            .context("list subscriptions failed")?;
        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }
}
