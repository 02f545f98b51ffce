use anyhow::Context;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};

use super::SeaOrmRepository;
use crate::contract::model::User;
use crate::domain::repo::TokensRepository;
use crate::infra::storage::entity::{auth_token, user};

#[async_trait::async_trait]
impl<C> TokensRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_user(&self, key: &str) -> anyhow::Result<Option<User>> {
        let found = auth_token::Entity::find_by_id(key.to_owned())
            .find_also_related(user::Entity)
            .one(&self.conn)
            .await
            .context("token lookup failed")?;
        Ok(found.and_then(|(_, u)| u).map(Into::into))
    }

    async fn key_for_user(&self, user_id: i32) -> anyhow::Result<Option<String>> {
        auth_token::Entity::find()
            .select_only()
            .column(auth_token::Column::Key)
            .filter(auth_token::Column::UserId.eq(user_id))
            .into_tuple::<String>()
            .one(&self.conn)
            .await
            .context("token by user failed")
    }

    async fn insert(&self, user_id: i32, key: &str) -> anyhow::Result<()> {
        let m = auth_token::ActiveModel {
            key: Set(key.to_owned()),
            user_id: Set(user_id),
            created: Set(Utc::now()),
        };
        auth_token::Entity::insert(m)
            .exec_without_returning(&self.conn)
            .await
            .context("insert token failed")?;
        Ok(())
    }

    async fn delete_for_user(&self, user_id: i32) -> anyhow::Result<u64> {
        let res = auth_token::Entity::delete_many()
            .filter(auth_token::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("delete token failed")?;
        Ok(res.rows_affected)
    }
}
