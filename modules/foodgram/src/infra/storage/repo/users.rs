use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::SeaOrmRepository;
use crate::contract::model::{Page, PageSpec, User};
use crate::domain::repo::{NewUserRecord, UsersRepository};
use crate::infra::storage::entity::user;

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        let found = user::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find user by id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<(User, String)>> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find user by email failed")?;
        Ok(found.map(|m| {
            let hash = m.password.clone();
            (m.into(), hash)
        }))
    }

    async fn password_hash(&self, id: i32) -> anyhow::Result<Option<String>> {
        user::Entity::find_by_id(id)
            .select_only()
            .column(user::Column::Password)
            .into_tuple::<String>()
            .one(&self.conn)
            .await
            .context("password hash lookup failed")
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("username_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, u: NewUserRecord) -> anyhow::Result<User> {
        let m = user::ActiveModel {
            email: Set(u.email),
            username: Set(u.username),
            first_name: Set(u.first_name),
            last_name: Set(u.last_name),
            password: Set(u.password_hash),
            avatar: Set(None),
            date_joined: Set(Utc::now()),
            ..Default::default()
        };
        let inserted = m.insert(&self.conn).await.context("insert user failed")?;
        Ok(inserted.into())
    }

    async fn set_password_hash(&self, id: i32, hash: String) -> anyhow::Result<()> {
        user::Entity::update_many()
            .col_expr(user::Column::Password, Expr::value(hash))
            .filter(user::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("set password failed")?;
        Ok(())
    }

    async fn set_avatar(&self, id: i32, avatar: Option<String>) -> anyhow::Result<()> {
        user::Entity::update_many()
            .col_expr(user::Column::Avatar, Expr::value(avatar))
            .filter(user::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("set avatar failed")?;
        Ok(())
    }

    async fn list_page(&self, page: PageSpec) -> anyhow::Result<Page<User>> {
        let select = user::Entity::find()
            .order_by_asc(user::Column::Username)
            .order_by_asc(user::Column::Id);
        let total = select
            .clone()
            .count(&self.conn)
            .await
            .context("count users failed")?;
        let rows = select
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.conn)
            .await
            .context("list users failed")?;
        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }
}
