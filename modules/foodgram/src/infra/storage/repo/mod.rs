//! SeaORM-backed implementations of the domain persistence ports.
//!
//! One adapter type implements every port; it is generic over the connection so
//! tests and the module can hand in any `DatabaseConnection`.

use std::sync::Arc;

use sea_orm::{ConnectionTrait, DbErr, SqlErr, TransactionTrait};

use crate::domain::repo::Repositories;

mod ingredients;
mod recipes;
mod relations;
mod subscriptions;
mod tokens;
mod users;

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
#[derive(Clone)]
pub struct SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Wire every port to one SeaORM adapter.
pub fn repositories<C>(conn: C) -> Repositories
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    let repo = Arc::new(SeaOrmRepository::new(conn));
    Repositories {
        users: repo.clone(),
        tokens: repo.clone(),
        ingredients: repo.clone(),
        recipes: repo.clone(),
        relations: repo.clone(),
        subscriptions: repo,
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
