//! SQLite connection behavior of `DbHandle`.
#![cfg(feature = "sqlite")]

use anyhow::Result;
use modkit_db::{sqlite::absolutize_dsn, ConnectOpts, DbEngine, DbHandle};
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use tempfile::TempDir;

async fn scalar(db: &DbHandle, sql: &str, column: &str) -> Result<i64> {
    let row = db
        .sea()
        .query_one(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
        .await?
        .ok_or_else(|| anyhow::anyhow!("no row for {sql}"))?;
    Ok(row.try_get::<i64>("", column)?)
}

#[tokio::test]
async fn file_database_creates_parent_dirs() -> Result<()> {
    let tmp = TempDir::new()?;
    let dsn = absolutize_dsn("sqlite://nested/dir/foodgram.db", tmp.path());

    let db = DbHandle::connect(&dsn, ConnectOpts::default()).await?;
    assert_eq!(db.engine(), DbEngine::Sqlite);
    db.sea()
        .execute_unprepared("CREATE TABLE t (id INTEGER PRIMARY KEY)")
        .await?;
    db.close().await;

    assert!(tmp.path().join("nested/dir/foodgram.db").exists());
    Ok(())
}

#[tokio::test]
async fn memory_database_keeps_state_between_statements() -> Result<()> {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
    let conn = db.sea();
    conn.execute_unprepared("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT)")
        .await?;
    conn.execute_unprepared("INSERT INTO items (name) VALUES ('salt'), ('flour')")
        .await?;

    assert_eq!(scalar(&db, "SELECT COUNT(*) AS n FROM items", "n").await?, 2);
    Ok(())
}

#[tokio::test]
async fn foreign_keys_are_enforced() -> Result<()> {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
    assert_eq!(scalar(&db, "PRAGMA foreign_keys", "foreign_keys").await?, 1);

    let conn = db.sea();
    conn.execute_unprepared("CREATE TABLE parent (id INTEGER PRIMARY KEY)")
        .await?;
    conn.execute_unprepared(
        "CREATE TABLE child (id INTEGER PRIMARY KEY, \
         parent_id INTEGER NOT NULL REFERENCES parent(id) ON DELETE CASCADE)",
    )
    .await?;
    conn.execute_unprepared("INSERT INTO parent (id) VALUES (1)").await?;
    conn.execute_unprepared("INSERT INTO child (parent_id) VALUES (1), (1)")
        .await?;
    conn.execute_unprepared("DELETE FROM parent WHERE id = 1").await?;

    assert_eq!(scalar(&db, "SELECT COUNT(*) AS n FROM child", "n").await?, 0);
    assert!(conn
        .execute_unprepared("INSERT INTO child (parent_id) VALUES (42)")
        .await
        .is_err());
    Ok(())
}
