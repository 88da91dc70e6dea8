mod categories;
mod settings;
mod themes;
mod users;

use std::{str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub use self::{
    categories::CategoryStore, settings::SettingsStore, themes::ThemeStore, users::UserStore,
};

/// Connection pool type
pub type Db = sqlx::SqlitePool;

const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Open the database at `url`, creating the file if needed.
///
/// An in-memory database lives only as long as its connection, so it gets
/// a single connection that is never recycled.
pub async fn connect(url: &str) -> Result<Db, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    if url.contains(":memory:") {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(2))
        .connect_with(
            options
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5)),
        )
        .await
}

/// Create the tables. Statements are separated by `;` and run one by one.
pub async fn migrate(db: &Db) -> Result<(), sqlx::Error> {
    for sql in SCHEMA.split(';') {
        if sql.trim().is_empty() {
            continue;
        }
        sqlx::query(sql).execute(db).await?;
    }
    Ok(())
}

/// True when `e` was raised by a UNIQUE constraint.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
pub(crate) async fn test_db() -> Db {
    let db = connect("sqlite::memory:").await.unwrap();
    migrate(&db).await.unwrap();
    db
}
