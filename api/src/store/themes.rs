use chrono::Utc;
use tracing::info;

use super::Db;
use crate::models::ThemeRecord;

pub const DEFAULT_THEME: &str = "default";

#[derive(Clone)]
pub struct ThemeStore {
    db: Db,
}

impl ThemeStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<ThemeRecord>, sqlx::Error> {
        sqlx::query_as::<_, ThemeRecord>(
            "SELECT id, name, css_file, is_active, description, created_at FROM themes ORDER BY id",
        )
        .fetch_all(&self.db)
        .await
    }

    pub async fn active(&self) -> Result<Option<ThemeRecord>, sqlx::Error> {
        sqlx::query_as::<_, ThemeRecord>(
            "SELECT id, name, css_file, is_active, description, created_at \
             FROM themes WHERE is_active = 1",
        )
        .fetch_optional(&self.db)
        .await
    }

    /// Make `name` the only active theme, creating it if needed.
    ///
    /// Both steps share one transaction and the flag flip is a single
    /// statement, so there is exactly one active theme before and after,
    /// and a failure leaves the previous theme active.
    pub async fn activate(&self, name: &str) -> Result<ThemeRecord, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO themes (name, css_file, is_active, description, created_at) \
             VALUES (?, ?, 0, NULL, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .bind(ThemeRecord::stylesheet_for(name))
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE themes SET is_active = CASE WHEN name = ? THEN 1 ELSE 0 END")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        let theme = sqlx::query_as::<_, ThemeRecord>(
            "SELECT id, name, css_file, is_active, description, created_at \
             FROM themes WHERE name = ?",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("Theme activated: {}", theme.name);
        Ok(theme)
    }

    /// Activate the default theme on a fresh database.
    pub async fn ensure_default(&self) -> Result<(), sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM themes")
            .fetch_one(&self.db)
            .await?;
        if count == 0 {
            self.activate(DEFAULT_THEME).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_db;

    async fn active_names(store: &ThemeStore) -> Vec<String> {
        store
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.is_active)
            .map(|t| t.name)
            .collect()
    }

    #[tokio::test]
    async fn activation_keeps_a_single_active_theme() {
        let store = ThemeStore::new(test_db().await);
        store.ensure_default().await.unwrap();
        assert_eq!(active_names(&store).await, vec![DEFAULT_THEME]);

        let dark = store.activate("dark").await.unwrap();
        assert!(dark.is_active);
        assert_eq!(dark.css_file.as_deref(), Some("css/themes/dark.css"));
        assert_eq!(active_names(&store).await, vec!["dark"]);
        assert_eq!(store.list().await.unwrap().len(), 2);

        store.activate(DEFAULT_THEME).await.unwrap();
        assert_eq!(active_names(&store).await, vec![DEFAULT_THEME]);
        assert_eq!(store.active().await.unwrap().unwrap().name, DEFAULT_THEME);
    }

    #[tokio::test]
    async fn activation_is_idempotent() {
        let store = ThemeStore::new(test_db().await);
        store.activate("light").await.unwrap();
        store.activate("light").await.unwrap();

        assert_eq!(active_names(&store).await, vec!["light"]);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ensure_default_does_not_override_choice() {
        let store = ThemeStore::new(test_db().await);
        store.activate("dark").await.unwrap();
        store.ensure_default().await.unwrap();
        assert_eq!(active_names(&store).await, vec!["dark"]);
    }
}
