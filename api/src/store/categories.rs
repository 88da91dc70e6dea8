use chrono::Utc;

use super::{Db, is_unique_violation};
use crate::{errors::ApiError, models::Category};

#[derive(Clone)]
pub struct CategoryStore {
    db: Db,
}

impl CategoryStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Category>, ApiError> {
        Ok(sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?)
    }

    pub async fn create(&self, name: &str) -> Result<Category, ApiError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, created_at) VALUES (?, ?) \
             RETURNING id, name, created_at",
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await
        .map_err(|e| conflict_or(e, name))
    }

    /// Rename `from` to `to`, then run `then`. The row change commits only
    /// if `then` succeeds. The category is `None` when no row is called
    /// `from`; `then` still runs.
    pub async fn rename_with<T, F, Fut>(
        &self,
        from: &str,
        to: &str,
        then: F,
    ) -> Result<(Option<Category>, T), ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut tx = self.db.begin().await?;

        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = ? WHERE name = ? RETURNING id, name, created_at",
        )
        .bind(to)
        .bind(from)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| conflict_or(e, to))?;

        // dropping `tx` on error rolls the rename back
        let output = then().await?;
        tx.commit().await?;

        Ok((category, output))
    }

    pub async fn delete(&self, name: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM categories WHERE name = ?")
            .bind(name)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn conflict_or(e: sqlx::Error, name: &str) -> ApiError {
    if is_unique_violation(&e) {
        ApiError::Conflict(format!("Category '{name}' already exists"))
    } else {
        ApiError::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_db;

    async fn ok() -> Result<(), ApiError> {
        Ok(())
    }

    async fn names(store: &CategoryStore) -> Vec<String> {
        store.list().await.unwrap().into_iter().map(|c| c.name).collect()
    }

    #[tokio::test]
    async fn category_lifecycle() {
        let store = CategoryStore::new(test_db().await);
        store.create("rust").await.unwrap();
        store.create("life").await.unwrap();
        assert!(matches!(store.create("rust").await, Err(ApiError::Conflict(_))));

        assert_eq!(names(&store).await, vec!["life", "rust"]);

        let (renamed, _) = store.rename_with("rust", "systems", ok).await.unwrap();
        assert_eq!(renamed.unwrap().name, "systems");
        let (missing, _) = store.rename_with("missing", "x", ok).await.unwrap();
        assert!(missing.is_none());
        assert!(matches!(
            store.rename_with("life", "systems", ok).await,
            Err(ApiError::Conflict(_))
        ));

        assert!(store.delete("life").await.unwrap());
        assert!(!store.delete("life").await.unwrap());
    }

    #[tokio::test]
    async fn failed_follow_up_rolls_rename_back() {
        let store = CategoryStore::new(test_db().await);
        store.create("misc").await.unwrap();

        let result = store
            .rename_with("misc", "notes", || async {
                Err::<(), _>(ApiError::InternalError("rewrite failed".into()))
            })
            .await;
        assert!(matches!(result, Err(ApiError::InternalError(_))));
        assert_eq!(names(&store).await, vec!["misc"]);

        let (renamed, moved) = store
            .rename_with("misc", "notes", || async { Ok::<_, ApiError>(3) })
            .await
            .unwrap();
        assert_eq!(renamed.unwrap().name, "notes");
        assert_eq!(moved, 3);
        assert_eq!(names(&store).await, vec!["notes"]);
    }
}
