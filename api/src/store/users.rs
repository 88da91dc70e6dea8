use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};

use super::{Db, is_unique_violation};
use crate::{
    errors::ApiError,
    models::{Role, User},
};

/// User repository.
///
/// `Sqlite` is durable and relies on the UNIQUE constraint on `username`
/// to settle concurrent registrations. `Memory` keys a `DashMap` by
/// username and lives as long as the process.
#[derive(Clone)]
pub enum UserStore {
    Sqlite(Db),
    Memory(Arc<DashMap<String, User>>),
}

impl UserStore {
    pub fn memory() -> Self {
        UserStore::Memory(Arc::new(DashMap::new()))
    }

    /// Insert a new user. A taken username yields `UserAlreadyExists`.
    pub async fn insert(&self, user: User) -> Result<User, ApiError> {
        match self {
            UserStore::Sqlite(db) => {
                sqlx::query(
                    "INSERT INTO users (id, username, email, password_hash, role, created_at) \
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(&user.id)
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.role)
                .bind(user.created_at)
                .execute(db)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        ApiError::UserAlreadyExists
                    } else {
                        ApiError::Database(e)
                    }
                })?;
                Ok(user)
            }
            UserStore::Memory(users) => match users.entry(user.username.clone()) {
                Entry::Occupied(_) => Err(ApiError::UserAlreadyExists),
                Entry::Vacant(slot) => {
                    slot.insert(user.clone());
                    Ok(user)
                }
            },
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        match self {
            UserStore::Sqlite(db) => Ok(sqlx::query_as::<_, User>(
                "SELECT id, username, email, password_hash, role, created_at \
                 FROM users WHERE username = ?",
            )
            .bind(username)
            .fetch_optional(db)
            .await?),
            UserStore::Memory(users) => Ok(users.get(username).map(|u| u.value().clone())),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        match self {
            UserStore::Sqlite(db) => Ok(sqlx::query_as::<_, User>(
                "SELECT id, username, email, password_hash, role, created_at \
                 FROM users WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(db)
            .await?),
            UserStore::Memory(users) => Ok(users
                .iter()
                .find(|entry| entry.value().id == id)
                .map(|entry| entry.value().clone())),
        }
    }

    /// All users, oldest first.
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        match self {
            UserStore::Sqlite(db) => Ok(sqlx::query_as::<_, User>(
                "SELECT id, username, email, password_hash, role, created_at \
                 FROM users ORDER BY created_at, username",
            )
            .fetch_all(db)
            .await?),
            UserStore::Memory(users) => {
                let mut all: Vec<User> = users.iter().map(|e| e.value().clone()).collect();
                all.sort_by(|a, b| {
                    a.created_at
                        .cmp(&b.created_at)
                        .then_with(|| a.username.cmp(&b.username))
                });
                Ok(all)
            }
        }
    }

    /// Returns the updated user, or `None` if the id is unknown.
    pub async fn update_role(&self, id: &str, role: Role) -> Result<Option<User>, ApiError> {
        match self {
            UserStore::Sqlite(db) => {
                let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
                    .bind(role)
                    .bind(id)
                    .execute(db)
                    .await?;
                if result.rows_affected() == 0 {
                    return Ok(None);
                }
                self.find_by_id(id).await
            }
            UserStore::Memory(users) => Ok(users
                .iter_mut()
                .find(|entry| entry.value().id == id)
                .map(|mut entry| {
                    entry.value_mut().role = role;
                    entry.value().clone()
                })),
        }
    }

    /// Returns whether a user was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        match self {
            UserStore::Sqlite(db) => {
                let result = sqlx::query("DELETE FROM users WHERE id = ?")
                    .bind(id)
                    .execute(db)
                    .await?;
                Ok(result.rows_affected() > 0)
            }
            UserStore::Memory(users) => {
                let username = users
                    .iter()
                    .find(|entry| entry.value().id == id)
                    .map(|entry| entry.key().clone());
                Ok(username.is_some_and(|name| users.remove(&name).is_some()))
            }
        }
    }

    pub async fn count(&self) -> Result<usize, ApiError> {
        match self {
            UserStore::Sqlite(db) => {
                let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
                    .fetch_one(db)
                    .await?;
                Ok(count as usize)
            }
            UserStore::Memory(users) => Ok(users.len()),
        }
    }
}
