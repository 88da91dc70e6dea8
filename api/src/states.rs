use crate::{
    auth::{TokenService, hash_password},
    config::{Config, UserStoreKind},
    content::ContentStore,
    errors::ApiError,
    models::{Role, User},
    store::{self, CategoryStore, Db, SettingsStore, ThemeStore, UserStore},
};
use chrono::Utc;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::{num::NonZeroU32, sync::Arc};
use tracing::info;
use uuid::Uuid;

// ============================================================================
// APPLICATION STATE - Shared data across all requests
// ============================================================================
/// Every field is a cheap handle (`Arc` or a connection pool), so the
/// state is cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Db,
    pub tokens: TokenService,
    pub users: UserStore,
    pub themes: ThemeStore,
    pub categories: CategoryStore,
    pub content: ContentStore,
    pub settings: SettingsStore,
    pub auth_limiter: Arc<DefaultDirectRateLimiter>,
}

impl AppState {
    /// Open the database, create the schema, activate the default theme
    /// on first run and make sure the configured admin account exists.
    pub async fn from_config(config: Config) -> Result<Self, ApiError> {
        let db = store::connect(&config.database_url).await?;
        store::migrate(&db).await?;

        let users = match config.user_store {
            UserStoreKind::Sqlite => UserStore::Sqlite(db.clone()),
            UserStoreKind::Memory => UserStore::memory(),
        };

        let rate = NonZeroU32::new(config.auth_rate_per_minute).ok_or_else(|| {
            ApiError::InternalError("AUTH_RATE_PER_MINUTE must be positive".into())
        })?;
        let quota = Quota::per_minute(rate);

        let state = Self {
            tokens: TokenService::new(&config.jwt_secret),
            themes: ThemeStore::new(db.clone()),
            categories: CategoryStore::new(db.clone()),
            content: ContentStore::new(&config.content_dir, config.summary_length),
            settings: SettingsStore::new(&config.settings_path),
            auth_limiter: Arc::new(RateLimiter::direct(quota)),
            users,
            db,
            config: Arc::new(config),
        };

        state.themes.ensure_default().await?;
        state.bootstrap_admin().await?;

        Ok(state)
    }

    async fn bootstrap_admin(&self) -> Result<(), ApiError> {
        let Some(password) = self.config.admin_password.clone() else {
            return Ok(());
        };
        let username = &self.config.admin_username;

        if self.users.find_by_username(username).await?.is_some() {
            return Ok(());
        }

        let admin = User {
            id: Uuid::new_v4().to_string(),
            username: username.clone(),
            email: None,
            password_hash: hash_password(password, self.config.bcrypt_cost).await?,
            role: Role::Admin,
            created_at: Utc::now(),
        };
        match self.users.insert(admin).await {
            Ok(_) => info!("Admin account created: {}", username),
            // another process created it first
            Err(ApiError::UserAlreadyExists) => {}
            Err(e) => return Err(e),
        }
        Ok(())
    }
}
