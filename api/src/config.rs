use std::{net::SocketAddr, str::FromStr, time::Duration};

use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStoreKind {
    Sqlite,
    Memory,
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub content_dir: String,
    pub settings_path: String,
    pub user_store: UserStoreKind,
    pub posts_per_page: usize,
    pub summary_length: usize,
    pub site_url: String,
    pub site_start_date: NaiveDate,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub bcrypt_cost: u32,
    pub auth_rate_per_minute: u32,
    pub request_timeout: Duration,
    pub max_concurrent_requests: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. A missing or empty
    /// `JWT_SECRET` is an error: tokens are never signed with a default key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let environment = match get("APP_ENV").as_deref() {
            None | Some("development") | Some("dev") => Environment::Development,
            Some("production") | Some("prod") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "APP_ENV",
                    value: other.to_string(),
                });
            }
        };

        let user_store = match get("USER_STORE").as_deref() {
            None | Some("sqlite") => UserStoreKind::Sqlite,
            Some("memory") => UserStoreKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "USER_STORE",
                    value: other.to_string(),
                });
            }
        };

        let site_start_date = match get("SITE_START_DATE") {
            Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                ConfigError::Invalid {
                    key: "SITE_START_DATE",
                    value: raw,
                }
            })?,
            None => NaiveDate::from_ymd_opt(2024, 1, 1).ok_or(ConfigError::Invalid {
                key: "SITE_START_DATE",
                value: "2024-01-01".into(),
            })?,
        };

        Ok(Self {
            environment,
            bind_addr: parse_or(&get, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            database_url: get("DATABASE_URL").unwrap_or_else(|| "sqlite://blog.db".into()),
            jwt_secret,
            content_dir: get("CONTENT_DIR").unwrap_or_else(|| "content".into()),
            settings_path: get("SETTINGS_PATH").unwrap_or_else(|| "settings.json".into()),
            user_store,
            posts_per_page: parse_positive(&get, "POSTS_PER_PAGE", 5)?,
            summary_length: parse_or(&get, "SUMMARY_LENGTH", 200)?,
            site_url: get("SITE_URL")
                .unwrap_or_else(|| "http://localhost:3000".into())
                .trim_end_matches('/')
                .to_string(),
            site_start_date,
            admin_username: get("ADMIN_USERNAME").unwrap_or_else(|| "admin".into()),
            admin_password: get("ADMIN_PASSWORD").filter(|p| !p.is_empty()),
            bcrypt_cost: parse_or(&get, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            auth_rate_per_minute: parse_positive(&get, "AUTH_RATE_PER_MINUTE", 30)?,
            request_timeout: Duration::from_secs(parse_positive(
                &get,
                "REQUEST_TIMEOUT_SECS",
                10,
            )?),
            max_concurrent_requests: parse_positive(&get, "MAX_CONCURRENT_REQUESTS", 256)?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

/// Like `parse_or`, but zero is rejected.
fn parse_positive<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq + ToString,
    G: Fn(&str) -> Option<String>,
{
    let value = parse_or(get, key, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}
