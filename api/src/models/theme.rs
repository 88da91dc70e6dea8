use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ThemeRecord {
    pub id: i64,
    pub name: String,
    pub css_file: Option<String>,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ThemeRecord {
    /// Stylesheet path used when a theme is created on activation.
    pub fn stylesheet_for(name: &str) -> String {
        format!("css/themes/{name}.css")
    }
}
