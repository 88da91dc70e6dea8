use crate::{content::PostDraft, models::Role};
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError};

#[derive(Debug, Validate, Deserialize)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 3, max = 20, message = "Username must be 3-20 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 100, message = "Password must be 6-100 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body of both post creation and post update.
#[derive(Debug, Validate, Deserialize)]
pub struct PostRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 200000, message = "Content must not be empty"))]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: Option<String>,
}

impl From<PostRequest> for PostDraft {
    fn from(request: PostRequest) -> Self {
        Self {
            title: request.title.trim().to_string(),
            content: request.content,
            tags: request.tags,
            category: request.category,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Validate, Deserialize)]
pub struct CategoryRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 50, message = "Category name must be 1-50 characters"))]
    pub name: String,
}

#[derive(Debug, Validate, Deserialize)]
pub struct ActivateThemeRequest {
    #[validate(custom(function = "validate_theme_name"))]
    pub theme: String,
}

/// Names are validated and stored without surrounding whitespace.
fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|raw| raw.trim().to_string())
}

/// Theme names end up in a stylesheet path.
fn validate_theme_name(name: &str) -> Result<(), ValidationError> {
    let valid = (1..=50).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("theme_name")
            .with_message("Theme name must be 1-50 letters, digits, '-' or '_'".into()))
    }
}

/// `GET /posts` query parameters
#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    /// Free-text search over title, summary, body, tags and category.
    pub q: Option<String>,
}

fn default_page() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(json: &str) -> RegisterRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn username_length_counts_without_padding() {
        let blank = register(r#"{"username":"     ","password":"password123"}"#);
        assert_eq!(blank.username, "");
        assert!(blank.validate().is_err());

        let short = register(r#"{"username":"  ab  ","password":"password123"}"#);
        assert!(short.validate().is_err());

        let padded = register(r#"{"username":"  alice ","password":"password123"}"#);
        assert_eq!(padded.username, "alice");
        assert!(padded.validate().is_ok());
    }

    #[test]
    fn category_name_is_trimmed_before_validation() {
        let request: CategoryRequest = serde_json::from_str(r#"{"name":"   "}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn theme_names_are_path_safe() {
        let check = |theme: &str| ActivateThemeRequest { theme: theme.into() }.validate();
        assert!(check("dark-mode_2").is_ok());
        assert!(check("../evil").is_err());
        assert!(check("").is_err());
    }
}
