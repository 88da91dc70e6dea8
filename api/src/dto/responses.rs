use crate::{
    auth::Identity,
    content::markdown,
    models::{Category, Post, Role, User},
    pagination::Page,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthCheckResponse {
    pub is_authenticated: bool,
    pub user: Option<Identity>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> PaginatedResponse<T> {
    pub fn from_page<S>(page: Page<'_, S>, f: impl FnMut(&S) -> T) -> Self {
        Self {
            data: page.items.iter().map(f).collect(),
            page: page.page,
            limit: page.per_page,
            total: page.total,
            total_pages: page.total_pages,
        }
    }
}

/// A post without its body, as shown in lists.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    pub summary: String,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            date: post.date,
            tags: post.tags.clone(),
            category: post.category.clone(),
            author_id: post.author_id.clone(),
            author_name: post.author_name.clone(),
            summary: post.summary.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostSummary,
    pub content: String,
    pub html: String,
}

impl From<&Post> for PostDetail {
    fn from(post: &Post) -> Self {
        Self {
            post: post.into(),
            content: post.content.clone(),
            html: markdown::render_html(&post.content),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: BTreeMap<String, usize>,
    pub tag_posts: BTreeMap<String, Vec<PostSummary>>,
}

#[derive(Debug, Serialize)]
pub struct TagPostsResponse {
    pub tag: String,
    pub count: usize,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteStats {
    pub post_count: usize,
    pub tag_count: usize,
    pub category_count: usize,
    pub days_running: i64,
}

#[derive(Debug, Serialize)]
pub struct ArchiveYear {
    pub year: i32,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Serialize)]
pub struct ArchiveResponse {
    pub articles: Vec<PostSummary>,
    pub years: Vec<ArchiveYear>,
    pub stats: SiteStats,
}

#[derive(Debug, Serialize)]
pub struct AboutResponse {
    pub site_title: String,
    pub site_description: String,
    pub site_author: String,
    pub social_links: crate::models::SocialLinks,
    pub stats: SiteStats,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub name: String,
    pub slug: String,
    pub article_count: usize,
    pub created_at: Option<DateTime<Utc>>,
}

impl CategoryResponse {
    pub fn new(name: &str, article_count: usize, category: Option<&Category>) -> Self {
        Self {
            name: name.to_string(),
            slug: slug::slugify(name),
            article_count,
            created_at: category.map(|c| c.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagArticle {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct AdminTagResponse {
    pub name: String,
    pub slug: String,
    pub article_count: usize,
    pub articles: Vec<TagArticle>,
}

#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub posts: usize,
    pub categories: usize,
    pub tags: usize,
    pub users: usize,
}
