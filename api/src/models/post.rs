use chrono::{DateTime, Utc};

/// A post as reconstructed from its file. Never persisted in this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// File name without the `.md` extension.
    pub slug: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    /// Raw markdown body.
    pub content: String,
    pub summary: String,
}

impl Post {
    /// Only the recorded author and admins may change a post.
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.author_id.as_deref() == Some(user_id)
    }

    /// Case-insensitive match on title, summary, body, tags and category.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&query);

        hit(&self.title)
            || hit(&self.summary)
            || hit(&self.content)
            || self.tags.iter().any(|t| hit(t))
            || self.category.as_deref().is_some_and(hit)
    }
}
