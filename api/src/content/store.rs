use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use tracing::info;

use super::{ContentError, FrontMatter, PostIndex, loader, normalize_tags};
use crate::models::Post;

/// Fields a client may set on a post.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
}

/// Content directory handle. Every read rescans the directory; nothing is
/// cached between requests.
///
/// Filesystem work is blocking, so the async methods hop onto the blocking
/// thread pool.
#[derive(Debug, Clone)]
pub struct ContentStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    dir: PathBuf,
    summary_length: usize,
}

impl ContentStore {
    pub fn new(dir: impl Into<PathBuf>, summary_length: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                dir: dir.into(),
                summary_length,
            }),
        }
    }

    pub async fn index(&self) -> Result<PostIndex, ContentError> {
        self.blocking(|inner| loader::load_index(&inner.dir, inner.summary_length))
            .await
    }

    pub async fn find(&self, slug: &str) -> Result<Post, ContentError> {
        let slug = checked_slug(slug)?;
        self.blocking(move |inner| {
            let path = inner.existing_path(&slug)?;
            loader::load_post(&path, inner.summary_length)
        })
        .await
    }

    /// Write a new post. The slug is the creation timestamp, suffixed with
    /// a counter when another post already took it.
    pub async fn create(
        &self,
        draft: PostDraft,
        author_id: String,
        author_name: String,
    ) -> Result<Post, ContentError> {
        self.blocking(move |inner| {
            let now = Utc::now();
            let front_matter = FrontMatter {
                title: Some(draft.title),
                date: Some(format_date(now)),
                tags: normalize_tags(draft.tags),
                category: clean_category(draft.category),
                author_id: Some(author_id),
                author_name: Some(author_name),
                ..Default::default()
            };
            let document = front_matter.to_document(&draft.content)?;

            fs::create_dir_all(&inner.dir).map_err(|e| ContentError::io(&inner.dir, e))?;
            let path = inner.create_exclusive(&now.format("%Y%m%d%H%M%S").to_string(), &document)?;

            info!("Post file written: {}", path.display());
            loader::load_post(&path, inner.summary_length)
        })
        .await
    }

    /// Replace title, body, tags and category. Date, author and any other
    /// metadata keys are kept.
    pub async fn update(&self, slug: &str, draft: PostDraft) -> Result<Post, ContentError> {
        let slug = checked_slug(slug)?;
        self.blocking(move |inner| {
            let path = inner.existing_path(&slug)?;
            let (mut front_matter, _) = inner.read_document(&path)?;

            front_matter.title = Some(draft.title);
            front_matter.tags = normalize_tags(draft.tags);
            front_matter.category = clean_category(draft.category);

            inner.rewrite(&path, &front_matter.to_document(&draft.content)?)?;
            loader::load_post(&path, inner.summary_length)
        })
        .await
    }

    pub async fn delete(&self, slug: &str) -> Result<(), ContentError> {
        let slug = checked_slug(slug)?;
        self.blocking(move |inner| {
            let path = inner.existing_path(&slug)?;
            fs::remove_file(&path).map_err(|e| ContentError::io(&path, e))
        })
        .await
    }

    /// Move every post in category `from` to `to`. Returns the number of
    /// rewritten files. Files that fail to parse are left untouched.
    pub async fn rename_category(&self, from: &str, to: &str) -> Result<usize, ContentError> {
        let (from, to) = (from.to_string(), to.to_string());
        self.blocking(move |inner| {
            let index = loader::load_index(&inner.dir, inner.summary_length)?;
            let mut rewritten = 0;
            let moving = index
                .posts
                .iter()
                .filter(|p| p.category.as_deref() == Some(from.as_str()));
            for post in moving {
                let path = inner.path_for(&post.slug);
                let (mut front_matter, body) = inner.read_document(&path)?;
                front_matter.category = Some(to.clone());
                inner.rewrite(&path, &front_matter.to_document(&body)?)?;
                rewritten += 1;
            }
            Ok(rewritten)
        })
        .await
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, ContentError>
    where
        T: Send + 'static,
        F: FnOnce(&Inner) -> Result<T, ContentError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&inner))
            .await
            .map_err(|e| ContentError::Task(e.to_string()))?
    }
}

impl Inner {
    fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{slug}.{}", loader::POST_EXTENSION))
    }

    fn existing_path(&self, slug: &str) -> Result<PathBuf, ContentError> {
        let path = self.path_for(slug);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ContentError::NotFound(slug.to_string()))
        }
    }

    fn read_document(&self, path: &Path) -> Result<(FrontMatter, String), ContentError> {
        let raw = fs::read_to_string(path).map_err(|e| ContentError::io(path, e))?;
        let (front_matter, body) = FrontMatter::parse(&raw)?;
        Ok((front_matter, body.to_string()))
    }

    fn create_exclusive(&self, base: &str, document: &str) -> Result<PathBuf, ContentError> {
        let mut suffix = 0u32;
        loop {
            let slug = match suffix {
                0 => base.to_string(),
                n => format!("{base}-{n}"),
            };
            let path = self.path_for(&slug);
            match fs::File::options().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(document.as_bytes())
                        .map_err(|e| ContentError::io(&path, e))?;
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => return Err(ContentError::io(&path, e)),
            }
        }
    }

    /// Write through a sibling temp file so readers never see half a post.
    fn rewrite(&self, path: &Path, document: &str) -> Result<(), ContentError> {
        let tmp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, document).map_err(|e| ContentError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            ContentError::io(path, e)
        })
    }
}

/// Slugs address files directly, so only a safe character set is allowed.
fn checked_slug(slug: &str) -> Result<String, ContentError> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(slug.to_string())
    } else {
        Err(ContentError::InvalidSlug(slug.to_string()))
    }
}

fn clean_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str, tags: &[&str], category: Option<&str>) -> PostDraft {
        PostDraft {
            title: title.into(),
            content: content.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: category.map(Into::into),
        }
    }

    #[tokio::test]
    async fn create_then_find() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path(), 200);

        let post = store
            .create(
                draft("First", "Hello **world**", &[" a ", "b", "a"], Some("notes")),
                "42".into(),
                "alice".into(),
            )
            .await
            .unwrap();
        assert_eq!(post.title, "First");
        assert_eq!(post.tags, vec!["a", "b"]);
        assert_eq!(post.category.as_deref(), Some("notes"));
        assert!(post.is_authored_by("42"));
        assert_eq!(post.summary, "Hello world");

        let found = store.find(&post.slug).await.unwrap();
        assert_eq!(found, post);
    }

    #[tokio::test]
    async fn colliding_slugs_get_a_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path(), 200);
        let inner = &store.inner;

        let first = inner.create_exclusive("20250101000000", "one").unwrap();
        let second = inner.create_exclusive("20250101000000", "two").unwrap();
        assert_ne!(first, second);
        assert!(second.ends_with("20250101000000-1.md"));
    }

    #[tokio::test]
    async fn update_keeps_author_and_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path(), 200);
        fs::write(
            dir.path().join("kept.md"),
            "---\ntitle: Old\ndate: 2024-02-02\nauthor_id: '7'\nmood: happy\n---\nold body",
        )
        .unwrap();

        let post = store
            .update("kept", draft("New", "new body", &["x"], None))
            .await
            .unwrap();
        assert_eq!(post.title, "New");
        assert_eq!(post.content, "new body");
        assert!(post.is_authored_by("7"));
        assert_eq!(post.date.format("%Y-%m-%d").to_string(), "2024-02-02");

        let raw = fs::read_to_string(dir.path().join("kept.md")).unwrap();
        assert!(raw.contains("mood: happy"));
    }

    #[tokio::test]
    async fn rejects_path_like_slugs() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path(), 200);
        assert!(matches!(
            store.find("../etc/passwd").await,
            Err(ContentError::InvalidSlug(_))
        ));
        assert!(matches!(
            store.find("missing").await,
            Err(ContentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn renames_category_across_posts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path(), 200);
        fs::write(dir.path().join("a.md"), "---\ncategory: old\n---\na").unwrap();
        fs::write(dir.path().join("b.md"), "---\ncategory: other\n---\nb").unwrap();

        assert_eq!(store.rename_category("old", "new").await.unwrap(), 1);
        let post = store.find("a").await.unwrap();
        assert_eq!(post.category.as_deref(), Some("new"));
        assert_eq!(post.content, "a");
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path(), 200);
        fs::write(dir.path().join("gone.md"), "bye").unwrap();

        store.delete("gone").await.unwrap();
        assert!(!dir.path().join("gone.md").exists());
        assert!(matches!(store.delete("gone").await, Err(ContentError::NotFound(_))));
    }
}
