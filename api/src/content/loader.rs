//! Builds the post index from a content directory.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use super::{ContentError, FrontMatter, markdown};
use crate::models::Post;

pub const POST_EXTENSION: &str = "md";

/// A file that could not be turned into a post.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// All posts of the content directory, newest first.
#[derive(Debug, Default)]
pub struct PostIndex {
    pub posts: Vec<Post>,
    pub skipped: Vec<SkippedFile>,
}

/// Scan `dir` and parse every markdown file.
///
/// A file that cannot be read or parsed is skipped with a diagnostic; it
/// never aborts the whole build. A missing directory is an empty blog.
pub fn load_index(dir: &Path, summary_length: usize) -> Result<PostIndex, ContentError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PostIndex::default()),
        Err(e) => return Err(ContentError::io(dir, e)),
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_post_file(path))
        .collect();
    // read_dir order is platform dependent; ties on date keep file name order
    paths.sort();

    let mut index = PostIndex::default();
    for path in paths {
        match load_post(&path, summary_length) {
            Ok(post) => index.posts.push(post),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                index.skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    index.posts.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(index)
}

pub fn is_post_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == POST_EXTENSION)
}

/// Read and parse a single post file.
pub fn load_post(path: &Path, summary_length: usize) -> Result<Post, ContentError> {
    let slug = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ContentError::InvalidSlug(path.display().to_string()))?
        .to_string();

    let raw = fs::read_to_string(path).map_err(|e| ContentError::io(path, e))?;

    parse_post(&slug, &raw, summary_length, || modified_time(path))
}

/// Build a post from its slug and file content. `fallback_date` is only
/// consulted when the front-matter has no date.
pub fn parse_post<F>(
    slug: &str,
    raw: &str,
    summary_length: usize,
    fallback_date: F,
) -> Result<Post, ContentError>
where
    F: FnOnce() -> DateTime<Utc>,
{
    let (front_matter, body) = FrontMatter::parse(raw)?;

    let date = match front_matter.date.as_deref() {
        Some(raw_date) => parse_date(raw_date)
            .ok_or_else(|| ContentError::InvalidDate(raw_date.to_string()))?,
        None => fallback_date(),
    };

    let FrontMatter {
        title,
        tags,
        category,
        author_id,
        author_name,
        ..
    } = front_matter;

    Ok(Post {
        slug: slug.to_string(),
        title: title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| slug.to_string()),
        date,
        tags,
        category: category.filter(|c| !c.trim().is_empty()),
        author_id,
        author_name,
        summary: markdown::summarize(body, summary_length),
        content: body.to_string(),
    })
}

/// Accepts RFC 3339 and the common `YYYY-MM-DD[ HH:MM[:SS]]` spellings.
/// Values without an offset are read as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(date.and_utc());
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
        }
    }

    None
}

fn modified_time(path: &Path) -> DateTime<Utc> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}
