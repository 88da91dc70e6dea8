//! File-backed post storage: markdown files with YAML front-matter.

mod frontmatter;
mod loader;
pub mod markdown;
mod store;
mod tags;

use std::{
    io,
    path::{Path, PathBuf},
};

pub use self::{
    frontmatter::{FrontMatter, normalize_tags},
    loader::{PostIndex, SkippedFile, load_index, load_post, parse_date, parse_post},
    store::{ContentStore, PostDraft},
    tags::TagIndex,
};

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed front-matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("unrecognized date {0:?}")]
    InvalidDate(String),

    #[error("post {0:?} not found")]
    NotFound(String),

    #[error("invalid post identifier {0:?}")]
    InvalidSlug(String),

    #[error("content task failed: {0}")]
    Task(String),
}

impl ContentError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        ContentError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
