use std::collections::BTreeMap;

use crate::models::Post;

/// Tag counts and per-tag post lists, derived from a post slice.
#[derive(Debug, Default)]
pub struct TagIndex<'a> {
    counts: BTreeMap<&'a str, usize>,
    posts: BTreeMap<&'a str, Vec<&'a Post>>,
}

impl<'a> TagIndex<'a> {
    pub fn build(posts: &'a [Post]) -> Self {
        let mut index = TagIndex::default();

        for post in posts {
            for (i, tag) in post.tags.iter().enumerate() {
                // a post counts once per tag even if the tag is repeated
                if post.tags[..i].contains(tag) {
                    continue;
                }
                *index.counts.entry(tag.as_str()).or_default() += 1;
                index.posts.entry(tag.as_str()).or_default().push(post);
            }
        }

        for list in index.posts.values_mut() {
            list.sort_by(|a, b| b.date.cmp(&a.date));
        }

        index
    }

    pub fn count(&self, tag: &str) -> usize {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    pub fn posts(&self, tag: &str) -> &[&'a Post] {
        self.posts.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn counts(&self) -> &BTreeMap<&'a str, usize> {
        &self.counts
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a Post])> + '_ {
        self.posts.iter().map(|(tag, posts)| (*tag, posts.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
