//! Defines the [`Tag`] and [`TagIndex`] types. The index maps each tag slug
//! to its display name and the posts carrying it.

use std::collections::BTreeMap;

use crate::post::Post;

/// Represents one entry in the [`TagIndex`]. Tags are identified by slug, so
/// e.g. `macOS` and `MacOS` resolve to the same tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    /// The tag's slug; its page lives at `/tags/{slug}.html`.
    pub slug: String,

    /// The spelling of the first occurrence of this tag.
    pub name: String,

    /// Indices of the posts carrying this tag, in the order of the post
    /// collection the index was built from.
    pub posts: Vec<usize>,
}

/// A mapping from tag slug to [`Tag`], iterated in slug order.
#[derive(Clone, Debug, Default)]
pub struct TagIndex {
    tags: BTreeMap<String, Tag>,
}

impl TagIndex {
    /// Indexes `posts` by tag. A post appears at most once per tag even if
    /// several of its tags share a slug.
    pub fn build(posts: &[Post]) -> TagIndex {
        let mut tags: BTreeMap<String, Tag> = BTreeMap::new();
        for (i, post) in posts.iter().enumerate() {
            for (slug, name) in post.unique_tags() {
                tags.entry(slug)
                    .or_insert_with_key(|slug| Tag {
                        slug: slug.clone(),
                        name: name.to_owned(),
                        posts: Vec::new(),
                    })
                    .posts
                    .push(i);
            }
        }
        TagIndex { tags }
    }

    pub fn get(&self, slug: &str) -> Option<&Tag> {
        self.tags.get(slug)
    }

    /// Iterates over the tags in slug order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    /// The tags sorted by display name (case-insensitively), for listings.
    pub fn by_name(&self) -> Vec<&Tag> {
        let mut tags: Vec<&Tag> = self.tags.values().collect();
        tags.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.slug.cmp(&b.slug))
        });
        tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
