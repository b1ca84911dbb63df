//! The derivation step: turns loaded [`Source`]s into the final [`Site`], the
//! collection of published [`Post`]s (newest first) along with every index
//! computed over it. All later stages read from the same [`Site`], so the tag
//! index, pagination, and navigation can never disagree with the rendered
//! posts.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::warn;

use crate::page::{paginate, Window};
use crate::parser::{Source, Warning};
use crate::post::{Post, Status};
use crate::tag::{Tag, TagIndex};
use crate::url::{tag_file, tags_file};

/// Links from a post to its chronological neighbours, as indices into
/// [`Site::posts`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Navigation {
    /// The next older post, if any.
    pub previous: Option<usize>,

    /// The next newer post, if any.
    pub next: Option<usize>,
}

/// The published posts and their indexes.
#[derive(Debug)]
pub struct Site {
    /// Published posts, newest first. Posts sharing a date keep their load
    /// order.
    pub posts: Vec<Post>,

    /// Tags across [`Site::posts`].
    pub tags: TagIndex,

    /// Listing pages over [`Site::posts`].
    pub pages: Vec<Window>,

    /// One entry per post, parallel to [`Site::posts`].
    pub navigation: Vec<Navigation>,

    /// Sources that couldn't be turned into posts.
    pub warnings: Vec<Warning>,
}

impl Site {
    /// Derives the site from `sources`. Drafts are dropped here regardless of
    /// how the sources were loaded. Posts are converted in parallel; the
    /// indexes are computed once every post is ready.
    pub fn derive(sources: Vec<Source>, default_author: &str, posts_per_page: usize) -> Site {
        let results: Vec<(std::path::PathBuf, Result<Post, _>)> = sources
            .into_par_iter()
            .filter(|source| source.status == Status::Published)
            .map(|source| (source.path.clone(), Post::from_source(source, default_author)))
            .collect();

        let mut posts = Vec::with_capacity(results.len());
        let mut warnings = Vec::new();
        for (path, result) in results {
            match result {
                Ok(post) => posts.push(post),
                Err(error) => {
                    let warning = Warning { path, error };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        Site {
            tags: TagIndex::build(&posts),
            pages: paginate(posts.len(), posts_per_page),
            navigation: navigation(posts.len()),
            posts,
            warnings,
        }
    }

    /// Slugs shared by more than one post, with the indices of those posts.
    /// Colliding posts are written to the same file, and the one written last
    /// (the oldest) wins.
    pub fn slug_collisions(&self) -> Vec<(&str, Vec<usize>)> {
        let mut by_slug: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, post) in self.posts.iter().enumerate() {
            by_slug.entry(post.slug.as_str()).or_default().push(i);
        }
        by_slug
            .into_iter()
            .filter(|(_, posts)| posts.len() > 1)
            .collect()
    }

    /// Tags whose page would be written to the tag index page's file (a tag
    /// slugified to `index`). The tag index page wins, so these tags have no
    /// page of their own.
    pub fn shadowed_tags(&self) -> Vec<&Tag> {
        let index_file = tags_file();
        self.tags
            .iter()
            .filter(|tag| tag_file(&tag.slug) == index_file)
            .collect()
    }
}

// Posts are sorted newest first, so the older neighbour is at `i + 1`.
fn navigation(len: usize) -> Vec<Navigation> {
    (0..len)
        .map(|i| Navigation {
            previous: match i + 1 < len {
                true => Some(i + 1),
                false => None,
            },
            next: match i > 0 {
                true => Some(i - 1),
                false => None,
            },
        })
        .collect()
}
