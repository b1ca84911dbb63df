//! Defines the [`Post`] type and the per-post derivations: slug, excerpt, and
//! reading time. A [`Post`] is built once from a [`Source`] and never mutated
//! afterwards.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::markdown;
use crate::parser::{Error, Source};

/// Words read per minute, for [`reading_time`].
pub const WORDS_PER_MINUTE: usize = 200;

/// The maximum number of characters in an excerpt, not counting the
/// ellipsis.
pub const EXCERPT_LENGTH: usize = 160;

const ELLIPSIS: &str = "...";

/// The publication status of a post. Only published posts are part of the
/// public site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Published,
    Draft,
}

impl From<&str> for Status {
    fn from(s: &str) -> Status {
        match s.trim() == "published" {
            true => Status::Published,
            false => Status::Draft,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self {
            Status::Published => "published",
            Status::Draft => "draft",
        })
    }
}

/// Represents a blog post.
#[derive(Clone, Debug)]
pub struct Post {
    /// The post's identity: its page lives at `/post/{slug}.html`.
    pub slug: String,

    /// The title of the post.
    pub title: String,

    /// The post's author, or the site author.
    pub author: String,

    /// The publication date of the post.
    pub date: NaiveDate,

    /// The tags as written in the front-matter, in order.
    pub tags: Vec<String>,

    pub status: Status,

    /// The raw Markdown body.
    pub body: String,

    /// The body rendered to HTML.
    pub html: String,

    /// Plain-text summary of the body, at most [`EXCERPT_LENGTH`] characters
    /// plus an ellipsis.
    pub excerpt: String,

    /// Minutes to read the body, at least 1.
    pub reading_time: usize,

    /// The file the post was parsed from.
    pub source_path: PathBuf,
}

impl Post {
    /// Builds a [`Post`] from a [`Source`], rendering its body and computing
    /// the derived fields. Fails only if no slug can be derived.
    pub fn from_source(source: Source, default_author: &str) -> Result<Post, Error> {
        let slug = slug_for(&source).ok_or(Error::MissingSlug)?;
        Ok(Post {
            html: markdown::to_html(&source.body),
            excerpt: excerpt(&source.body),
            reading_time: reading_time(&source.body),
            author: source.author.unwrap_or_else(|| default_author.to_owned()),
            slug,
            title: source.title,
            date: source.date,
            tags: source.tags,
            status: source.status,
            body: source.body,
            source_path: source.path,
        })
    }

    /// The publication date for display, e.g. `January 2, 2024`.
    pub fn display_date(&self) -> String {
        display_date(self.date)
    }

    /// The post's tags with duplicates (by slug) removed, first spelling
    /// wins. Tags that slugify to nothing are dropped.
    pub fn unique_tags(&self) -> Vec<(String, &str)> {
        let mut seen: Vec<(String, &str)> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let slug = slugify(tag);
            if !slug.is_empty() && !seen.iter().any(|(s, _)| *s == slug) {
                seen.push((slug, tag.as_str()));
            }
        }
        seen
    }
}

/// Formats a date for display, e.g. `January 2, 2024`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Converts a string to a slug: ASCII, lowercase, with every run of
/// non-alphanumeric characters replaced by a single hyphen and no leading or
/// trailing hyphen. May be empty.
pub fn slugify(s: &str) -> String {
    slug::slugify(s)
}

/// Resolves a source's slug. The explicit `slug` field wins, then the title,
/// then the file name. Each candidate is slugified; empty results are
/// skipped.
pub fn slug_for(source: &Source) -> Option<String> {
    let file_stem = source
        .path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned());
    source
        .slug
        .iter()
        .chain(std::iter::once(&source.title))
        .chain(file_stem.iter())
        .map(|candidate| slugify(candidate))
        .find(|slug| !slug.is_empty())
}

/// Builds a plain-text excerpt of a Markdown body. The text is truncated to
/// [`EXCERPT_LENGTH`] characters, and [`ELLIPSIS`] is appended only when
/// something was cut.
pub fn excerpt(markdown: &str) -> String {
    let plain = markdown::to_plain_text(markdown);
    match plain.char_indices().nth(EXCERPT_LENGTH) {
        None => plain,
        Some((cut, _)) => format!("{}{}", plain[..cut].trim_end(), ELLIPSIS),
    }
}

/// Whitespace-delimited word count divided by [`WORDS_PER_MINUTE`], rounded
/// up, and never less than 1.
pub fn reading_time(markdown: &str) -> usize {
    let words = markdown.split_whitespace().count();
    std::cmp::max(1, (words + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE)
}
