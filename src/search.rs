//! The client-side search index, `posts.json`: one lightweight record per
//! published post, newest first. Bodies are left out to keep it small.

use serde::Serialize;

use crate::site::Site;

/// The name of the search index file in the output directory.
pub const SEARCH_INDEX_FILE: &str = "posts.json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Record<'a> {
    title: &'a str,
    slug: &'a str,
    author: &'a str,
    date: String,
    tags: &'a [String],
    excerpt: &'a str,
    reading_time: usize,
}

/// Serializes the search index for `site` as pretty-printed JSON.
pub fn search_index(site: &Site) -> serde_json::Result<String> {
    let records: Vec<Record> = site
        .posts
        .iter()
        .map(|post| Record {
            title: &post.title,
            slug: &post.slug,
            author: &post.author,
            date: post.date.to_string(),
            tags: &post.tags,
            excerpt: &post.excerpt,
            reading_time: post.reading_time,
        })
        .collect();
    serde_json::to_string_pretty(&records)
}
