//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: loading the post sources
//! ([`crate::parser`]), deriving the site model ([`crate::site`]), rendering
//! pages ([`crate::render`]), emitting the search index, feeds, and sitemap,
//! and finally writing everything to disk ([`crate::write`]).

use crate::config::Config;
use crate::feed::{self, FeedConfig, ATOM_FILE, RSS_FILE};
use crate::parser::{self, Parser, Warning};
use crate::render::Renderer;
use crate::search::{search_index, SEARCH_INDEX_FILE};
use crate::site::Site;
use crate::sitemap::{sitemap, SITEMAP_FILE};
use crate::template::{self, Theme};
use crate::url::Routes;
use crate::write::{self, write_site, OutputFile};
use tracing::{debug, info, warn};

/// What a successful build produced.
#[derive(Debug)]
pub struct BuildReport {
    /// The number of published posts.
    pub posts: usize,

    /// The number of files written, not counting passthrough assets.
    pub files: usize,

    /// The number of distinct tags.
    pub tags: usize,

    /// Post files that were skipped.
    pub warnings: Vec<Warning>,
}

/// Builds the site described by `config`. Individual posts that fail to
/// load are skipped and reported in [`BuildReport::warnings`]; anything else
/// that goes wrong fails the build and leaves the previous output in place.
pub fn build_site(config: &Config) -> Result<BuildReport> {
    let loaded = Parser::new(&config.excluded_directories)
        .parse_posts(&config.posts_source_directory)?;
    debug!(sources = loaded.sources.len(), "loaded post sources");

    let theme = Theme::load(&config.templates_directory)?;

    let site = Site::derive(loaded.sources, &config.author, config.posts_per_page);
    for (slug, posts) in site.slug_collisions() {
        let paths: Vec<String> = posts
            .iter()
            .map(|&i| site.posts[i].source_path.display().to_string())
            .collect();
        warn!(slug, sources = ?paths, "posts share a slug; only the oldest is kept");
    }
    for tag in site.shadowed_tags() {
        warn!(
            tag = %tag.name,
            slug = %tag.slug,
            "tag page collides with the tag index page; only the tag index is kept"
        );
    }

    let routes = Routes::new(&config.base_url, &config.base_path);
    let mut files = Renderer {
        config,
        theme: &theme,
        routes: &routes,
        site: &site,
    }
    .render_all();

    let feed_config = FeedConfig {
        config,
        routes: &routes,
    };
    files.push(OutputFile::new(SEARCH_INDEX_FILE, search_index(&site)?));
    files.push(OutputFile::new(RSS_FILE, feed::rss(&feed_config, &site)));
    files.push(OutputFile::new(ATOM_FILE, feed::atom(&feed_config, &site)?));
    files.push(OutputFile::new(SITEMAP_FILE, sitemap(&site, &routes)));

    write_site(
        &config.output_directory,
        &files,
        &config.passthrough_directories,
    )?;

    let mut warnings = loaded.warnings;
    warnings.extend(site.warnings);
    let report = BuildReport {
        posts: site.posts.len(),
        files: files.len(),
        tags: site.tags.len(),
        warnings,
    };
    info!(
        posts = report.posts,
        files = report.files,
        tags = report.tags,
        warnings = report.warnings.len(),
        output = %config.output_directory.display(),
        "built site"
    );
    Ok(report)
}

/// The result of a build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during loading,
/// template loading, feed or index serialization, and writing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the post sources can't be loaded at all.
    #[error("loading posts: {0}")]
    Parse(#[from] parser::Error),

    /// Returned when a template is missing or unreadable.
    #[error(transparent)]
    Template(#[from] template::Error),

    /// Returned for errors serializing the search index.
    #[error("serializing search index: {0}")]
    SearchIndex(#[from] serde_json::Error),

    /// Returned for errors generating the feeds.
    #[error(transparent)]
    Feed(#[from] feed::Error),

    /// Returned for errors writing the output directory.
    #[error(transparent)]
    Write(#[from] write::Error),
}
