//! Renders every HTML page of the site: the paginated home and blog listings,
//! one page per post, one page per tag, and the tag index. Each page kind
//! renders its own template and then embeds the result in the shared layout.
//!
//! Text that comes from posts (titles, excerpts, tag names, authors) is
//! escaped before substitution. Post bodies are inserted as-is; they are
//! produced by the Markdown converter.

use rayon::prelude::*;

use crate::config::Config;
use crate::page::Window;
use crate::post::Post;
use crate::site::Site;
use crate::tag::Tag;
use crate::template::{escape_html, render, Bindings, Theme};
use crate::url::{post_file, tag_file, tags_file, Listing, Routes};
use crate::write::OutputFile;

const BASE_KEYS: &[&str] = &[
    "title",
    "description",
    "content",
    "siteTitle",
    "canonical",
    "basePath",
    "ogType",
    "ogImage",
];
const HOME_KEYS: &[&str] = &["posts", "pagination", "tagCloud", "totalPosts"];
const BLOG_KEYS: &[&str] = &["posts", "pagination"];
const POST_KEYS: &[&str] = &[
    "title",
    "author",
    "date",
    "rawDate",
    "readingTime",
    "tags",
    "content",
    "postNav",
];
const TAG_KEYS: &[&str] = &["tagName", "posts", "count"];
const TAGS_KEYS: &[&str] = &["tags", "count"];

/// The layout values that differ between pages. `title` and `description`
/// are raw text; they are escaped when the layout is rendered. `canonical`
/// is a site path and becomes an absolute URL.
struct Layout {
    title: String,
    description: String,
    canonical: String,
    og_type: &'static str,
}

/// Renders pages for one [`Site`].
pub struct Renderer<'a> {
    pub config: &'a Config,
    pub theme: &'a Theme,
    pub routes: &'a Routes,
    pub site: &'a Site,
}

impl Renderer<'_> {
    /// Renders every page. Listing pages come first, then posts, tag pages,
    /// and the tag index.
    pub fn render_all(&self) -> Vec<OutputFile> {
        let mut pages = self.listing_pages(Listing::Home);
        pages.extend(self.listing_pages(Listing::Blog));
        pages.par_extend((0..self.site.posts.len()).into_par_iter().map(|i| self.post_page(i)));
        pages.extend(self.site.tags.iter().map(|tag| self.tag_page(tag)));
        pages.push(self.tags_page());
        pages
    }

    /// Renders all pages of a listing.
    pub fn listing_pages(&self, listing: Listing) -> Vec<OutputFile> {
        self.site
            .pages
            .iter()
            .map(|window| self.listing_page(listing, window))
            .collect()
    }

    fn listing_page(&self, listing: Listing, window: &Window) -> OutputFile {
        let cards = window
            .slice(&self.site.posts)
            .iter()
            .map(|post| self.post_card(post))
            .collect::<Vec<_>>()
            .join("\n");
        let pagination = self.pagination(listing, window);

        let (content, layout) = match listing {
            Listing::Home => (
                render(
                    &self.theme.home,
                    &Bindings::new(HOME_KEYS)
                        .with("posts", cards)
                        .with("pagination", pagination)
                        .with("tagCloud", self.tag_cloud())
                        .with("totalPosts", self.site.posts.len().to_string()),
                ),
                Layout {
                    title: match window.number {
                        1 => self.config.title.clone(),
                        n => format!("{} - Page {}", self.config.title, n),
                    },
                    description: self.config.description.clone(),
                    canonical: self.routes.listing(listing, window.number),
                    og_type: "website",
                },
            ),
            Listing::Blog => (
                render(
                    &self.theme.blog,
                    &Bindings::new(BLOG_KEYS)
                        .with("posts", cards)
                        .with("pagination", pagination),
                ),
                Layout {
                    title: match window.number {
                        1 => format!("Blog | {}", self.config.title),
                        n => format!("Blog - Page {} | {}", n, self.config.title),
                    },
                    description: String::from("Browse all blog posts"),
                    canonical: self.routes.listing(listing, window.number),
                    og_type: "website",
                },
            ),
        };

        OutputFile {
            path: listing.file(window.number),
            contents: self.layout(&layout, &content),
        }
    }

    /// Renders the page for the post at `index` in [`Site::posts`].
    pub fn post_page(&self, index: usize) -> OutputFile {
        let post = &self.site.posts[index];
        let content = render(
            &self.theme.post,
            &Bindings::new(POST_KEYS)
                .with("title", escape_html(&post.title))
                .with("author", escape_html(&post.author))
                .with("date", post.display_date())
                .with("rawDate", post.date.to_string())
                .with("readingTime", post.reading_time.to_string())
                .with("tags", self.tag_badges(post))
                .with("content", post.html.as_str())
                .with("postNav", self.post_nav(index)),
        );
        let layout = Layout {
            title: format!("{} | {}", post.title, self.config.title),
            description: post.excerpt.clone(),
            canonical: self.routes.post(&post.slug),
            og_type: "article",
        };
        OutputFile {
            path: post_file(&post.slug),
            contents: self.layout(&layout, &content),
        }
    }

    /// Renders the listing page for one tag.
    pub fn tag_page(&self, tag: &Tag) -> OutputFile {
        let cards = tag
            .posts
            .iter()
            .map(|&i| self.post_card(&self.site.posts[i]))
            .collect::<Vec<_>>()
            .join("\n");
        let content = render(
            &self.theme.tag,
            &Bindings::new(TAG_KEYS)
                .with("tagName", escape_html(&tag.name))
                .with("posts", cards)
                .with("count", tag.posts.len().to_string()),
        );
        let layout = Layout {
            title: format!("Posts tagged \"{}\" | {}", tag.name, self.config.title),
            description: format!("Browse posts tagged with {}", tag.name),
            canonical: self.routes.tag(&tag.slug),
            og_type: "website",
        };
        OutputFile {
            path: tag_file(&tag.slug),
            contents: self.layout(&layout, &content),
        }
    }

    /// Renders the page listing every tag with its post count.
    pub fn tags_page(&self) -> OutputFile {
        let links = self
            .site
            .tags
            .by_name()
            .iter()
            .map(|tag| {
                format!(
                    r#"<a href="{}" class="tag-page-link"><span class="tag-name">{}</span><span class="tag-count">{}</span></a>"#,
                    escape_html(&self.routes.tag(&tag.slug)),
                    escape_html(&tag.name),
                    tag.posts.len(),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let content = render(
            &self.theme.tags,
            &Bindings::new(TAGS_KEYS)
                .with("tags", links)
                .with("count", self.site.tags.len().to_string()),
        );
        let layout = Layout {
            title: format!("Tags | {}", self.config.title),
            description: String::from("Browse posts by tag"),
            canonical: self.routes.tags(),
            og_type: "website",
        };
        OutputFile {
            path: tags_file(),
            contents: self.layout(&layout, &content),
        }
    }

    fn layout(&self, layout: &Layout, content: &str) -> String {
        render(
            &self.theme.base,
            &Bindings::new(BASE_KEYS)
                .with("title", escape_html(&layout.title))
                .with("description", escape_html(&layout.description))
                .with("content", content)
                .with("siteTitle", escape_html(&self.config.title))
                .with("canonical", escape_html(&self.routes.absolute(&layout.canonical)))
                .with("basePath", escape_html(self.routes.base_path()))
                .with("ogType", layout.og_type),
        )
    }

    fn post_card(&self, post: &Post) -> String {
        format!(
            r#"
    <article class="post-card">
      <div class="post-card-body">
        <div class="post-card-meta">
          <span class="post-card-date">{date}</span>
          <span class="post-card-reading">{reading_time} min read</span>
        </div>
        <h2 class="post-card-title">
          <a href="{url}">{title}</a>
        </h2>
        <p class="post-card-excerpt">{excerpt}</p>
        <div class="post-card-footer">
          <span class="post-card-author">By {author}</span>
          <div class="post-card-tags">{tags}</div>
        </div>
      </div>
    </article>"#,
            date = post.display_date(),
            reading_time = post.reading_time,
            url = escape_html(&self.routes.post(&post.slug)),
            title = escape_html(&post.title),
            excerpt = escape_html(&post.excerpt),
            author = escape_html(&post.author),
            tags = self.tag_badges(post),
        )
    }

    fn tag_badges(&self, post: &Post) -> String {
        post.unique_tags()
            .iter()
            .map(|(slug, name)| self.tag_badge(slug, name))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn tag_badge(&self, slug: &str, name: &str) -> String {
        format!(
            r#"<a href="{}" class="tag-badge">{}</a>"#,
            escape_html(&self.routes.tag(slug)),
            escape_html(name),
        )
    }

    fn tag_cloud(&self) -> String {
        self.site
            .tags
            .by_name()
            .iter()
            .map(|tag| self.tag_badge(&tag.slug, &tag.name))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The "Newer"/"Older" navigation for a listing page. Empty when the
    /// listing has a single page.
    fn pagination(&self, listing: Listing, window: &Window) -> String {
        if window.total <= 1 {
            return String::new();
        }

        let mut html = String::from(r#"<nav class="pagination" aria-label="Pagination">"#);
        match window.has_newer() {
            true => html.push_str(&format!(
                r#"<a href="{}" class="pagination-btn">&larr; Newer</a>"#,
                escape_html(&self.routes.listing(listing, window.number - 1)),
            )),
            false => html.push_str(r#"<span class="pagination-btn disabled">&larr; Newer</span>"#),
        }
        html.push_str(&format!(
            r#"<span class="pagination-info">Page {} of {}</span>"#,
            window.number, window.total
        ));
        match window.has_older() {
            true => html.push_str(&format!(
                r#"<a href="{}" class="pagination-btn">Older &rarr;</a>"#,
                escape_html(&self.routes.listing(listing, window.number + 1)),
            )),
            false => html.push_str(r#"<span class="pagination-btn disabled">Older &rarr;</span>"#),
        }
        html.push_str("</nav>");
        html
    }

    /// Links to the chronologically adjacent posts.
    fn post_nav(&self, index: usize) -> String {
        let nav = self.site.navigation[index];
        let mut html = String::from(r#"<nav class="post-nav">"#);
        match nav.previous.map(|i| &self.site.posts[i]) {
            Some(older) => html.push_str(&format!(
                r#"<a href="{}" class="post-nav-link post-nav-prev"><span class="post-nav-label">&larr; Previous</span><span class="post-nav-title">{}</span></a>"#,
                escape_html(&self.routes.post(&older.slug)),
                escape_html(&older.title),
            )),
            None => html.push_str(r#"<span class="post-nav-link"></span>"#),
        }
        match nav.next.map(|i| &self.site.posts[i]) {
            Some(newer) => html.push_str(&format!(
                r#"<a href="{}" class="post-nav-link post-nav-next"><span class="post-nav-label">Next &rarr;</span><span class="post-nav-title">{}</span></a>"#,
                escape_html(&self.routes.post(&newer.slug)),
                escape_html(&newer.title),
            )),
            None => html.push_str(r#"<span class="post-nav-link"></span>"#),
        }
        html.push_str("</nav>");
        html
    }
}
