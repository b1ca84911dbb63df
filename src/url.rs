//! Canonical URL paths for every kind of page. Internal links, pagination
//! links, feeds, and the sitemap all go through [`Routes`], and output file
//! locations mirror the same conventions, so they always agree.

use std::path::PathBuf;

use url::Url;

/// A paginated listing of every post.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Listing {
    /// `/`, `/index-2.html`, ...
    Home,

    /// `/blog/index.html`, `/blog/index-2.html`, ...
    Blog,
}

impl Listing {
    /// The output file for page `number` (1-based), relative to the output
    /// directory.
    pub fn file(&self, number: usize) -> PathBuf {
        let file_name = match number {
            1 => String::from("index.html"),
            n => format!("index-{}.html", n),
        };
        match self {
            Listing::Home => PathBuf::from(file_name),
            Listing::Blog => PathBuf::from("blog").join(file_name),
        }
    }
}

/// The output file for a post page.
pub fn post_file(slug: &str) -> PathBuf {
    PathBuf::from("post").join(format!("{}.html", slug))
}

/// The output file for a tag page.
pub fn tag_file(slug: &str) -> PathBuf {
    PathBuf::from("tags").join(format!("{}.html", slug))
}

/// The output file for the tag index page.
pub fn tags_file() -> PathBuf {
    PathBuf::from("tags").join("index.html")
}

/// Builds site-relative paths (prefixed with the site's base path) and
/// absolute URLs.
#[derive(Clone, Debug)]
pub struct Routes {
    /// Empty, or a path starting with `/` without a trailing slash.
    base_path: String,

    /// The site URL without a trailing slash.
    origin: String,
}

impl Routes {
    pub fn new(base_url: &Url, base_path: &str) -> Routes {
        Routes {
            base_path: base_path.to_owned(),
            origin: base_url.as_str().trim_end_matches('/').to_owned(),
        }
    }

    /// The site's base path, for templates.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// The path of page `number` of a listing. The first home page is the
    /// site root.
    pub fn listing(&self, listing: Listing, number: usize) -> String {
        match (listing, number) {
            (Listing::Home, 1) => format!("{}/", self.base_path),
            (Listing::Home, n) => format!("{}/index-{}.html", self.base_path, n),
            (Listing::Blog, 1) => format!("{}/blog/index.html", self.base_path),
            (Listing::Blog, n) => format!("{}/blog/index-{}.html", self.base_path, n),
        }
    }

    pub fn post(&self, slug: &str) -> String {
        format!("{}/post/{}.html", self.base_path, slug)
    }

    pub fn tag(&self, slug: &str) -> String {
        format!("{}/tags/{}.html", self.base_path, slug)
    }

    pub fn tags(&self) -> String {
        format!("{}/tags/index.html", self.base_path)
    }

    /// Converts a site-relative path from one of the other methods into an
    /// absolute URL.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn routes(base_url: &str, base_path: &str) -> Routes {
        Routes::new(&Url::parse(base_url).unwrap(), base_path)
    }

    #[test]
    fn test_listing_paths() {
        let r = routes("https://example.org", "");
        assert_eq!("/", r.listing(Listing::Home, 1));
        assert_eq!("/index-2.html", r.listing(Listing::Home, 2));
        assert_eq!("/blog/index.html", r.listing(Listing::Blog, 1));
        assert_eq!("/blog/index-3.html", r.listing(Listing::Blog, 3));
    }

    #[test]
    fn test_listing_files_match_paths() {
        assert_eq!(PathBuf::from("index.html"), Listing::Home.file(1));
        assert_eq!(PathBuf::from("index-2.html"), Listing::Home.file(2));
        assert_eq!(PathBuf::from("blog/index.html"), Listing::Blog.file(1));
        assert_eq!(PathBuf::from("blog/index-4.html"), Listing::Blog.file(4));
        assert_eq!(PathBuf::from("post/hello.html"), post_file("hello"));
        assert_eq!(PathBuf::from("tags/go.html"), tag_file("go"));
        assert_eq!(PathBuf::from("tags/index.html"), tags_file());
    }

    #[test]
    fn test_base_path_and_absolute() {
        let r = routes("https://example.org/", "/blog");
        assert_eq!("/blog/", r.listing(Listing::Home, 1));
        assert_eq!("/blog/post/hello.html", r.post("hello"));
        assert_eq!("/blog/tags/go.html", r.tag("go"));
        assert_eq!("/blog/tags/index.html", r.tags());
        assert_eq!(
            "https://example.org/blog/post/hello.html",
            r.absolute(&r.post("hello"))
        );
    }
}
