//! Sitemap generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.org/post/hello.html</loc>
//!     <lastmod>2024-01-01</lastmod>
//!     <priority>0.8</priority>
//!   </url>
//! </urlset>
//! ```

use std::collections::HashSet;

use crate::site::Site;
use crate::url::{Listing, Routes};

/// The name of the sitemap file in the output directory.
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// XML namespace for sitemaps.
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Single URL entry in the sitemap.
struct UrlEntry {
    /// Full URL location.
    loc: String,

    /// Publication date (`YYYY-MM-DD`), for post pages.
    lastmod: Option<String>,

    /// Relative importance, from `1.0` for the home page down to `0.6` for
    /// tag pages.
    priority: &'static str,
}

/// Builds the sitemap for `site`: the home page, the blog index, the tag
/// index, every post, and every tag, in that order. A URL is listed once,
/// at its first occurrence.
pub fn sitemap(site: &Site, routes: &Routes) -> String {
    let mut urls = vec![
        UrlEntry {
            loc: routes.absolute(&routes.listing(Listing::Home, 1)),
            lastmod: None,
            priority: "1.0",
        },
        UrlEntry {
            loc: routes.absolute(&routes.listing(Listing::Blog, 1)),
            lastmod: None,
            priority: "0.9",
        },
        UrlEntry {
            loc: routes.absolute(&routes.tags()),
            lastmod: None,
            priority: "0.7",
        },
    ];
    urls.extend(site.posts.iter().map(|post| UrlEntry {
        loc: routes.absolute(&routes.post(&post.slug)),
        lastmod: Some(post.date.to_string()),
        priority: "0.8",
    }));
    urls.extend(site.tags.iter().map(|tag| UrlEntry {
        loc: routes.absolute(&routes.tag(&tag.slug)),
        lastmod: None,
        priority: "0.6",
    }));

    let mut seen = HashSet::with_capacity(urls.len());
    urls.retain(|entry| seen.insert(entry.loc.clone()));

    let mut xml = String::with_capacity(128 * urls.len() + 128);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{}">"#, SITEMAP_NS));
    xml.push('\n');
    for entry in urls {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        if let Some(lastmod) = entry.lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        }
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
