//! Support for creating the RSS 2.0 and Atom feeds from the newest posts.
//!
//! Feed timestamps come from post dates rather than the wall clock, so
//! rebuilding an unchanged site produces byte-identical feeds.

use crate::config::Config;
use crate::post::Post;
use crate::site::Site;
use crate::url::{Listing, Routes};
use atom_syndication::{
    Category as AtomCategory, Content, Entry, Feed, FixedDateTime, Generator, Link, Person, Text,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use rss::extension::dublincore::DublinCoreExtensionBuilder;
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, ItemBuilder};

/// The name of the RSS feed file in the output directory.
pub const RSS_FILE: &str = "rss.xml";

/// The name of the Atom feed file in the output directory.
pub const ATOM_FILE: &str = "atom.xml";

const GENERATOR: &str = "quire";

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub config: &'a Config,
    pub routes: &'a Routes,
}

impl FeedConfig<'_> {
    /// The newest posts, at most `feed_item_limit` of them.
    fn items<'s>(&self, site: &'s Site) -> &'s [Post] {
        let limit = self.config.feed_item_limit.min(site.posts.len());
        &site.posts[..limit]
    }

    fn home_page(&self) -> String {
        self.routes.absolute(&self.routes.listing(Listing::Home, 1))
    }

    fn post_url(&self, post: &Post) -> String {
        self.routes.absolute(&self.routes.post(&post.slug))
    }

    /// The configured copyright notice, or one naming the year of the newest
    /// post.
    fn copyright(&self, site: &Site) -> String {
        match &self.config.copyright {
            Some(copyright) => copyright.clone(),
            None => {
                let year = match site.posts.first() {
                    Some(post) => post.date.year(),
                    None => Utc::now().year(),
                };
                format!("All rights reserved {}", year)
            }
        }
    }
}

/// The feed's update time: midnight UTC of the newest post's date, or the
/// Unix epoch for a site without posts.
fn updated(site: &Site) -> DateTime<Utc> {
    site.posts
        .first()
        .map(|post| midnight(post.date))
        .unwrap_or_default()
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Renders the RSS 2.0 feed for `site`.
pub fn rss(config: &FeedConfig, site: &Site) -> String {
    let items: Vec<rss::Item> = config
        .items(site)
        .iter()
        .map(|post| {
            let url = config.post_url(post);
            ItemBuilder::default()
                .title(post.title.clone())
                .link(url.clone())
                .guid(GuidBuilder::default().permalink(true).value(url).build())
                .description(post.excerpt.clone())
                .content(post.html.clone())
                .pub_date(midnight(post.date).to_rfc2822())
                .categories(
                    post.tags
                        .iter()
                        .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
                        .collect::<Vec<_>>(),
                )
                .dublin_core_ext(
                    DublinCoreExtensionBuilder::default()
                        .creators(vec![post.author.clone()])
                        .build(),
                )
                .build()
        })
        .collect();

    ChannelBuilder::default()
        .title(config.config.title.clone())
        .link(config.home_page())
        .description(config.config.description.clone())
        .language(config.config.language.clone())
        .copyright(config.copyright(site))
        .last_build_date(updated(site).to_rfc2822())
        .generator(GENERATOR.to_owned())
        .items(items)
        .build()
        .to_string()
}

/// Renders the Atom feed for `site`.
pub fn atom(config: &FeedConfig, site: &Site) -> Result<String> {
    let entries = config
        .items(site)
        .iter()
        .map(|post| {
            let url = config.post_url(post);
            let date: FixedDateTime = midnight(post.date).fixed_offset();
            Entry {
                id: url.clone(),
                title: Text::plain(post.title.clone()),
                updated: date,
                published: Some(date),
                authors: vec![Person {
                    name: post.author.clone(),
                    ..Default::default()
                }],
                links: vec![Link {
                    href: url,
                    rel: "alternate".to_owned(),
                    ..Default::default()
                }],
                summary: Some(Text::plain(post.excerpt.clone())),
                content: Some(Content {
                    value: Some(post.html.clone()),
                    content_type: Some("html".to_owned()),
                    ..Default::default()
                }),
                categories: post
                    .tags
                    .iter()
                    .map(|tag| AtomCategory {
                        term: tag.clone(),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }
        })
        .collect();

    let home_page = config.home_page();
    let feed = Feed {
        title: Text::plain(config.config.title.clone()),
        subtitle: Some(Text::plain(config.config.description.clone())),
        id: home_page.clone(),
        updated: updated(site).fixed_offset(),
        authors: vec![Person {
            name: config.config.author.clone(),
            ..Default::default()
        }],
        rights: Some(Text::plain(config.copyright(site))),
        generator: Some(Generator {
            value: GENERATOR.to_owned(),
            ..Default::default()
        }),
        links: vec![
            Link {
                href: home_page,
                rel: "alternate".to_owned(),
                ..Default::default()
            },
            Link {
                href: config.routes.absolute(&format!(
                    "{}/{}",
                    config.routes.base_path(),
                    ATOM_FILE
                )),
                rel: "self".to_owned(),
                ..Default::default()
            },
        ],
        entries,
        ..Default::default()
    };
    Ok(String::from_utf8(feed.write_to(Vec::new())?)?)
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when there is an Atom-related error.
    #[error("writing atom feed: {0}")]
    Atom(#[from] atom_syndication::Error),

    /// Returned when the serialized feed isn't valid UTF-8.
    #[error("atom feed is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Source;
    use crate::post::Status;
    use std::path::{Path, PathBuf};

    fn config(yaml: &str) -> Config {
        Config::from_yaml(Path::new("/site"), yaml, None).unwrap()
    }

    fn site(count: u32) -> Site {
        let sources = (1..=count)
            .map(|day| Source {
                path: PathBuf::from(format!("{}.md", day)),
                title: format!("Post {}", day),
                date: NaiveDate::from_ymd_opt(2023, 3, day).unwrap(),
                status: Status::Published,
                slug: None,
                author: None,
                tags: vec![String::from("Rust")],
                body: format!("Body *{}*", day),
            })
            .collect();
        Site::derive(sources, "Admin", 6)
    }

    #[test]
    fn test_rss() {
        let config = config("title: Blog & Co\ndescription: Notes\nbase_url: https://example.org/\n");
        let routes = Routes::new(&config.base_url, &config.base_path);
        let xml = rss(&FeedConfig { config: &config, routes: &routes }, &site(2));

        assert!(xml.contains("<title>Blog &amp; Co</title>"));
        assert!(xml.contains("<link>https://example.org/post/post-2.html</link>"));
        assert!(xml.contains("<copyright>All rights reserved 2023</copyright>"));
        assert!(xml.contains("Mar 2023 00:00:00 +0000</lastBuildDate>"));
        assert!(xml.contains("content:encoded"));
        assert!(xml.contains("<category>Rust</category>"));

        // Newest first.
        let newest = xml.find("Post 2").unwrap();
        let oldest = xml.find("Post 1").unwrap();
        assert!(newest < oldest);
    }

    #[test]
    fn test_item_limit() {
        let config = config("title: T\nbase_url: https://example.org\nfeed_item_limit: 20\n");
        let routes = Routes::new(&config.base_url, &config.base_path);
        let feed_config = FeedConfig { config: &config, routes: &routes };
        let site = site(25);

        let xml = rss(&feed_config, &site);
        assert_eq!(20, xml.matches("<item>").count());
        assert!(xml.contains("Post 25"));
        assert!(!xml.contains("Post 5<"));

        let xml = atom(&feed_config, &site).unwrap();
        assert_eq!(20, xml.matches("<entry>").count());
    }

    #[test]
    fn test_deterministic() {
        let config = config("title: T\nbase_url: https://example.org\n");
        let routes = Routes::new(&config.base_url, &config.base_path);
        let feed_config = FeedConfig { config: &config, routes: &routes };
        let site = site(3);
        assert_eq!(rss(&feed_config, &site), rss(&feed_config, &site));
        assert_eq!(
            atom(&feed_config, &site).unwrap(),
            atom(&feed_config, &site).unwrap()
        );
    }

    #[test]
    fn test_atom() {
        let config = config("title: T\nbase_url: https://example.org\nbase_path: /blog\n");
        let routes = Routes::new(&config.base_url, &config.base_path);
        let xml = atom(&FeedConfig { config: &config, routes: &routes }, &site(1)).unwrap();

        assert!(xml.contains("https://example.org/blog/post/post-1.html"));
        assert!(xml.contains("https://example.org/blog/atom.xml"));
        assert!(xml.contains("2023-03-01T00:00:00+00:00"));
    }
}
