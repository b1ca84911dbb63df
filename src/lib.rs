//! The library code for the `quire` static blog generator. A build is a
//! straight pipeline:
//!
//! 1. Loading post sources from disk ([`crate::parser`])
//! 2. Deriving the site model: posts with slugs, excerpts, and reading
//!    times, the tag index, pagination windows, and post navigation
//!    ([`crate::site`])
//! 3. Rendering pages from the theme's templates ([`crate::render`])
//! 4. Emitting the search index, feeds, and sitemap ([`crate::search`],
//!    [`crate::feed`], [`crate::sitemap`])
//! 5. Writing everything to the output directory ([`crate::write`])
//!
//! Every stage after loading is a pure function of its inputs, so building
//! an unchanged project twice yields identical output. [`crate::build`]
//! strings the stages together and [`crate::watch`] reruns them when the
//! sources change.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod markdown;
pub mod page;
pub mod parser;
pub mod post;
pub mod render;
pub mod search;
pub mod site;
pub mod sitemap;
pub mod tag;
pub mod template;
pub mod url;
pub mod watch;
pub mod write;
