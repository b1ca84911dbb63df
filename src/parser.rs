//! Defines the [`Parser`], [`Source`], [`Warning`], and [`Error`] types. Also
//! defines the logic for loading post sources from the file system into
//! memory. A source is the front-matter and raw Markdown of a single file;
//! [`crate::site`] turns sources into [`crate::post::Post`]s.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::post::Status;

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Source`] objects from a tree of Markdown files.
pub struct Parser<'a> {
    /// Directory names whose subtrees are staging areas. They are skipped
    /// unless drafts are requested.
    excluded_directories: &'a [String],

    /// Whether draft posts (and staging directories) are part of the result.
    /// The public build never sets this; the administrative listing does.
    include_drafts: bool,
}

impl<'a> Parser<'a> {
    /// Constructs a parser for the public build: staging directories are
    /// skipped and only published posts are returned.
    pub fn new(excluded_directories: &'a [String]) -> Parser<'a> {
        Parser {
            excluded_directories,
            include_drafts: false,
        }
    }

    /// Makes the parser return every post, drafts included, and descend into
    /// staging directories.
    pub fn with_drafts(mut self) -> Parser<'a> {
        self.include_drafts = true;
        self
    }

    /// Searches `source_directory` recursively for post files (extension =
    /// `.md`) and returns the parsed [`Source`]s sorted by date (most recent
    /// first, ties in file-walk order). Each post file must be structured as
    /// follows:
    ///
    /// 1. Initial front-matter fence (`---`)
    /// 2. YAML front-matter with fields `title`, `date`, `status`, and
    ///    optionally `slug`, `author` and `tags`
    /// 3. Terminal front-matter fence (`---`)
    /// 4. Post body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2024-04-16
    /// status: published
    /// tags: [greet]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    ///
    /// Files that fail to parse don't fail the load; they're reported in
    /// [`Loaded::warnings`].
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Loaded> {
        if !source_directory.is_dir() {
            return Err(Error::MissingSourceDirectory(source_directory.to_owned()));
        }

        let mut paths = Vec::new();
        let walker = WalkDir::new(source_directory)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry));
        for result in walker {
            let entry = result?;
            if entry.file_type().is_file()
                && entry.path().extension().map_or(false, |ext| ext == MARKDOWN_EXTENSION)
            {
                paths.push(entry.into_path());
            }
        }

        // `collect` on an indexed parallel iterator preserves input order.
        let results: Vec<(PathBuf, Result<Source>)> = paths
            .into_par_iter()
            .map(|path| {
                let result = parse_file(&path);
                (path, result)
            })
            .collect();

        let mut loaded = Loaded::default();
        for (path, result) in results {
            match result {
                Ok(source) if self.include_drafts || source.status == Status::Published => {
                    loaded.sources.push(source)
                }
                Ok(source) => debug!(path = %source.path.display(), "skipping unpublished post"),
                Err(error) => {
                    let warning = Warning { path, error };
                    warn!("{}", warning);
                    loaded.warnings.push(warning);
                }
            }
        }

        // `sort_by` is stable, so posts sharing a date keep walk order.
        loaded.sources.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(loaded)
    }

    // Exclusion only applies to directories below the root, and only for the
    // public build.
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        !self.include_drafts
            && entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map_or(false, |name| self.excluded_directories.iter().any(|d| d == name))
    }
}

fn parse_file(path: &Path) -> Result<Source> {
    let contents = std::fs::read_to_string(path)?;
    parse_source(path, &contents)
}

/// Parses a single [`Source`] from the contents of the file at `path`. The
/// path is only recorded, never read.
pub fn parse_source(path: &Path, input: &str) -> Result<Source> {
    fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
        const FENCE: &str = "---";
        let rest = input
            .strip_prefix(FENCE)
            .ok_or(Error::FrontmatterMissingStartFence)?;
        let mut lines = rest.split_inclusive('\n');
        let opening = lines.next().unwrap_or_default();
        if !opening.trim().is_empty() {
            return Err(Error::FrontmatterMissingStartFence);
        }

        let yaml_start = FENCE.len() + opening.len();
        let mut offset = yaml_start;
        for line in lines {
            if line.trim_end() == FENCE {
                return Ok((
                    yaml_start,          // yaml_start
                    offset,              // yaml_stop
                    offset + line.len(), // body_start
                ));
            }
            offset += line.len();
        }
        Err(Error::FrontmatterMissingEndFence)
    }

    let input = input.trim_start_matches('\u{feff}');
    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

    let title = frontmatter.title.trim();
    if title.is_empty() {
        return Err(Error::EmptyField("title"));
    }

    Ok(Source {
        path: path.to_owned(),
        title: title.to_owned(),
        date: parse_date(&frontmatter.date)?,
        status: Status::from(frontmatter.status.as_str()),
        slug: non_empty(frontmatter.slug),
        author: non_empty(frontmatter.author),
        tags: frontmatter
            .tags
            .into_iter()
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .collect(),
        body: input[body_start..].to_owned(),
    })
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// Parses a publication date. Accepts `2024-01-31`, `2024-01-31 10:00:00` and
/// RFC 3339 timestamps; only the calendar date is kept.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    let date = date.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S").map(|d| d.date()))
        .or_else(|_| DateTime::parse_from_rfc3339(date).map(|d| d.date_naive()))
        .map_err(|err| Error::InvalidDate {
            date: date.to_owned(),
            err,
        })
}

#[derive(Deserialize)]
struct Frontmatter {
    /// The title of the post.
    title: String,

    /// The publication date of the post.
    date: String,

    /// `published` or `draft`. Anything other than `published` is treated as
    /// a draft.
    status: String,

    /// An explicit slug, overriding the one derived from the title.
    #[serde(default)]
    slug: Option<String>,

    /// The author; the site author is used when absent.
    #[serde(default)]
    author: Option<String>,

    /// The tags associated with the post, in order.
    #[serde(default)]
    tags: Vec<String>,
}

/// The front-matter and raw body of one post file.
#[derive(Clone, Debug, PartialEq)]
pub struct Source {
    /// The file the source was parsed from.
    pub path: PathBuf,
    pub title: String,
    pub date: NaiveDate,
    pub status: Status,
    pub slug: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,

    /// The Markdown following the front-matter.
    pub body: String,
}

/// The result of [`Parser::parse_posts`].
#[derive(Debug, Default)]
pub struct Loaded {
    /// Successfully parsed sources, newest first.
    pub sources: Vec<Source>,

    /// Files that were skipped because they failed to parse.
    pub warnings: Vec<Warning>,
}

/// A post file that was skipped, along with the reason.
#[derive(Debug, thiserror::Error)]
#[error("skipping `{}`: {error}", .path.display())]
pub struct Warning {
    pub path: PathBuf,
    pub error: Error,
}

/// Represents the result of a [`Source`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading post sources. Only
/// [`Error::MissingSourceDirectory`] and [`Error::WalkDir`] are fatal for a
/// load; the others are per-file and end up in a [`Warning`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post source file is missing its starting front-matter
    /// fence (`---`).
    #[error("post must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when the starting fence was found but the terminal one was
    /// missing.
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when the front-matter isn't valid YAML or lacks a required
    /// field.
    #[error("front-matter: {0}")]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when a required front-matter field is blank.
    #[error("front-matter field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// Returned when neither the `slug` field, the title, nor the file name
    /// yields a usable slug.
    #[error("cannot derive a slug from the slug field, title or file name")]
    MissingSlug,

    /// Returned when the `date` field isn't a recognizable date.
    #[error("invalid date `{date}`: {err}")]
    InvalidDate {
        date: String,
        err: chrono::ParseError,
    },

    /// Returned when the posts directory doesn't exist.
    #[error("posts directory `{}` does not exist", .0.display())]
    MissingSourceDirectory(PathBuf),

    /// Returned for errors walking the posts directory.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    const SIMPLE: &str = "---
title: \"Simple\"
date: 2024-01-01
status: published
tags: [\"Go\", \"Rust\"]
---
Today is the first day of the year.
";

    #[test]
    fn test_parse_source() -> Result<()> {
        let source = parse_source(Path::new("simple.md"), SIMPLE)?;
        assert_eq!(
            Source {
                path: PathBuf::from("simple.md"),
                title: String::from("Simple"),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                status: Status::Published,
                slug: None,
                author: None,
                tags: vec![String::from("Go"), String::from("Rust")],
                body: String::from("Today is the first day of the year.\n"),
            },
            source
        );
        Ok(())
    }

    #[test]
    fn test_body_may_contain_fences() -> Result<()> {
        let input = "---\ntitle: T\ndate: 2024-01-01\nstatus: draft\n---\nabove\n\n---\n\nbelow\n";
        let source = parse_source(Path::new("t.md"), input)?;
        assert_eq!(Status::Draft, source.status);
        assert_eq!("above\n\n---\n\nbelow\n", source.body);
        Ok(())
    }

    #[test]
    fn test_missing_fences() {
        assert!(matches!(
            parse_source(Path::new("a.md"), "title: nope\n"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            parse_source(Path::new("a.md"), "---\ntitle: nope\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_missing_required_field() {
        let input = "---\ntitle: No date\nstatus: published\n---\nbody\n";
        assert!(matches!(
            parse_source(Path::new("a.md"), input),
            Err(Error::DeserializeYaml(_))
        ));
    }

    #[test]
    fn test_parse_date_formats() -> Result<()> {
        let want = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(want, parse_date("2024-03-09")?);
        assert_eq!(want, parse_date("2024-03-09 08:30:00")?);
        assert_eq!(want, parse_date("2024-03-09T08:30:00Z")?);
        assert!(parse_date("March 9").is_err());
        Ok(())
    }

    fn write_post(dir: &Path, name: &str, date: &str, status: &str) -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(
            dir.join(name),
            format!(
                "---\ntitle: {}\ndate: {}\nstatus: {}\n---\nbody\n",
                name, date, status
            ),
        )
    }

    #[test]
    fn test_parse_posts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        write_post(root, "b.md", "2024-01-02", "published")?;
        write_post(root, "a.md", "2024-01-02", "published")?;
        write_post(&root.join("2023"), "c.md", "2023-05-05", "published")?;
        write_post(root, "d.md", "2024-02-01", "draft")?;
        write_post(&root.join("drafts"), "e.md", "2025-01-01", "published")?;
        fs::write(root.join("broken.md"), "no front-matter")?;
        fs::write(root.join("notes.txt"), "ignored")?;

        let excluded = vec![String::from("drafts")];
        let loaded = Parser::new(&excluded).parse_posts(root)?;
        let titles: Vec<&str> = loaded.sources.iter().map(|s| s.title.as_str()).collect();

        // Same-date posts keep walk order (file names sorted).
        assert_eq!(vec!["a.md", "b.md", "c.md"], titles);
        assert_eq!(1, loaded.warnings.len());
        assert_eq!(root.join("broken.md"), loaded.warnings[0].path);
        Ok(())
    }

    #[test]
    fn test_parse_posts_with_drafts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        write_post(root, "a.md", "2024-01-01", "published")?;
        write_post(root, "d.md", "2024-02-01", "draft")?;
        write_post(&root.join("drafts"), "e.md", "2024-03-01", "draft")?;

        let excluded = vec![String::from("drafts")];
        let loaded = Parser::new(&excluded).with_drafts().parse_posts(root)?;
        let titles: Vec<&str> = loaded.sources.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(vec!["e.md", "d.md", "a.md"], titles);
        Ok(())
    }

    #[test]
    fn test_status_is_case_sensitive() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        write_post(root, "a.md", "2024-01-01", "published")?;
        write_post(root, "b.md", "2024-01-02", "PUBLISHED")?;
        write_post(root, "c.md", "2024-01-03", "Published")?;

        let excluded = vec![String::from("drafts")];
        let loaded = Parser::new(&excluded).parse_posts(root)?;
        let titles: Vec<&str> = loaded.sources.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(vec!["a.md"], titles);
        assert!(loaded.warnings.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_source_directory() {
        let excluded = Vec::new();
        let result = Parser::new(&excluded).parse_posts(Path::new("./does/not/exist"));
        assert!(matches!(result, Err(Error::MissingSourceDirectory(_))));
    }
}
