//! Loads the project configuration from a `quire.yaml` file. The project file
//! is searched for in the provided directory and then in each of its parents,
//! so `quire build` works from anywhere inside a project.
//!
//! ```yaml
//! title: The Blog
//! description: A blog about things
//! base_url: https://blog.example.org
//! author: Admin
//! posts_per_page: 6
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "quire.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(6)
    }
}

#[derive(Deserialize)]
struct FeedLimit(usize);
impl Default for FeedLimit {
    fn default() -> Self {
        FeedLimit(20)
    }
}

fn default_author() -> String {
    String::from("Admin")
}

fn default_language() -> String {
    String::from("en")
}

#[derive(Deserialize)]
struct Project {
    title: String,

    #[serde(default)]
    description: String,

    base_url: Url,

    #[serde(default)]
    base_path: String,

    #[serde(default = "default_author")]
    author: String,

    #[serde(default = "default_language")]
    language: String,

    #[serde(default)]
    posts_per_page: PageSize,

    #[serde(default)]
    feed_item_limit: FeedLimit,

    #[serde(default)]
    copyright: Option<String>,

    #[serde(default)]
    directories: Directories,
}

#[derive(Deserialize)]
#[serde(default)]
struct Directories {
    posts: PathBuf,
    templates: PathBuf,
    passthrough: Vec<PathBuf>,
    excluded: Vec<String>,
}

impl Default for Directories {
    fn default() -> Self {
        Directories {
            posts: PathBuf::from("posts"),
            templates: PathBuf::from("templates"),
            passthrough: vec![
                PathBuf::from("public/css"),
                PathBuf::from("public/js"),
                PathBuf::from("public/images"),
            ],
            excluded: vec![String::from("drafts")],
        }
    }
}

/// The resolved configuration for a build. All directories are absolute or
/// relative to the working directory (never to the project file). A [`Config`]
/// is created once and only ever borrowed by the build stages.
#[derive(Clone, Debug)]
pub struct Config {
    /// The site title, used for page titles and the feeds.
    pub title: String,

    /// The site description, used for the home page and the feeds.
    pub description: String,

    /// The absolute URL at which the site is served. Feed links and sitemap
    /// locations are built from this.
    pub base_url: Url,

    /// A path prefix for every internal link (e.g., `/blog` when the site is
    /// served from a sub-path). Either empty or starts with `/` and has no
    /// trailing slash.
    pub base_path: String,

    /// The author for posts whose front-matter doesn't name one.
    pub author: String,

    /// The feed language.
    pub language: String,

    /// The number of posts per listing page.
    pub posts_per_page: usize,

    /// The maximum number of posts in the feeds.
    pub feed_item_limit: usize,

    /// The feed copyright line. When absent, it's derived from the newest
    /// post's year.
    pub copyright: Option<String>,

    /// The root of the Markdown post tree.
    pub posts_source_directory: PathBuf,

    /// The directory holding the page templates.
    pub templates_directory: PathBuf,

    /// Asset directories copied verbatim into the output root.
    pub passthrough_directories: Vec<PathBuf>,

    /// Names of directories whose subtrees are staging areas and never part of
    /// the public build.
    pub excluded_directories: Vec<String>,

    /// The directory the site is written to.
    pub output_directory: PathBuf,
}

impl Config {
    /// Searches `dir` and then its ancestors for a [`PROJECT_FILE`] and loads
    /// it. `output_directory` overrides the default output directory
    /// (`{project_root}/dist`).
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
                .with_context(|| format!("Loading configuration `{}`", path.display()))
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    /// Loads the configuration from the project file at `path`.
    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        Config::from_yaml(project_root, &contents, output_directory)
    }

    /// Parses the project file contents and resolves every directory against
    /// `project_root`.
    pub fn from_yaml(
        project_root: &Path,
        yaml: &str,
        output_directory: Option<&Path>,
    ) -> Result<Config> {
        let project: Project = serde_yaml::from_str(yaml)?;
        if project.posts_per_page.0 < 1 {
            return Err(anyhow!("`posts_per_page` must be at least 1"));
        }

        Ok(Config {
            title: project.title,
            description: project.description,
            base_url: project.base_url,
            base_path: normalize_base_path(&project.base_path),
            author: project.author,
            language: project.language,
            posts_per_page: project.posts_per_page.0,
            feed_item_limit: project.feed_item_limit.0,
            copyright: project.copyright,
            posts_source_directory: project_root.join(project.directories.posts),
            templates_directory: project_root.join(project.directories.templates),
            passthrough_directories: project
                .directories
                .passthrough
                .iter()
                .map(|relpath| project_root.join(relpath))
                .collect(),
            excluded_directories: project.directories.excluded,
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => project_root.join("dist"),
            },
        })
    }
}

// `blog/` and `/blog` both become `/blog`; `/` and `` become ``.
fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    match trimmed.is_empty() {
        true => String::new(),
        false => format!("/{}", trimmed),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() -> Result<()> {
        let config = Config::from_yaml(
            Path::new("/project"),
            "title: Blog\nbase_url: https://example.org\n",
            None,
        )?;
        assert_eq!(6, config.posts_per_page);
        assert_eq!(20, config.feed_item_limit);
        assert_eq!("Admin", config.author);
        assert_eq!("en", config.language);
        assert_eq!("", config.base_path);
        assert_eq!(PathBuf::from("/project/posts"), config.posts_source_directory);
        assert_eq!(PathBuf::from("/project/dist"), config.output_directory);
        assert_eq!(vec![String::from("drafts")], config.excluded_directories);
        assert_eq!(3, config.passthrough_directories.len());
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let yaml = "
title: Blog
base_url: https://example.org
base_path: blog/
posts_per_page: 2
directories:
  posts: content
  passthrough: [static]
";
        let config = Config::from_yaml(Path::new("/p"), yaml, Some(Path::new("/out")))?;
        assert_eq!("/blog", config.base_path);
        assert_eq!(2, config.posts_per_page);
        assert_eq!(PathBuf::from("/p/content"), config.posts_source_directory);
        assert_eq!(PathBuf::from("/p/templates"), config.templates_directory);
        assert_eq!(vec![PathBuf::from("/p/static")], config.passthrough_directories);
        assert_eq!(PathBuf::from("/out"), config.output_directory);
        Ok(())
    }

    #[test]
    fn test_rejects_empty_pages() {
        let result = Config::from_yaml(
            Path::new("/p"),
            "title: Blog\nbase_url: https://example.org\nposts_per_page: 0\n",
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_directory_searches_parents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "title: Blog\nbase_url: https://example.org\n",
        )?;
        let nested = dir.path().join("posts").join("2024");
        std::fs::create_dir_all(&nested)?;
        let config = Config::from_directory(&nested, None)?;
        assert_eq!("Blog", config.title);
        assert_eq!(dir.path().join("posts"), config.posts_source_directory);
        Ok(())
    }
}
