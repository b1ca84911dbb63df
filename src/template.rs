//! Template substitution. A template is text containing `{{ name }}`
//! placeholders. [`render`] replaces each recognized placeholder with its
//! bound value in a single pass: substituted values are never scanned again,
//! so post content can't inject placeholders of its own.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The values for one template, restricted to a fixed set of recognized
/// placeholder names.
#[derive(Clone, Debug)]
pub struct Bindings {
    /// The placeholder names this template kind understands.
    recognized: &'static [&'static str],
    values: HashMap<&'static str, String>,
}

impl Bindings {
    pub fn new(recognized: &'static [&'static str]) -> Bindings {
        Bindings {
            recognized,
            values: HashMap::with_capacity(recognized.len()),
        }
    }

    /// Binds `key` to `value`. `key` must be one of the recognized names.
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Bindings {
        debug_assert!(
            self.recognized.contains(&key),
            "`{}` is not a recognized placeholder",
            key
        );
        self.values.insert(key, value.into());
        self
    }

    /// Returns `None` for unrecognized names and an empty string for
    /// recognized names without a value.
    fn lookup(&self, key: &str) -> Option<&str> {
        match self.recognized.contains(&key) {
            true => Some(self.values.get(key).map_or("", String::as_str)),
            false => None,
        }
    }
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Renders `template` against `bindings`. Unrecognized placeholders and
/// unterminated `{{` are copied through unchanged.
pub fn render(template: &str, bindings: &Bindings) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let end = match after.find(CLOSE) {
            Some(end) => end,
            None => break,
        };
        out.push_str(&rest[..start]);

        let inner = &after[..end];
        if inner.contains(OPEN) {
            // `{{ {{ name }}`: the first `{{` is literal text.
            out.push_str(OPEN);
            rest = after;
            continue;
        }

        match bindings.lookup(inner.trim()) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + OPEN.len() + end + CLOSE.len()]),
        }
        rest = &after[end + CLOSE.len()..];
    }
    out.push_str(rest);
    out
}

/// Escapes `&`, `<`, `>`, and `"` for use in HTML text and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// The page templates of a site, loaded from its templates directory.
#[derive(Clone, Debug)]
pub struct Theme {
    /// The layout every page is embedded into via `{{ content }}`.
    pub base: String,
    pub home: String,
    pub blog: String,
    pub post: String,
    pub tag: String,
    pub tags: String,
}

impl Theme {
    /// Reads `base.html`, `home.html`, `blog.html`, `post.html`, `tag.html`,
    /// and `tags.html` from `dir`. Any missing template is an error.
    pub fn load(dir: &Path) -> Result<Theme> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|err| Error::OpenTemplateFile { path, err })
        };
        Ok(Theme {
            base: read("base.html")?,
            home: read("home.html")?,
            blog: read("blog.html")?,
            post: read("post.html")?,
            tag: read("tag.html")?,
            tags: read("tags.html")?,
        })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for loading templates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    #[error("opening template file `{}`: {err}", .path.display())]
    OpenTemplateFile { path: PathBuf, err: std::io::Error },
}
