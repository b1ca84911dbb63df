use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quire::build::build_site;
use quire::config::Config;
use walkdir::WalkDir;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn project() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join("site")
}

/// Every file under `dir`, keyed by its path relative to `dir`.
fn snapshot(dir: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            let relpath = entry.path().strip_prefix(dir)?;
            files.insert(
                relpath.to_string_lossy().replace('\\', "/"),
                std::fs::read(entry.path())?,
            );
        }
    }
    Ok(files)
}

#[test]
fn test_build_site() -> Result<()> {
    let out = tempfile::tempdir()?;
    let output = out.path().join("dist");
    let config = Config::from_directory(&project(), Some(output.as_path()))?;

    let report = build_site(&config)?;
    assert_eq!(3, report.posts);
    assert_eq!(4, report.tags);
    assert_eq!(1, report.warnings.len());
    assert!(report.warnings[0].path.ends_with("broken.md"));

    let files = snapshot(&output)?;
    let paths: Vec<&str> = files.keys().map(String::as_str).collect();
    assert_eq!(
        vec![
            "atom.xml",
            "blog/index-2.html",
            "blog/index.html",
            "css/style.css",
            "index-2.html",
            "index.html",
            "post/go-notes.html",
            "post/hello-world.html",
            "post/rust-tips-tricks.html",
            "posts.json",
            "rss.xml",
            "sitemap.xml",
            "tags/go.html",
            "tags/index.html",
            "tags/meta.html",
            "tags/rust.html",
            "tags/writing.html",
        ],
        paths
    );

    // Drafts never leak into any artifact.
    for (path, contents) in &files {
        let text = String::from_utf8_lossy(contents);
        assert!(!text.contains("Unfinished"), "draft found in {}", path);
        assert!(!text.contains("Staged Post"), "staged post found in {}", path);
    }

    let post = String::from_utf8(files["post/rust-tips-tricks.html"].clone())?;
    assert!(post.contains("<title>Rust Tips &amp; Tricks | Field Notes</title>"));
    assert!(post.contains("By Grace on <time datetime=\"2024-02-10\">February 10, 2024</time>"));
    assert!(post.contains(r#"<a href="/tags/go.html" class="tag-badge">Go</a>"#));
    assert!(!post.contains(r#"class="tag-badge">go</a>"#));
    assert!(post.contains("<hr />"));

    let index: serde_json::Value = serde_json::from_slice(&files["posts.json"])?;
    let slugs: Vec<&str> = index
        .as_array()
        .ok_or("posts.json is not an array")?
        .iter()
        .filter_map(|record| record["slug"].as_str())
        .collect();
    assert_eq!(vec!["go-notes", "rust-tips-tricks", "hello-world"], slugs);
    assert_eq!("Ada", index[0]["author"]);

    Ok(())
}

#[test]
fn test_rebuild_is_identical() -> Result<()> {
    let out = tempfile::tempdir()?;
    let output = out.path().join("dist");
    let config = Config::from_directory(&project(), Some(output.as_path()))?;

    build_site(&config)?;
    let first = snapshot(&output)?;
    build_site(&config)?;
    let second = snapshot(&output)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_missing_template_keeps_previous_output() -> Result<()> {
    let out = tempfile::tempdir()?;
    let output = out.path().join("dist");
    let mut config = Config::from_directory(&project(), Some(output.as_path()))?;
    build_site(&config)?;
    let before = snapshot(&output)?;

    config.templates_directory = out.path().join("no-such-templates");
    assert!(build_site(&config).is_err());

    assert_eq!(before, snapshot(&output)?);
    Ok(())
}

#[test]
fn test_index_tag_keeps_tag_index_page() -> Result<()> {
    let root = tempfile::tempdir()?;
    let templates = root.path().join("templates");
    std::fs::create_dir_all(&templates)?;
    for entry in std::fs::read_dir(project().join("templates"))? {
        let entry = entry?;
        std::fs::copy(entry.path(), templates.join(entry.file_name()))?;
    }
    std::fs::create_dir_all(root.path().join("posts"))?;
    std::fs::write(
        root.path().join("quire.yaml"),
        "title: T\nbase_url: https://example.org\n",
    )?;
    std::fs::write(
        root.path().join("posts").join("indexing.md"),
        "---\ntitle: Indexing\ndate: 2024-01-01\nstatus: published\ntags: [Index, Rust]\n---\nbody\n",
    )?;

    let config = Config::from_directory(root.path(), None)?;
    let report = build_site(&config)?;
    assert_eq!(2, report.tags);

    let output = root.path().join("dist");
    let files = snapshot(&output)?;
    let tags = String::from_utf8(files["tags/index.html"].clone())?;
    assert!(tags.contains(r#"class="tag-page-link""#));
    assert!(files.contains_key("tags/rust.html"));

    let sitemap = String::from_utf8(files["sitemap.xml"].clone())?;
    assert_eq!(
        1,
        sitemap
            .matches("<loc>https://example.org/tags/index.html</loc>")
            .count()
    );
    Ok(())
}
