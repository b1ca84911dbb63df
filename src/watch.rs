//! File watching for automatic rebuilds.
//!
//! Uses `notify-debouncer-full` to watch the posts, templates, and
//! passthrough directories. Every relevant change triggers a full rebuild;
//! changes that arrive while a rebuild runs are folded into one more
//! rebuild instead of queueing one each.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{EventKind, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use tracing::{error, info, warn};

use crate::build::build_site;
use crate::config::Config;

/// How long the debouncer waits for a burst of events to settle.
pub const DEBOUNCE_TIMEOUT: Duration = Duration::from_millis(300);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}

/// Events sent from the file watcher.
#[derive(Debug)]
enum WatchEvent {
    /// Files changed, rebuild needed.
    Changed(Vec<PathBuf>),

    /// Watcher error occurred.
    Error(String),
}

/// The directories whose contents feed a build. Directories that don't
/// exist are left out.
pub fn watched_directories(config: &Config) -> Vec<PathBuf> {
    std::iter::once(&config.posts_source_directory)
        .chain(std::iter::once(&config.templates_directory))
        .chain(config.passthrough_directories.iter())
        .filter(|dir| dir.is_dir())
        .cloned()
        .collect()
}

/// Builds the site, then rebuilds it whenever a watched directory changes.
/// Only returns if the watcher can't be set up or its channel closes.
pub fn watch(config: &Config) -> Result<(), Error> {
    rebuild(config);

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(DEBOUNCE_TIMEOUT, None, move |result: DebounceEventResult| {
        match result {
            Ok(events) => {
                let paths: Vec<PathBuf> = events
                    .iter()
                    .filter(|event| is_relevant_event(&event.kind))
                    .flat_map(|event| event.paths.iter().cloned())
                    .collect();
                if !paths.is_empty() {
                    let _ = tx.send(WatchEvent::Changed(paths));
                }
            }
            Err(errors) => {
                for e in errors {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            }
        }
    })?;

    for dir in watched_directories(config) {
        debouncer.watch(&dir, RecursiveMode::Recursive)?;
        info!(directory = %dir.display(), "watching");
    }

    while let Ok(event) = rx.recv() {
        match event {
            WatchEvent::Changed(paths) => {
                let paths = drain(&rx, paths);
                if paths.iter().all(|path| is_output_path(config, path)) {
                    continue;
                }
                info!(changed = paths.len(), "change detected, rebuilding");
                rebuild(config);
            }
            WatchEvent::Error(err) => warn!("watch error: {}", err),
        }
    }
    Ok(())
}

/// Appends every change already queued to `paths`, so they're all covered by
/// a single rebuild.
fn drain(rx: &Receiver<WatchEvent>, mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    loop {
        match rx.try_recv() {
            Ok(WatchEvent::Changed(more)) => paths.extend(more),
            Ok(WatchEvent::Error(err)) => warn!("watch error: {}", err),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return paths,
        }
    }
}

fn rebuild(config: &Config) {
    if let Err(err) = build_site(config) {
        error!("build failed, keeping previous output: {}", err);
    }
}

// The output directory may live inside a watched directory; writes to it
// must not trigger another build.
fn is_output_path(config: &Config, path: &Path) -> bool {
    match (config.output_directory.parent(), config.output_directory.file_name()) {
        (Some(parent), Some(name)) => path.strip_prefix(parent).map_or(false, |rest| {
            rest.components().next().map_or(false, |first| {
                let first = first.as_os_str().to_string_lossy();
                let name = name.to_string_lossy();
                first == name || first.starts_with(&format!(".{}.", name))
            })
        }),
        _ => false,
    }
}

/// Check if an event kind is relevant for rebuilds.
fn is_relevant_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange};

    fn config(root: &Path) -> Config {
        Config::from_yaml(root, "title: T\nbase_url: https://example.org\n", None).unwrap()
    }

    #[test]
    fn test_relevant_events() {
        assert!(is_relevant_event(&EventKind::Create(CreateKind::File)));
        assert!(is_relevant_event(&EventKind::Modify(ModifyKind::Data(
            DataChange::Content
        ))));
        assert!(!is_relevant_event(&EventKind::Access(AccessKind::Read)));
    }

    #[test]
    fn test_drain_coalesces() {
        let (tx, rx) = mpsc::channel();
        tx.send(WatchEvent::Changed(vec![PathBuf::from("b.md")])).unwrap();
        tx.send(WatchEvent::Error(String::from("boom"))).unwrap();
        tx.send(WatchEvent::Changed(vec![PathBuf::from("c.md")])).unwrap();

        let paths = drain(&rx, vec![PathBuf::from("a.md")]);
        assert_eq!(
            vec![
                PathBuf::from("a.md"),
                PathBuf::from("b.md"),
                PathBuf::from("c.md")
            ],
            paths
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_output_paths_ignored() {
        let config = config(Path::new("/site"));
        assert!(is_output_path(&config, Path::new("/site/dist/index.html")));
        assert!(is_output_path(&config, Path::new("/site/.dist.staging/post/a.html")));
        assert!(!is_output_path(&config, Path::new("/site/posts/a.md")));
        assert!(!is_output_path(&config, Path::new("/site/distant/a.md")));
    }

    #[test]
    fn test_watched_directories() -> std::io::Result<()> {
        let root = tempfile::tempdir()?;
        std::fs::create_dir_all(root.path().join("posts"))?;
        std::fs::create_dir_all(root.path().join("public/css"))?;
        let config = config(root.path());
        assert_eq!(
            vec![root.path().join("posts"), root.path().join("public/css")],
            watched_directories(&config)
        );
        Ok(())
    }
}
