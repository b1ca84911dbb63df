//! Writes a rendered site to disk. Everything goes into a staging directory
//! next to the output directory first; only once every file is in place is
//! the old output swapped out for it, so a failed build leaves the previous
//! site untouched and a successful one never leaves stale files behind.

use rayon::prelude::*;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One generated file, with a path relative to the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> OutputFile {
        OutputFile {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Replaces `output_directory` with `files` plus a copy of every passthrough
/// directory. When two files share a path, the later one wins. Passthrough
/// directories that don't exist are skipped.
pub fn write_site(output_directory: &Path, files: &[OutputFile], passthrough: &[PathBuf]) -> Result<()> {
    let staging = sibling(output_directory, "staging");
    remove_dir(&staging)?;

    match stage(&staging, files, passthrough) {
        Ok(()) => swap(&staging, output_directory),
        Err(err) => {
            if let Err(cleanup) = remove_dir(&staging) {
                warn!("{}", cleanup);
            }
            Err(err)
        }
    }
}

fn stage(staging: &Path, files: &[OutputFile], passthrough: &[PathBuf]) -> Result<()> {
    create_dir(staging)?;

    // Last write wins; keep only the final file for each path so parallel
    // writes never race on the same file.
    let mut latest: HashMap<&Path, &OutputFile> = HashMap::with_capacity(files.len());
    for file in files {
        latest.insert(&file.path, file);
    }

    latest.into_par_iter().try_for_each(|(relpath, file)| {
        let path = staging.join(relpath);
        if let Some(dir) = path.parent() {
            create_dir(dir)?;
        }
        std::fs::write(&path, &file.contents).map_err(|err| Error::Io { path, err })
    })?;

    for dir in passthrough {
        if !dir.is_dir() {
            debug!(directory = %dir.display(), "passthrough directory does not exist; skipping");
            continue;
        }
        let name = match dir.file_name() {
            Some(name) => name,
            None => continue,
        };
        copy_dir(dir, &staging.join(name))?;
    }
    Ok(())
}

/// Moves the current output (if any) aside, moves `staging` into its place,
/// then deletes the old output.
fn swap(staging: &Path, output_directory: &Path) -> Result<()> {
    let previous = sibling(output_directory, "previous");
    remove_dir(&previous)?;

    let had_output = output_directory.exists();
    if had_output {
        rename(output_directory, &previous)?;
    }
    if let Err(err) = rename(staging, output_directory) {
        if had_output {
            if let Err(restore) = rename(&previous, output_directory) {
                warn!("{}", restore);
            }
        }
        if let Err(cleanup) = remove_dir(staging) {
            warn!("{}", cleanup);
        }
        return Err(err);
    }
    remove_dir(&previous)
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let relpath = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relpath);
        if entry.file_type().is_dir() {
            create_dir(&target)?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|err| Error::Io { path: target, err })?;
        }
    }
    Ok(())
}

/// `dist` becomes `.dist.staging`, in the same parent directory so that the
/// final rename never crosses a filesystem.
fn sibling(dir: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(dir.file_name().unwrap_or_else(|| dir.as_os_str()));
    name.push(".");
    name.push(suffix);
    dir.with_file_name(name)
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::Io {
        path: dir.to_owned(),
        err,
    })
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    std::fs::rename(from, to).map_err(|err| Error::Io {
        path: to.to_owned(),
        err,
    })
}

fn remove_dir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

/// The result of a fallible output operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing the output directory.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for I/O problems while removing old directories.
    #[error("cleaning directory `{}`: {err}", .path.display())]
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while writing or moving files.
    #[error("writing `{}`: {err}", .path.display())]
    Io { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking passthrough directories.
    #[error("copying passthrough directory: {0}")]
    WalkDir(#[from] walkdir::Error),
}
