//! Filesystem helpers for artifacts
//!
//! Artifacts are either single files (archives) or directory trees
//! (mirrors); every helper here handles both.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Creation time of an artifact
///
/// Uses the birth time when the platform and filesystem report one, else the
/// inode change time on unix. The modification time is a last resort:
/// `rsync -a` copies it from the source.
pub fn creation_time(path: &Path) -> io::Result<DateTime<Local>> {
    let metadata = fs::symlink_metadata(path)?;
    if let Ok(time) = metadata.created() {
        return Ok(DateTime::<Local>::from(time));
    }
    fallback_time(&metadata)
}

#[cfg(unix)]
fn fallback_time(metadata: &fs::Metadata) -> io::Result<DateTime<Local>> {
    use chrono::Utc;
    use std::os::unix::fs::MetadataExt;

    DateTime::<Utc>::from_timestamp(metadata.ctime(), metadata.ctime_nsec() as u32)
        .map(|time| time.with_timezone(&Local))
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "change time out of range"))
}

#[cfg(not(unix))]
fn fallback_time(metadata: &fs::Metadata) -> io::Result<DateTime<Local>> {
    Ok(DateTime::<Local>::from(metadata.modified()?))
}

/// Copy an artifact byte-for-byte, recursing into directories
pub fn duplicate_artifact(from: &Path, to: &Path) -> Result<()> {
    let metadata = fs::metadata(from)
        .with_context(|| format!("Failed to stat artifact {:?}", from))?;

    if !metadata.is_dir() {
        fs::copy(from, to).with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;
        return Ok(());
    }

    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", from))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .context("Walked entry outside of artifact")?;
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory {:?}", target))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {:?}", entry.path()))?;
        }
    }

    debug!("Copied directory artifact {:?} to {:?}", from, to);
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let link = fs::read_link(from).with_context(|| format!("Failed to read link {:?}", from))?;
    std::os::unix::fs::symlink(&link, to)
        .with_context(|| format!("Failed to create link {:?}", to))
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).with_context(|| format!("Failed to copy {:?}", from))?;
    Ok(())
}

/// Remove an artifact: the file itself, or the whole directory tree
pub fn remove_artifact(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
