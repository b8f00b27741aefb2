// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Runtime symlink replacement.
//!
//! Whatever sits at a link path gets removed in full before the new link is
//! created. A crash between the two steps leaves the link absent rather than
//! half replaced, and re-running apply recovers from that.

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

/// What occupied a link path before it was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replaced {
    Nothing,
    Symlink,
    File,
    Directory,
}

/// Point `link` at `target`, removing whatever was at `link` first.
///
/// Existing symlinks and plain files are unlinked. Existing real directories
/// are removed recursively. Parent directories of `link` are created as
/// needed.
///
/// # Errors
///
/// - Return [`LinkError`] carrying the link path if removal or creation
///   fails.
pub fn replace_link(target: &Path, link: &Path) -> Result<Replaced> {
    let with_path = |source| LinkError {
        source,
        link: link.to_path_buf(),
        target: target.to_path_buf(),
    };

    let replaced = remove_existing(link).map_err(with_path)?;
    if let Some(parent) = link.parent() {
        mkdirp::mkdirp(parent).map_err(with_path)?;
    }
    create_symlink(target, link).map_err(with_path)?;
    debug!(
        "linked {:?} -> {:?} (replaced {replaced:?})",
        link.display(),
        target.display()
    );

    Ok(replaced)
}

fn remove_existing(link: &Path) -> io::Result<Replaced> {
    let metadata = match fs::symlink_metadata(link) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Replaced::Nothing),
        Err(error) => return Err(error),
    };

    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        remove_symlink(link)?;
        Ok(Replaced::Symlink)
    } else if file_type.is_dir() {
        fs::remove_dir_all(link)?;
        Ok(Replaced::Directory)
    } else {
        fs::remove_file(link)?;
        Ok(Replaced::File)
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(unix)]
fn remove_symlink(link: &Path) -> io::Result<()> {
    fs::remove_file(link)
}

#[cfg(windows)]
fn remove_symlink(link: &Path) -> io::Result<()> {
    fs::remove_file(link).or_else(|_| fs::remove_dir(link))
}

/// Symlink replacement failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to link {:?} to {:?}", link.display(), target.display())]
pub struct LinkError {
    #[source]
    pub source: io::Error,
    pub link: PathBuf,
    pub target: PathBuf,
}

/// Friendly result alias :3
pub type Result<T, E = LinkError> = std::result::Result<T, E>;
