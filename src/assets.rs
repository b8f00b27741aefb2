// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Theme asset synchronization.
//!
//! Materialize every theme of a [`ThemeRepository`] as a directory of
//! rendered config fragments under the themes root:
//!
//! ```text
//! <themes-root>/
//! └── tokyo-night/
//!     ├── hyprland.conf
//!     ├── kitty.conf
//!     ├── ...
//!     └── backgrounds/
//!         └── tokyo.png
//! ```
//!
//! Synchronization is a full rebuild. Each theme directory is thrown away and
//! regenerated from scratch, so running it twice in a row is harmless. The
//! runtime symlinks and state files are never touched here.

pub mod render;

use crate::{
    assets::render::{finish, Integration},
    theme::{is_valid_slug, Theme, ThemeRepository},
};

use indicatif::ProgressBar;
use std::{
    fs::{self, File, FileTimes},
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Name of wallpaper directory inside each theme's asset directory.
pub const BACKGROUNDS_DIR: &str = "backgrounds";

/// Render and write theme assets to disk.
#[derive(Debug, Clone)]
pub struct AssetSynchronizer {
    themes_root: PathBuf,
}

impl AssetSynchronizer {
    /// Construct new synchronizer targeting themes root.
    pub fn new(themes_root: impl Into<PathBuf>) -> Self {
        Self {
            themes_root: themes_root.into(),
        }
    }

    /// Rebuild asset directory of every theme in repository.
    ///
    /// Progress is reported through the given bar, one tick per theme.
    ///
    /// # Errors
    ///
    /// - Return [`AssetError::Prepare`] if a theme directory cannot be
    ///   cleared or created.
    /// - Return [`AssetError::Write`] if a rendered fragment cannot be written.
    /// - Return [`AssetError::Copy`] if an existing wallpaper cannot be copied.
    #[instrument(skip(self, repository, bar), level = "debug")]
    pub fn sync(&self, repository: &ThemeRepository, bar: &ProgressBar) -> Result<SyncReport> {
        fs::create_dir_all(&self.themes_root).map_err(|source| AssetError::Prepare {
            source,
            path: self.themes_root.clone(),
        })?;

        bar.set_length(repository.len() as u64);
        let mut report = SyncReport::default();
        for theme in repository.iter() {
            bar.set_message(theme.display_name.clone());
            let synced = self.sync_theme(theme)?;
            bar.inc(1);
            bar.suspend(|| info!("synced {}", theme.display_name));
            report.themes.push(synced);
        }
        bar.finish_and_clear();

        Ok(report)
    }

    /// Rebuild asset directory of one theme.
    ///
    /// # Errors
    ///
    /// - Return [`AssetError::InvalidSlug`] if slug does not name a single
    ///   directory entry.
    /// - Same as [`AssetSynchronizer::sync`].
    pub fn sync_theme(&self, theme: &Theme) -> Result<SyncedTheme> {
        // INVARIANT: Destination is always a direct child of themes root.
        if !is_valid_slug(&theme.slug) {
            return Err(AssetError::InvalidSlug {
                slug: theme.slug.clone(),
            });
        }
        let dest = self.themes_root.join(&theme.slug);
        clear_destination(&dest)?;
        fs::create_dir_all(&dest).map_err(|source| AssetError::Prepare {
            source,
            path: dest.clone(),
        })?;

        let mut files = Vec::new();
        for integration in Integration::ALL {
            let Some(text) = integration.render(theme) else {
                continue;
            };
            let path = dest.join(integration.file_name());
            debug!("write {integration} fragment to {:?}", path.display());
            fs::write(&path, finish(&text)).map_err(|source| AssetError::Write {
                source,
                path: path.clone(),
            })?;
            files.push(path);
        }

        let (wallpapers, missing) = copy_wallpapers(theme, &dest.join(BACKGROUNDS_DIR))?;

        Ok(SyncedTheme {
            slug: theme.slug.clone(),
            dir: dest,
            files,
            wallpapers,
            missing_wallpapers: missing,
        })
    }
}

// INVARIANT: A symlink is unlinked, never followed.
//   - The directory it points at may belong to something else entirely.
fn clear_destination(dest: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(dest) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(AssetError::Prepare {
                source,
                path: dest.to_path_buf(),
            })
        }
    };

    let result = if metadata.file_type().is_symlink() {
        debug!("unlink stale theme symlink {:?}", dest.display());
        remove_symlink(dest)
    } else if metadata.is_dir() {
        debug!("remove stale theme directory {:?}", dest.display());
        fs::remove_dir_all(dest)
    } else {
        fs::remove_file(dest)
    };

    result.map_err(|source| AssetError::Prepare {
        source,
        path: dest.to_path_buf(),
    })
}

#[cfg(unix)]
fn remove_symlink(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

#[cfg(windows)]
fn remove_symlink(path: &Path) -> io::Result<()> {
    fs::remove_file(path).or_else(|_| fs::remove_dir(path))
}

fn copy_wallpapers(theme: &Theme, dest_dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut copied = Vec::new();
    let mut missing = Vec::new();
    if theme.wallpapers.is_empty() {
        return Ok((copied, missing));
    }

    fs::create_dir_all(dest_dir).map_err(|source| AssetError::Prepare {
        source,
        path: dest_dir.to_path_buf(),
    })?;

    for source_path in &theme.wallpapers {
        let Some(file_name) = source_path.file_name().filter(|_| source_path.is_file()) else {
            warn!("skipping missing wallpaper {:?}", source_path.display());
            missing.push(source_path.clone());
            continue;
        };

        let target = dest_dir.join(file_name);
        copy_preserving_mtime(source_path, &target).map_err(|source| AssetError::Copy {
            source,
            from: source_path.clone(),
            to: target.clone(),
        })?;
        copied.push(target);
    }

    Ok((copied, missing))
}

fn copy_preserving_mtime(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    let metadata = fs::metadata(from)?;
    let times = FileTimes::new()
        .set_accessed(metadata.accessed()?)
        .set_modified(metadata.modified()?);
    File::options().write(true).open(to)?.set_times(times)
}

/// Outcome of synchronizing a repository.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub themes: Vec<SyncedTheme>,
}

impl SyncReport {
    /// Every wallpaper that was skipped because its source was missing.
    pub fn missing_wallpapers(&self) -> impl Iterator<Item = &Path> {
        self.themes
            .iter()
            .flat_map(|theme| theme.missing_wallpapers.iter().map(PathBuf::as_path))
    }
}

/// Outcome of synchronizing one theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedTheme {
    pub slug: String,
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub wallpapers: Vec<PathBuf>,
    pub missing_wallpapers: Vec<PathBuf>,
}

/// Asset synchronization error types.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Theme slug would escape themes root.
    #[error("theme slug {slug:?} is not a plain directory name")]
    InvalidSlug { slug: String },

    /// Theme directory cannot be cleared or created.
    #[error("failed to prepare asset directory at {:?}", path.display())]
    Prepare {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Rendered fragment cannot be written.
    #[error("failed to write asset at {:?}", path.display())]
    Write {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Wallpaper cannot be copied.
    #[error("failed to copy wallpaper {:?} to {:?}", from.display(), to.display())]
    Copy {
        #[source]
        source: io::Error,
        from: PathBuf,
        to: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = AssetError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::{collections::BTreeSet, time::Duration};

    fn file_names(dir: &Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn emit_only_integrations_with_data() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let wallpaper = root.path().join("wall.png");
        fs::write(&wallpaper, "png")?;
        let repository = ThemeRepository::from_document(&json!([{
            "name": "Nord",
            "kitty": {"foreground": "#d8dee9"},
            "walker": {"text": "#eceff4"},
            "wallpapers": [wallpaper, root.path().join("gone.png")],
        }]));

        let synchronizer = AssetSynchronizer::new(root.path().join("themes"));
        let report = synchronizer.sync(&repository, &ProgressBar::hidden())?;

        let dir = root.path().join("themes").join("nord");
        assert_eq!(
            file_names(&dir),
            BTreeSet::from([
                "backgrounds".to_string(),
                "kitty.conf".to_string(),
                "walker.css".to_string(),
            ])
        );
        assert_eq!(fs::read_to_string(dir.join("backgrounds").join("wall.png"))?, "png");
        assert_eq!(
            report.missing_wallpapers().collect::<Vec<_>>(),
            vec![root.path().join("gone.png").as_path()]
        );

        let kitty = fs::read_to_string(dir.join("kitty.conf"))?;
        assert!(kitty.ends_with("foreground #d8dee9\n\n# The basic 16 colors\n"));

        Ok(())
    }

    #[test]
    fn wallpaper_copy_preserves_mtime() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let wallpaper = root.path().join("old.png");
        fs::write(&wallpaper, "png")?;
        let past = std::time::SystemTime::now() - Duration::from_secs(86_400);
        File::options()
            .write(true)
            .open(&wallpaper)?
            .set_times(FileTimes::new().set_modified(past))?;

        let theme = Theme::new("Nord", "nord", "Nord").with_wallpaper(&wallpaper);
        let synced = AssetSynchronizer::new(root.path().join("themes")).sync_theme(&theme)?;

        let copy = fs::metadata(&synced.wallpapers[0])?.modified()?;
        assert_eq!(copy, fs::metadata(&wallpaper)?.modified()?);

        Ok(())
    }

    #[test]
    fn resync_replaces_stale_directory() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let stale = root.path().join("themes").join("nord");
        fs::create_dir_all(&stale)?;
        fs::write(stale.join("leftover.conf"), "old")?;

        let theme = Theme::new("Nord", "nord", "Nord");
        AssetSynchronizer::new(root.path().join("themes")).sync_theme(&theme)?;

        assert!(stale.is_dir());
        assert!(file_names(&stale).is_empty());

        Ok(())
    }

    #[test]
    fn unusable_slugs_never_clear_anything() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let themes = root.path().join("themes");
        let current = root.path().join("current");
        fs::create_dir_all(&current)?;
        fs::write(current.join("keep"), "keep")?;

        let repository = ThemeRepository::from_document(&json!([
            {"name": "Alpha"},
            {"displayName": "Zed", "name": "   "},
            {"name": "Up", "slug": ".."},
        ]));
        let report = AssetSynchronizer::new(&themes).sync(&repository, &ProgressBar::hidden())?;

        assert_eq!(report.themes.len(), 1);
        assert_eq!(file_names(&themes), BTreeSet::from(["alpha".to_string()]));
        assert_eq!(fs::read_to_string(current.join("keep"))?, "keep");

        for slug in ["", "..", ".", "a/b"] {
            let theme = Theme::new("Bad", slug, "Bad");
            let result = AssetSynchronizer::new(&themes).sync_theme(&theme);
            assert!(matches!(result, Err(AssetError::InvalidSlug { .. })), "{slug:?}");
        }
        assert!(themes.join("alpha").is_dir());
        assert_eq!(fs::read_to_string(current.join("keep"))?, "keep");

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn resync_unlinks_symlink_without_touching_target() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let external = root.path().join("external");
        fs::create_dir_all(&external)?;
        fs::write(external.join("keep.conf"), "keep")?;
        let themes = root.path().join("themes");
        fs::create_dir_all(&themes)?;
        std::os::unix::fs::symlink(&external, themes.join("nord"))?;

        let theme = Theme::new("Nord", "nord", "Nord");
        AssetSynchronizer::new(&themes).sync_theme(&theme)?;

        let dest = themes.join("nord");
        assert!(!fs::symlink_metadata(&dest)?.file_type().is_symlink());
        assert!(dest.is_dir());
        assert_eq!(fs::read_to_string(external.join("keep.conf"))?, "keep");

        Ok(())
    }
}
