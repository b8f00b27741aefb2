// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, or managed in some way. Only [`home_dir`] and
//! [`default_config_path`] look at the process environment. Everything else
//! is derived from an explicit home directory through [`Layout`], so the rest
//! of the crate never has to guess where things live.

use crate::config::ThemectlConfig;

use std::{
    env,
    path::{Path, PathBuf},
};

/// Environment variable that overrides the home directory used by themectl.
pub const HOME_OVERRIDE_VAR: &str = "THEMECTL_HOME";

/// Determine absolute path to user's home directory.
///
/// Honors `$THEMECTL_HOME` before falling back to the real home directory.
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    match env::var_os(HOME_OVERRIDE_VAR) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(
            shellexpand::tilde(path.to_string_lossy().as_ref()).into_owned(),
        )),
        _ => dirs::home_dir().ok_or(NoWayHome),
    }
}

/// Determine default absolute path to themectl configuration file.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    home_dir().map(|home| config_path_in(home))
}

/// Configuration file path relative to a given home directory.
pub fn config_path_in(home: impl AsRef<Path>) -> PathBuf {
    home.as_ref()
        .join(".config")
        .join("themectl")
        .join("config.toml")
}

/// Every concrete path themectl reads or writes.
///
/// Built once from a home directory and the loaded configuration, then
/// threaded through every component by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Home directory everything else hangs off of.
    pub home: PathBuf,

    /// Directory holding one synced asset tree per theme.
    pub themes_root: PathBuf,

    /// Directory holding the `theme` and `background` symlinks.
    pub current_root: PathBuf,

    /// Theme metadata JSON document.
    pub metadata: PathBuf,

    /// Flat file holding the current theme slug.
    pub state_file: PathBuf,

    /// Flat file holding the current background selection.
    pub background_state_file: PathBuf,

    /// Hotkey manifest.
    pub hotkeys_file: PathBuf,
}

impl Layout {
    /// Resolve layout from home directory and configuration overrides.
    pub fn resolve(home: impl Into<PathBuf>, config: &ThemectlConfig) -> Self {
        let home = home.into();
        let omarchy = home.join(".config").join("omarchy");
        let metadata = config
            .theme_metadata
            .clone()
            .unwrap_or_else(|| home.join(".config").join("themectl").join("themes.json"));
        let state_file = config
            .state_file
            .clone()
            .unwrap_or_else(|| home.join(".config").join("themes").join(".current-theme"));
        let background_state_file = config.background_state_file.clone().unwrap_or_else(|| {
            home.join(".config")
                .join("themes")
                .join(".current-background")
        });
        let hotkeys_file = config
            .hotkeys_file
            .clone()
            .unwrap_or_else(|| home.join(".config").join("themectl").join("hotkeys.yaml"));

        Self {
            themes_root: omarchy.join("themes"),
            current_root: omarchy.join("current"),
            metadata,
            state_file,
            background_state_file,
            hotkeys_file,
            home,
        }
    }

    /// Synced asset directory of a theme.
    pub fn theme_dir(&self, slug: &str) -> PathBuf {
        self.themes_root.join(slug)
    }

    /// Symlink pointing at the active theme's asset directory.
    pub fn current_theme_link(&self) -> PathBuf {
        self.current_root.join("theme")
    }

    /// Symlink pointing at the active wallpaper.
    pub fn current_background_link(&self) -> PathBuf {
        self.current_root.join("background")
    }
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
