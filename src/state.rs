// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Applied state persistence.
//!
//! Themectl remembers two things between runs: which theme was applied last,
//! and which wallpaper is currently selected. Each lives in its own flat text
//! file holding a single value.
//!
//! # State File Layout
//!
//! The theme state file holds a bare slug, e.g., `tokyo-night`. The
//! background state file holds either a path to the selected wallpaper, or a
//! decimal index into the current theme's `backgrounds/` directory.
//!
//! There is no locking and no versioning. The last writer wins.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};
use tracing::debug;

/// Flat file backed state store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    theme_path: PathBuf,
    background_path: PathBuf,
}

impl StateStore {
    /// Construct new state store over the two state files.
    pub fn new(theme_path: impl Into<PathBuf>, background_path: impl Into<PathBuf>) -> Self {
        Self {
            theme_path: theme_path.into(),
            background_path: background_path.into(),
        }
    }

    /// Path of current theme state file.
    pub fn theme_path(&self) -> &Path {
        &self.theme_path
    }

    /// Path of current background state file.
    pub fn background_path(&self) -> &Path {
        &self.background_path
    }

    /// Slug of last applied theme.
    ///
    /// Absent, empty, or unreadable state files all count as no theme.
    pub fn current_theme(&self) -> Option<String> {
        read_value(&self.theme_path)
    }

    /// Persist slug of applied theme.
    ///
    /// Creates parent directories as needed.
    ///
    /// # Errors
    ///
    /// - Return [`StateError::Write`] if state file cannot be written.
    pub fn set_current_theme(&self, slug: impl AsRef<str>) -> Result<()> {
        write_value(&self.theme_path, slug.as_ref())
    }

    /// Last background selection.
    pub fn current_background(&self) -> Option<BackgroundSelection> {
        read_value(&self.background_path).map(|value| BackgroundSelection::parse(&value))
    }

    /// Persist background selection.
    ///
    /// # Errors
    ///
    /// - Return [`StateError::Write`] if state file cannot be written.
    pub fn set_current_background(&self, selection: &BackgroundSelection) -> Result<()> {
        write_value(&self.background_path, &selection.to_string())
    }
}

fn read_value(path: &Path) -> Option<String> {
    read_to_string(path)
        .ok()
        .map(|content| content.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn write_value(path: &Path, value: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        mkdirp::mkdirp(parent).map_err(|source| StateError::Write {
            source,
            path: path.to_path_buf(),
        })?;
    }

    debug!("write {value:?} to {:?}", path.display());
    write(path, value).map_err(|source| StateError::Write {
        source,
        path: path.to_path_buf(),
    })
}

/// Which wallpaper is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundSelection {
    /// Wallpaper selected by path.
    Path(PathBuf),

    /// Wallpaper selected by position in current theme's backgrounds.
    Index(usize),
}

impl BackgroundSelection {
    /// Interpret raw state file content.
    ///
    /// Pure decimal digits are an index, anything else is a path.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value.parse::<usize>() {
            Ok(index) if value.bytes().all(|byte| byte.is_ascii_digit()) => Self::Index(index),
            _ => Self::Path(PathBuf::from(value)),
        }
    }
}

impl Display for BackgroundSelection {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Path(path) => fmt.write_str(path.to_string_lossy().as_ref()),
            Self::Index(index) => write!(fmt, "{index}"),
        }
    }
}

/// State persistence error types.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// State file cannot be written.
    #[error("failed to write state file at {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = StateError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    fn store(root: &Path) -> StateStore {
        StateStore::new(
            root.join("nested").join(".current-theme"),
            root.join("nested").join(".current-background"),
        )
    }

    #[test]
    fn theme_state_round_trip_creates_parents() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let state = store(root.path());
        assert_eq!(state.current_theme(), None);

        state.set_current_theme("rose-pine")?;
        assert_eq!(state.current_theme().as_deref(), Some("rose-pine"));

        state.set_current_theme("nord")?;
        assert_eq!(read_to_string(state.theme_path())?, "nord");

        Ok(())
    }

    #[test]
    fn blank_state_counts_as_absent() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let state = store(root.path());
        std::fs::create_dir_all(root.path().join("nested"))?;
        write(state.theme_path(), "  \n")?;
        assert_eq!(state.current_theme(), None);

        Ok(())
    }

    #[test_case("3", BackgroundSelection::Index(3); "index")]
    #[test_case(" 12\n", BackgroundSelection::Index(12); "padded index")]
    #[test_case("/walls/a.png", BackgroundSelection::Path("/walls/a.png".into()); "path")]
    #[test_case("+4", BackgroundSelection::Path("+4".into()); "signed is a path")]
    #[test]
    fn parse_background_selection(raw: &str, expect: BackgroundSelection) {
        pretty_assertions::assert_eq!(BackgroundSelection::parse(raw), expect);
    }

    #[test]
    fn background_state_keeps_mode() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let state = store(root.path());

        state.set_current_background(&BackgroundSelection::Index(2))?;
        assert_eq!(state.current_background(), Some(BackgroundSelection::Index(2)));

        let path = BackgroundSelection::Path(root.path().join("wall.png"));
        state.set_current_background(&path)?;
        assert_eq!(state.current_background(), Some(path));

        Ok(())
    }
}
