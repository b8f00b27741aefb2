// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Wallpaper cycling within the current theme.

use crate::{
    assets::BACKGROUNDS_DIR,
    engine::{cycle::Direction, link::replace_link, EngineError, Result},
    path::Layout,
    state::{BackgroundSelection, StateStore},
};

use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Step through synced wallpapers of current theme.
#[derive(Debug, Clone)]
pub struct BackgroundCycler<'a> {
    layout: &'a Layout,
    state: &'a StateStore,
}

impl<'a> BackgroundCycler<'a> {
    /// Construct new background cycler.
    pub fn new(layout: &'a Layout, state: &'a StateStore) -> Self {
        Self { layout, state }
    }

    /// Relink `current/background` one wallpaper away from current one.
    ///
    /// Wallpapers are ordered by file name. Position comes from the persisted
    /// index, or the position of the persisted path, and defaults to the first
    /// wallpaper. The new index is persisted after the link is in place.
    ///
    /// # Errors
    ///
    /// - Return [`EngineError::NoBackgrounds`] if current theme has no synced
    ///   wallpapers.
    /// - Return [`EngineError::ListBackgrounds`] if wallpaper directory
    ///   cannot be read.
    /// - Return [`EngineError::Link`] or [`EngineError::State`] if relinking
    ///   or persisting fails.
    pub fn cycle(&self, slug: &str, direction: Direction) -> Result<PathBuf> {
        let dir = self.layout.theme_dir(slug).join(BACKGROUNDS_DIR);
        let wallpapers = list_wallpapers(&dir)?;
        if wallpapers.is_empty() {
            return Err(EngineError::NoBackgrounds {
                slug: slug.to_string(),
                path: dir,
            });
        }

        let index = match self.state.current_background() {
            Some(BackgroundSelection::Index(index)) if index < wallpapers.len() => index,
            Some(BackgroundSelection::Path(path)) => position_of(&wallpapers, &path).unwrap_or(0),
            _ => 0,
        };
        let next = direction.step(index, wallpapers.len());
        let chosen = wallpapers[next].clone();
        debug!("background {direction} from {index} to {next}");

        replace_link(&chosen, &self.layout.current_background_link())?;
        self.state
            .set_current_background(&BackgroundSelection::Index(next))?;
        info!("background now {:?}", chosen.display());

        Ok(chosen)
    }
}

fn list_wallpapers(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let with_path = |source| EngineError::ListBackgrounds {
        source,
        path: dir.to_path_buf(),
    };
    let mut wallpapers = Vec::new();
    for entry in fs::read_dir(dir).map_err(with_path)? {
        let path = entry.map_err(with_path)?.path();
        if path.is_file() {
            wallpapers.push(path);
        }
    }
    wallpapers.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(wallpapers)
}

fn position_of(wallpapers: &[PathBuf], path: &Path) -> Option<usize> {
    wallpapers
        .iter()
        .position(|wallpaper| wallpaper == path)
        .or_else(|| {
            let name = path.file_name()?;
            wallpapers
                .iter()
                .position(|wallpaper| wallpaper.file_name() == Some(name))
        })
}
