// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Theme activation.
//!
//! Applying a theme flips the runtime symlink set at the theme's synced asset
//! tree, then records the theme as current:
//!
//! ```text
//! <current-root>/theme      -> <themes-root>/<slug>
//! <current-root>/background -> <themes-root>/<slug>/backgrounds/<wallpaper>
//! ```
//!
//! # Ordering
//!
//! Apply moves through a fixed sequence of steps. The asset directory is
//! verified before any symlink is touched, and state is only written once
//! every symlink is in place. A failure at any step leaves the state file
//! exactly as it was, so state never names a theme whose assets are not
//! actually active. Reload hooks run afterwards and are the caller's concern,
//! see [`hooks`](crate::hooks).

pub mod background;
pub mod cycle;
pub mod link;

use crate::{
    assets::BACKGROUNDS_DIR,
    engine::link::{replace_link, LinkError},
    path::Layout,
    state::{BackgroundSelection, StateError, StateStore},
    theme::{Theme, ThemeRepository},
};

use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Apply themes by relinking runtime symlinks.
#[derive(Debug, Clone)]
pub struct ApplyEngine<'a> {
    layout: &'a Layout,
    state: &'a StateStore,
}

impl<'a> ApplyEngine<'a> {
    /// Construct new apply engine.
    pub fn new(layout: &'a Layout, state: &'a StateStore) -> Self {
        Self { layout, state }
    }

    /// Resolve query to theme.
    ///
    /// # Errors
    ///
    /// - Return [`EngineError::UnknownTheme`] if no theme matches query.
    pub fn resolve<'repo>(
        &self,
        repository: &'repo ThemeRepository,
        query: &str,
    ) -> Result<&'repo Theme> {
        repository
            .get(query)
            .ok_or_else(|| EngineError::UnknownTheme {
                query: query.to_string(),
                metadata: self.layout.metadata.clone(),
            })
    }

    /// Activate synced assets of theme.
    ///
    /// # Errors
    ///
    /// - Return [`EngineError::NotSynced`] if theme has no asset directory.
    /// - Return [`EngineError::Link`] if a runtime symlink cannot be replaced.
    /// - Return [`EngineError::State`] if state cannot be persisted.
    #[instrument(skip(self, theme), fields(slug = %theme.slug), level = "debug")]
    pub fn apply(&self, theme: &Theme) -> Result<Applied> {
        let theme_dir = self.layout.theme_dir(&theme.slug);
        if !theme_dir.exists() {
            return Err(EngineError::NotSynced {
                slug: theme.slug.clone(),
                path: theme_dir,
            });
        }

        let theme_link = self.layout.current_theme_link();
        replace_link(&theme_dir, &theme_link)?;
        debug!("current theme now {:?}", theme_dir.display());

        let background = match theme
            .wallpapers
            .first()
            .and_then(|wallpaper| wallpaper.file_name())
        {
            Some(file_name) => {
                let local = theme_dir.join(BACKGROUNDS_DIR).join(file_name);
                if local.exists() {
                    replace_link(&local, &self.layout.current_background_link())?;
                    Some(local)
                } else {
                    debug!("wallpaper {:?} not synced, keep background", local.display());
                    None
                }
            }
            None => None,
        };

        // INVARIANT: State is written last, after every symlink is in place.
        if let Some(local) = &background {
            self.state
                .set_current_background(&BackgroundSelection::Path(local.clone()))?;
        }
        self.state.set_current_theme(&theme.slug)?;
        info!("applied {}", theme.display_name);

        Ok(Applied {
            slug: theme.slug.clone(),
            theme_dir,
            background,
        })
    }

    /// Resolve query to theme and apply it.
    ///
    /// # Errors
    ///
    /// - Same as [`ApplyEngine::resolve`] and [`ApplyEngine::apply`].
    pub fn apply_query<'repo>(
        &self,
        repository: &'repo ThemeRepository,
        query: &str,
    ) -> Result<(&'repo Theme, Applied)> {
        let theme = self.resolve(repository, query)?;
        let applied = self.apply(theme)?;
        Ok((theme, applied))
    }
}

/// Outcome of a successful apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Slug written to state.
    pub slug: String,

    /// Asset directory `current/theme` now points at.
    pub theme_dir: PathBuf,

    /// Wallpaper `current/background` now points at, if it was relinked.
    pub background: Option<PathBuf>,
}

/// Theme activation error types.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No theme matches query.
    #[error("theme {query:?} not found in {:?}", metadata.display())]
    UnknownTheme { query: String, metadata: PathBuf },

    /// Theme assets were never synced.
    #[error(
        "theme assets missing for {slug} at {:?}, run `themectl sync-assets` first",
        path.display()
    )]
    NotSynced { slug: String, path: PathBuf },

    /// Runtime symlink cannot be replaced.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// State cannot be persisted.
    #[error(transparent)]
    State(#[from] StateError),

    /// Current theme has no usable wallpapers.
    #[error("no wallpapers synced for {slug} in {:?}", path.display())]
    NoBackgrounds { slug: String, path: PathBuf },

    /// Wallpaper directory cannot be listed.
    #[error("failed to list wallpapers in {:?}", path.display())]
    ListBackgrounds {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
