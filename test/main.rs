// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

#![cfg(unix)]

use themectl::{
    assets::{render::Integration, AssetSynchronizer},
    config::ThemectlConfig,
    engine::{
        cycle::{CycleEngine, Direction},
        ApplyEngine, EngineError,
    },
    path::Layout,
    state::StateStore,
    theme::ThemeRepository,
};

use anyhow::Result;
use indicatif::ProgressBar;
use indoc::formatdoc;
use pretty_assertions::assert_eq;
use std::{collections::BTreeSet, fs, path::Path};
use tempfile::TempDir;

/// Synthetic home with metadata for a few themes.
struct HomeFixture {
    root: TempDir,
    layout: Layout,
    state: StateStore,
}

impl HomeFixture {
    fn new() -> Result<Self> {
        let root = tempfile::tempdir()?;
        let walls = root.path().join("walls");
        fs::create_dir_all(&walls)?;
        fs::write(walls.join("tokyo.png"), "tokyo")?;
        fs::write(walls.join("rose.png"), "rose")?;

        let config = ThemectlConfig::default();
        let layout = Layout::resolve(root.path(), &config);
        fs::create_dir_all(layout.metadata.parent().unwrap())?;
        fs::write(
            &layout.metadata,
            formatdoc! {r##"
                {{
                  "themes": [
                    {{
                      "name": "Tokyo Night",
                      "kind": "dark",
                      "kitty": {{"foreground": "#c0caf5", "background": "#1a1b26"}},
                      "walker": {{"text": "#c0caf5"}},
                      "wallpapers": ["{walls}/tokyo.png"]
                    }},
                    {{
                      "name": "Rose Pine",
                      "mako": {{"textColor": "#e0def4"}},
                      "wallpapers": ["{walls}/rose.png", "{walls}/gone.png"]
                    }},
                    {{
                      "name": "Nord"
                    }}
                  ]
                }}
            "##, walls = walls.display()},
        )?;
        let state = StateStore::new(&layout.state_file, &layout.background_state_file);

        Ok(Self {
            root,
            layout,
            state,
        })
    }

    fn repository(&self) -> ThemeRepository {
        ThemeRepository::load(&self.layout.metadata)
    }

    fn sync(&self) -> Result<()> {
        AssetSynchronizer::new(&self.layout.themes_root)
            .sync(&self.repository(), &ProgressBar::hidden())?;
        Ok(())
    }
}

fn file_names(dir: &Path) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        names.insert(entry?.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

#[test]
fn sync_then_apply_activates_rendered_assets() -> Result<()> {
    let home = HomeFixture::new()?;
    home.sync()?;
    let repository = home.repository();

    let engine = ApplyEngine::new(&home.layout, &home.state);
    let (theme, applied) = engine.apply_query(&repository, "Tokyo Night")?;
    assert_eq!(theme.slug, "tokyo-night");

    let current = home.layout.current_theme_link();
    assert_eq!(fs::read_link(&current)?, home.layout.theme_dir("tokyo-night"));
    let expect: BTreeSet<String> = [
        Integration::Kitty.file_name(),
        Integration::Walker.file_name(),
        "backgrounds",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(file_names(&current)?, expect);

    let background = home.layout.current_background_link();
    assert_eq!(fs::read_to_string(&background)?, "tokyo");
    assert_eq!(applied.background, Some(fs::read_link(&background)?));
    assert_eq!(home.state.current_theme().as_deref(), Some("tokyo-night"));

    Ok(())
}

#[test]
fn unknown_theme_leaves_everything_untouched() -> Result<()> {
    let home = HomeFixture::new()?;
    home.sync()?;
    let repository = home.repository();
    let engine = ApplyEngine::new(&home.layout, &home.state);
    engine.apply_query(&repository, "nord")?;
    let before = fs::read(home.state.theme_path())?;

    let result = engine.apply_query(&repository, "gruvbox");
    assert!(matches!(result, Err(EngineError::UnknownTheme { .. })));
    assert_eq!(fs::read(home.state.theme_path())?, before);
    assert_eq!(
        fs::read_link(home.layout.current_theme_link())?,
        home.layout.theme_dir("nord")
    );

    Ok(())
}

#[test]
fn applying_before_sync_is_refused() -> Result<()> {
    let home = HomeFixture::new()?;
    let repository = home.repository();

    let result = ApplyEngine::new(&home.layout, &home.state).apply_query(&repository, "nord");
    assert!(matches!(result, Err(EngineError::NotSynced { .. })));
    assert!(fs::symlink_metadata(home.layout.current_theme_link()).is_err());
    assert!(!home.state.theme_path().exists());

    Ok(())
}

#[test]
fn resync_is_idempotent_and_keeps_active_link() -> Result<()> {
    let home = HomeFixture::new()?;
    home.sync()?;
    let repository = home.repository();
    ApplyEngine::new(&home.layout, &home.state).apply_query(&repository, "rose-pine")?;

    let dir = home.layout.theme_dir("rose-pine");
    let first = file_names(&dir)?;
    let mako = fs::read_to_string(dir.join(Integration::Mako.file_name()))?;
    home.sync()?;

    assert_eq!(file_names(&dir)?, first);
    assert_eq!(fs::read_to_string(dir.join(Integration::Mako.file_name()))?, mako);
    assert!(home.layout.current_theme_link().is_dir());
    assert_eq!(
        file_names(&dir.join("backgrounds"))?,
        BTreeSet::from(["rose.png".to_string()])
    );

    Ok(())
}

#[test]
fn cycle_walks_every_theme_and_wraps() -> Result<()> {
    let home = HomeFixture::new()?;
    home.sync()?;
    let repository = home.repository();
    let cycle = CycleEngine::default();
    let engine = ApplyEngine::new(&home.layout, &home.state);

    let mut visited = Vec::new();
    for _ in 0..repository.len() {
        let theme = cycle
            .cycle(&repository, &home.state, Direction::Next)
            .expect("themes to cycle");
        engine.apply(theme)?;
        visited.push(theme.slug.clone());
    }

    assert_eq!(visited, vec!["rose-pine", "tokyo-night", "nord"]);

    let back = cycle
        .cycle(&repository, &home.state, Direction::Prev)
        .expect("themes to cycle");
    assert_eq!(back.slug, "tokyo-night");

    assert!(home.root.path().join(".config/omarchy/current/theme").is_dir());

    Ok(())
}
