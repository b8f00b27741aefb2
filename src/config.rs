// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the themectl configuration file to simplify the
//! process of deserialization. A missing configuration file is not an error,
//! it just means every setting keeps its default value.
//!
//! # General Layout
//!
//! ```toml
//! platform = "linux"
//! theme_metadata = "~/.config/themectl/themes.json"
//! state_file = "~/.config/themes/.current-theme"
//!
//! [editor]
//! vscode = true
//! cursor = false
//! neovim = true
//!
//! [order]
//! cycle = ["tokyo-night", "rose-pine"]
//! ```

use serde::Deserialize;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Themectl configuration file.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
#[serde(default)]
pub struct ThemectlConfig {
    /// Platform whose editor settings layout should be targeted.
    pub platform: Platform,

    /// Override path to theme metadata document.
    pub theme_metadata: Option<PathBuf>,

    /// Override path to current theme state file.
    pub state_file: Option<PathBuf>,

    /// Override path to current background state file.
    pub background_state_file: Option<PathBuf>,

    /// Override path to hotkey manifest.
    pub hotkeys_file: Option<PathBuf>,

    /// Editor automation toggles.
    pub editor: EditorAutomation,

    /// Theme ordering used for cycling.
    pub order: ThemeOrder,
}

impl ThemectlConfig {
    /// Load configuration file at target path.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if existing file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file content is invalid.
    /// - Return [`ConfigError::ShellExpansion`] if a path field cannot be
    ///   expanded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        read_to_string(path)
            .map_err(|source| ConfigError::Read {
                source,
                path: path.to_path_buf(),
            })?
            .parse()
    }
}

impl FromStr for ThemectlConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: ThemectlConfig =
            toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path override.
        for field in [
            &mut config.theme_metadata,
            &mut config.state_file,
            &mut config.background_state_file,
            &mut config.hotkeys_file,
        ] {
            if let Some(path) = field.take() {
                *field = Some(expand_path(&path)?);
            }
        }

        Ok(config)
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    Ok(PathBuf::from(
        shellexpand::full(path.to_string_lossy().as_ref())
            .map_err(ConfigError::ShellExpansion)?
            .into_owned(),
    ))
}

/// Platform flavor that decides where editor settings live.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Darwin,
    Linux,
}

impl Platform {
    /// Platform this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::Darwin
        } else {
            Self::Linux
        }
    }
}

impl Display for Platform {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Darwin => fmt.write_str("darwin"),
            Self::Linux => fmt.write_str("linux"),
        }
    }
}

/// Toggles for editor reload hooks.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
#[serde(default)]
pub struct EditorAutomation {
    pub vscode: bool,
    pub cursor: bool,
    pub neovim: bool,
}

impl Default for EditorAutomation {
    fn default() -> Self {
        Self {
            vscode: true,
            cursor: true,
            neovim: true,
        }
    }
}

/// Explicit theme ordering.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeOrder {
    /// Theme slugs to cycle through, in order.
    pub cycle: Vec<String>,
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
