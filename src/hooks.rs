// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Post-apply reload hooks.
//!
//! Once a theme is active on disk, running programs still hold the old one.
//! Reload hooks poke each of them into picking up the change. Hooks run one
//! after another in a fixed order:
//!
//! 1. VSCode
//! 2. Cursor
//! 3. Neovim
//! 4. tmux
//! 5. Alacritty
//! 6. Hyprland
//! 7. Wallpaper
//! 8. Ghostty
//!
//! A hook that fails is logged and recorded, then the next hook runs anyway.
//! Nothing is retried or rolled back. A hook whose program is simply not
//! around reports itself as skipped rather than failed.

pub mod desktop;
pub mod editor;
pub mod terminal;

use crate::{
    config::ThemectlConfig,
    path::Layout,
    syscall::{Environment, SyscallError},
    theme::Theme,
};

use std::{error::Error as StdError, fmt::Write as _, path::PathBuf};
use tracing::{debug, error, info, instrument};

/// Everything a reload hook may look at.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub theme: &'a Theme,
    pub config: &'a ThemectlConfig,
    pub layout: &'a Layout,
    pub env: &'a Environment,
}

/// Reload a single program after theme switch.
pub trait ReloadHook {
    /// Human readable name used in logs and reports.
    fn label(&self) -> &'static str;

    /// Reload program.
    ///
    /// # Errors
    ///
    /// - Return [`HookError`] if reload was attempted but failed.
    fn run(&self, ctx: &HookContext<'_>) -> Result<HookOutcome>;
}

/// Result of a hook that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Hook did its work.
    Applied(String),

    /// Hook had nothing to do.
    Skipped(String),
}

impl HookOutcome {
    pub(crate) fn applied(message: impl Into<String>) -> Self {
        Self::Applied(message.into())
    }

    pub(crate) fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped(reason.into())
    }
}

/// Final status of one hook run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookStatus {
    Applied(String),
    Skipped(String),
    Failed(String),
}

/// Record of one hook run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookReport {
    pub label: &'static str,
    pub status: HookStatus,
}

/// Run reload hooks in order, isolating failures.
pub struct HookRunner {
    hooks: Vec<Box<dyn ReloadHook>>,
}

impl HookRunner {
    /// Construct runner over custom hook sequence.
    pub fn new(hooks: Vec<Box<dyn ReloadHook>>) -> Self {
        Self { hooks }
    }

    /// Labels of hooks in run order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|hook| hook.label()).collect()
    }

    /// Run every hook once, in order.
    #[instrument(skip(self, ctx), fields(theme = %ctx.theme.slug), level = "debug")]
    pub fn run(&self, ctx: &HookContext<'_>) -> Vec<HookReport> {
        let mut reports = Vec::with_capacity(self.hooks.len());
        for hook in &self.hooks {
            let label = hook.label();
            let status = match hook.run(ctx) {
                Ok(HookOutcome::Applied(message)) => {
                    info!("{label}: {message}");
                    HookStatus::Applied(message)
                }
                Ok(HookOutcome::Skipped(reason)) => {
                    debug!("{label} skipped: {reason}");
                    HookStatus::Skipped(reason)
                }
                Err(error) => {
                    let message = error_chain(&error);
                    error!("{label} reload failed: {message}");
                    HookStatus::Failed(message)
                }
            };
            reports.push(HookReport { label, status });
        }

        reports
    }
}

impl Default for HookRunner {
    fn default() -> Self {
        Self::new(vec![
            Box::new(editor::VsCodeHook),
            Box::new(editor::CursorHook),
            Box::new(editor::NeovimHook),
            Box::new(terminal::TmuxHook),
            Box::new(terminal::AlacrittyHook),
            Box::new(desktop::HyprlandHook),
            Box::new(desktop::WallpaperHook),
            Box::new(terminal::GhosttyHook),
        ])
    }
}

/// Render error with every source in its chain.
pub(crate) fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(message, ": {cause}");
        source = cause.source();
    }
    message
}

/// Reload hook error types.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Program config cannot be read.
    #[error("failed to read {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Program config cannot be written.
    #[error("failed to write {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Editor settings are not valid JSON.
    #[error("failed to parse settings at {:?}", path.display())]
    Parse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },

    /// Program rejected reload request.
    #[error(transparent)]
    Syscall(#[from] SyscallError),
}

/// Friendly result alias :3
pub type Result<T, E = HookError> = std::result::Result<T, E>;
