// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Terminal reload hooks.

use crate::{
    config::Platform,
    hooks::{editor::osascript, HookContext, HookError, HookOutcome, ReloadHook, Result},
    syscall::syscall_non_interactive,
    theme::Section,
};

use std::{ffi::OsStr, fs};
use tracing::debug;

const TMUX_REQUIRED: [&str; 3] = ["statusBackground", "statusForeground", "windowStatusCurrent"];

const ALACRITTY_FALLBACKS: &[&str] = &[
    "/run/current-system/sw/bin/alacritty",
    "/nix/var/nix/profiles/default/bin/alacritty",
    "/Applications/Alacritty.app/Contents/MacOS/alacritty",
];

// Nudges a running Ghostty into reloading its config, then restores focus.
const GHOSTTY_SCRIPT: &[&str] = &[
    "tell application \"System Events\"",
    "if exists process \"Ghostty\" then",
    "set frontApp to first application process whose frontmost is true",
    "set frontName to name of frontApp",
    "tell application \"Ghostty\" to activate",
    "delay 0.05",
    "keystroke \",\" using {command down, shift down}",
    "delay 0.05",
    "if frontName is not \"Ghostty\" then",
    "tell application frontName to activate",
    "end if",
    "end if",
    "end tell",
];

/// Write tmux status colors and source them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TmuxHook;

impl ReloadHook for TmuxHook {
    fn label(&self) -> &'static str {
        "tmux"
    }

    fn run(&self, ctx: &HookContext<'_>) -> Result<HookOutcome> {
        let Some(section) = ctx.theme.section("tmux") else {
            return Ok(HookOutcome::skipped("theme has no tmux colors"));
        };
        if !TMUX_REQUIRED.iter().all(|key| section.contains(key)) {
            return Ok(HookOutcome::skipped("tmux colors incomplete"));
        }

        let local = ctx.layout.home.join(".tmux.conf.local");
        if let Some(parent) = local.parent() {
            mkdirp::mkdirp(parent).map_err(|source| HookError::Write {
                source,
                path: local.clone(),
            })?;
        }
        fs::write(&local, tmux_config(section)).map_err(|source| HookError::Write {
            source,
            path: local.clone(),
        })?;

        let Some(tmux) = ctx.env.find_binary("tmux", &[]) else {
            return Ok(HookOutcome::applied(format!(
                "wrote {:?}, tmux not found",
                local.display()
            )));
        };

        // No tmux server running is fine, the file is picked up on next start.
        let main = ctx.layout.home.join(".tmux.conf");
        let args = [OsStr::new("source-file"), main.as_os_str()];
        if let Err(error) = syscall_non_interactive(tmux, args) {
            debug!("tmux source-file failed: {error}");
        }

        Ok(HookOutcome::applied("reloaded tmux theme"))
    }
}

fn tmux_config(section: &Section) -> String {
    let color = |key: &str| section.text(key).unwrap_or_default();
    let lines = [
        "# Generated by themectl".to_string(),
        format!(
            "set -g status-style \"bg={},fg={}\"",
            color("statusBackground"),
            color("statusForeground")
        ),
        format!(
            "set -g window-status-current-style \"bg={},fg={}\"",
            color("windowStatusCurrent"),
            color("statusBackground")
        ),
        format!(
            "set -g pane-active-border-style \"fg={}\"",
            color("paneActiveBorder")
        ),
        format!(
            "set -g pane-border-style \"fg={}\"",
            color("paneInactiveBorder")
        ),
    ];

    let mut config = lines.join("\n");
    config.push('\n');
    config
}

/// Ask Alacritty to reload its config.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlacrittyHook;

impl ReloadHook for AlacrittyHook {
    fn label(&self) -> &'static str {
        "Alacritty"
    }

    fn run(&self, ctx: &HookContext<'_>) -> Result<HookOutcome> {
        let Some(alacritty) = ctx.env.find_binary("alacritty", ALACRITTY_FALLBACKS) else {
            return Ok(HookOutcome::skipped("alacritty not found"));
        };

        let error = match syscall_non_interactive(alacritty, ["msg", "config", "reload"]) {
            Ok(_) => return Ok(HookOutcome::applied("reloaded Alacritty config")),
            Err(error) => error,
        };

        let signaler = ctx
            .env
            .find_binary("pkill", &[])
            .or_else(|| ctx.env.find_binary("killall", &[]));
        let Some(signaler) = signaler else {
            return Err(HookError::Syscall(error));
        };

        debug!("alacritty msg failed, signal instead: {error}");
        for name in ["alacritty", "Alacritty"] {
            let _ = syscall_non_interactive(&signaler, ["-USR1", name]);
        }

        Ok(HookOutcome::applied("sent SIGUSR1 to Alacritty"))
    }
}

/// Ask Ghostty to reload its config.
#[derive(Debug, Default, Clone, Copy)]
pub struct GhosttyHook;

impl ReloadHook for GhosttyHook {
    fn label(&self) -> &'static str {
        "Ghostty"
    }

    fn run(&self, ctx: &HookContext<'_>) -> Result<HookOutcome> {
        let config = ctx.layout.home.join(".config").join("ghostty").join("config");
        if !config.exists() {
            return Ok(HookOutcome::skipped("no Ghostty config"));
        }

        if let Some(ghostty) = ctx.env.find_binary("ghostty", &[]) {
            match syscall_non_interactive(ghostty, ["+reload-config"]) {
                Ok(_) => return Ok(HookOutcome::applied("reloaded Ghostty config")),
                Err(error) => debug!("ghostty +reload-config failed: {error}"),
            }
        }

        if ctx.env.host == Platform::Darwin && ctx.env.process_running("Ghostty") {
            osascript(ctx.env, GHOSTTY_SCRIPT, &[])?;
            return Ok(HookOutcome::applied("reloaded Ghostty via automation"));
        }

        Ok(HookOutcome::skipped("Ghostty not running"))
    }
}
