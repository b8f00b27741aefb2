// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Desktop session reload hooks.
//!
//! Both hooks only make sense inside a Linux Wayland session and skip
//! themselves everywhere else.

use crate::{
    config::Platform,
    hooks::{HookContext, HookOutcome, ReloadHook, Result},
    syscall::{syscall_non_interactive, syscall_with_env, Environment, HYPRLAND_SIGNATURE_VAR},
};

use std::{fs, time::SystemTime};

/// Ask Hyprland to reload its config.
#[derive(Debug, Default, Clone, Copy)]
pub struct HyprlandHook;

impl ReloadHook for HyprlandHook {
    fn label(&self) -> &'static str {
        "Hyprland"
    }

    fn run(&self, ctx: &HookContext<'_>) -> Result<HookOutcome> {
        if ctx.env.host != Platform::Linux {
            return Ok(HookOutcome::skipped("not a Linux host"));
        }
        let Some(hyprctl) = ctx.env.find_binary("hyprctl", &[]) else {
            return Ok(HookOutcome::skipped("hyprctl not found"));
        };
        let Some(signature) = hypr_signature(ctx.env) else {
            return Ok(HookOutcome::skipped("Hyprland signature unavailable"));
        };

        syscall_with_env(
            hyprctl,
            ["-i", signature.as_str(), "reload"],
            [(HYPRLAND_SIGNATURE_VAR, signature.as_str())],
        )?;

        Ok(HookOutcome::applied("reloaded Hyprland config"))
    }
}

/// Find signature of running Hyprland instance.
///
/// An exported signature wins. Otherwise the most recently modified instance
/// directory under `$XDG_RUNTIME_DIR/hypr` is taken.
pub fn hypr_signature(env: &Environment) -> Option<String> {
    if let Some(signature) = &env.hypr_signature {
        return Some(signature.clone());
    }

    let hypr_dir = env.xdg_runtime_dir.as_ref()?.join("hypr");
    fs::read_dir(hypr_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            if !metadata.is_dir() {
                return None;
            }
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, entry.file_name().to_string_lossy().into_owned()))
        })
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, name)| name)
}

/// Show current background through `swww`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallpaperHook;

impl ReloadHook for WallpaperHook {
    fn label(&self) -> &'static str {
        "Wallpaper"
    }

    fn run(&self, ctx: &HookContext<'_>) -> Result<HookOutcome> {
        if ctx.env.host != Platform::Linux {
            return Ok(HookOutcome::skipped("not a Linux host"));
        }
        let background = ctx.layout.current_background_link();
        if !background.exists() {
            return Ok(HookOutcome::skipped("no current background"));
        }
        let Some(swww) = ctx.env.find_binary("swww", &[]) else {
            return Ok(HookOutcome::skipped("swww not found"));
        };

        let background = background.to_string_lossy().into_owned();
        syscall_non_interactive(
            swww,
            [
                "img",
                background.as_str(),
                "--transition-type",
                "simple",
                "--transition-step",
                "255",
            ],
        )?;

        Ok(HookOutcome::applied("updated wallpaper via swww"))
    }
}
