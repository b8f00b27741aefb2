// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Editor reload hooks.

use crate::{
    config::Platform,
    hooks::{HookContext, HookError, HookOutcome, ReloadHook, Result},
    syscall::{syscall_non_interactive, Environment},
};

use regex::Regex;
use serde_json::{Map, Value};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use tracing::{debug, warn};

const COLOR_THEME_KEY: &str = "workbench.colorTheme";
const FALLBACK_COLORSCHEME: &str = "tokyonight";

// Opens the theme picker of a VSCode style editor and types the theme name.
const EDITOR_SCRIPT: &[&str] = &[
    "on run argv",
    "set targetApp to item 1 of argv",
    "set processName to item 2 of argv",
    "set themeName to item 3 of argv",
    "tell application targetApp to activate",
    "delay 0.15",
    "tell application \"System Events\"",
    "if not (exists process processName) then return",
    "tell process processName",
    "keystroke \"k\" using {command down}",
    "delay 0.05",
    "keystroke \"t\" using {command down}",
    "delay 0.2",
    "keystroke themeName",
    "delay 0.1",
    "key code 36",
    "end tell",
    "end tell",
    "end run",
];

static COLORSCHEME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"colorscheme\s*=\s*"[^"]*""#).expect("valid regex"));

/// Point VSCode at theme's color theme.
#[derive(Debug, Default, Clone, Copy)]
pub struct VsCodeHook;

impl ReloadHook for VsCodeHook {
    fn label(&self) -> &'static str {
        "VSCode"
    }

    fn run(&self, ctx: &HookContext<'_>) -> Result<HookOutcome> {
        if !ctx.config.editor.vscode {
            return Ok(HookOutcome::skipped("disabled in config"));
        }
        let Some(theme_name) = ctx.theme.vscode_theme() else {
            return Ok(HookOutcome::skipped("theme names no VSCode theme"));
        };

        let editor = Editor {
            app_dir: "Code",
            app_name: "Visual Studio Code",
            process_name: "Code",
        };
        editor.refresh(ctx, &theme_name)
    }
}

/// Point Cursor at theme's color theme.
#[derive(Debug, Default, Clone, Copy)]
pub struct CursorHook;

impl ReloadHook for CursorHook {
    fn label(&self) -> &'static str {
        "Cursor"
    }

    fn run(&self, ctx: &HookContext<'_>) -> Result<HookOutcome> {
        if !ctx.config.editor.cursor {
            return Ok(HookOutcome::skipped("disabled in config"));
        }
        let Some(theme_name) = ctx.theme.cursor_theme().or_else(|| ctx.theme.vscode_theme())
        else {
            return Ok(HookOutcome::skipped("theme names no Cursor theme"));
        };

        let editor = Editor {
            app_dir: "Cursor",
            app_name: "Cursor",
            process_name: "Cursor",
        };
        editor.refresh(ctx, &theme_name)
    }
}

struct Editor {
    app_dir: &'static str,
    app_name: &'static str,
    process_name: &'static str,
}

impl Editor {
    fn settings_path(&self, home: &Path, platform: Platform) -> PathBuf {
        let base = match platform {
            Platform::Darwin => home.join("Library").join("Application Support"),
            Platform::Linux => home.join(".config"),
        };
        base.join(self.app_dir).join("User").join("settings.json")
    }

    fn refresh(&self, ctx: &HookContext<'_>, theme_name: &str) -> Result<HookOutcome> {
        let path = self.settings_path(&ctx.layout.home, ctx.config.platform);
        let Some(mut settings) = read_settings(&path)? else {
            return Ok(HookOutcome::skipped(format!(
                "no settings at {:?}",
                path.display()
            )));
        };

        if settings.get(COLOR_THEME_KEY).and_then(Value::as_str) == Some(theme_name) {
            return Ok(HookOutcome::skipped(format!("already using {theme_name}")));
        }
        settings.insert(COLOR_THEME_KEY.into(), Value::String(theme_name.into()));
        write_settings(&path, &settings)?;

        let mut message = format!("set {theme_name} in {:?}", path.display());
        if self.automate(ctx.env, theme_name) {
            message.push_str(" and reloaded window");
        }

        Ok(HookOutcome::Applied(message))
    }

    fn automate(&self, env: &Environment, theme_name: &str) -> bool {
        if env.host != Platform::Darwin {
            return false;
        }
        if !env.ui_automation {
            debug!("{} automation disabled", self.app_name);
            return false;
        }
        if !env.process_running(self.process_name) {
            return false;
        }

        match osascript(env, EDITOR_SCRIPT, &[self.app_name, self.process_name, theme_name]) {
            Ok(_) => true,
            Err(error) => {
                warn!(
                    "unable to automate {} theme reload, grant accessibility \
                     permissions to your terminal: {error}",
                    self.app_name
                );
                false
            }
        }
    }
}

/// Run AppleScript given line by line, passing `args` as its `argv`.
pub(crate) fn osascript(
    env: &Environment,
    script: &[&str],
    args: &[&str],
) -> crate::syscall::Result<String> {
    let binary = env
        .find_binary("osascript", &["/usr/bin/osascript"])
        .unwrap_or_else(|| PathBuf::from("osascript"));
    let mut argv: Vec<&str> = Vec::with_capacity(script.len() * 2 + args.len());
    for line in script {
        argv.push("-e");
        argv.push(line);
    }
    argv.extend_from_slice(args);
    syscall_non_interactive(binary, argv)
}

/// Read editor settings, tolerating full-line `//` comments.
///
/// Returns `None` if the file is absent or does not hold a JSON object.
fn read_settings(path: &Path) -> Result<Option<Map<String, Value>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(HookError::Read {
                source,
                path: path.to_path_buf(),
            })
        }
    };

    let cleaned = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");
    if cleaned.trim().is_empty() {
        return Ok(Some(Map::new()));
    }

    let value: Value = serde_json::from_str(&cleaned).map_err(|source| HookError::Parse {
        source,
        path: path.to_path_buf(),
    })?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Ok(None),
    }
}

fn write_settings(path: &Path, settings: &Map<String, Value>) -> Result<()> {
    let with_path = |source| HookError::Write {
        source,
        path: path.to_path_buf(),
    };
    if let Some(parent) = path.parent() {
        mkdirp::mkdirp(parent).map_err(with_path)?;
    }
    let mut text = serde_json::to_string_pretty(settings).map_err(|source| HookError::Parse {
        source,
        path: path.to_path_buf(),
    })?;
    text.push('\n');
    fs::write(path, text).map_err(with_path)
}

/// Switch Neovim colorscheme on disk and in running instances.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeovimHook;

impl ReloadHook for NeovimHook {
    fn label(&self) -> &'static str {
        "Neovim"
    }

    fn run(&self, ctx: &HookContext<'_>) -> Result<HookOutcome> {
        if !ctx.config.editor.neovim {
            return Ok(HookOutcome::skipped("disabled in config"));
        }
        let colorscheme = ctx
            .theme
            .nvim_colorscheme()
            .unwrap_or_else(|| FALLBACK_COLORSCHEME.to_string());

        let theme_file = ctx
            .layout
            .home
            .join(".config")
            .join("nvim")
            .join("lua")
            .join("plugins")
            .join("theme.lua");
        let updated = update_theme_file(&theme_file, &colorscheme)?;

        let Some(nvr) = ctx.env.find_binary("nvr", &[]) else {
            return Ok(match updated {
                true => HookOutcome::applied(format!("set {colorscheme}, nvr not found")),
                false => HookOutcome::skipped("nvr not found"),
            });
        };

        let servers = match syscall_non_interactive(&nvr, ["--serverlist"]) {
            Ok(servers) => servers,
            Err(error) => {
                debug!("nvr --serverlist failed: {error}");
                return Ok(match updated {
                    true => HookOutcome::applied(format!(
                        "set {colorscheme}, unable to query nvr servers"
                    )),
                    false => HookOutcome::skipped("unable to query nvr servers"),
                });
            }
        };

        let expr = format!("execute('colorscheme ''{colorscheme}''')");
        let mut reloaded = 0;
        for server in servers.split_whitespace() {
            let args = ["--servername", server, "--remote-expr", expr.as_str()];
            match syscall_non_interactive(&nvr, args) {
                Ok(_) => reloaded += 1,
                Err(error) => debug!("nvr server {server:?} unreachable: {error}"),
            }
        }

        match (reloaded, updated) {
            (0, false) => Ok(HookOutcome::skipped("no Neovim instances reachable via nvr")),
            (count, _) => Ok(HookOutcome::applied(format!(
                "set {colorscheme} on {count} instance(s)"
            ))),
        }
    }
}

/// Rewrite or append `colorscheme = "..."` in Neovim theme file.
///
/// Returns whether the file changed. A missing file is left alone.
fn update_theme_file(path: &Path, colorscheme: &str) -> Result<bool> {
    let original = match fs::read_to_string(path) {
        Ok(original) => original,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(source) => {
            return Err(HookError::Read {
                source,
                path: path.to_path_buf(),
            })
        }
    };

    let replacement = format!("colorscheme = \"{colorscheme}\"");
    let updated = if COLORSCHEME_LINE.is_match(&original) {
        COLORSCHEME_LINE
            .replace(&original, regex::NoExpand(&replacement))
            .into_owned()
    } else {
        format!("{}\n{replacement}\n", original.trim_end())
    };

    if updated == original {
        return Ok(false);
    }
    fs::write(path, updated).map_err(|source| HookError::Write {
        source,
        path: path.to_path_buf(),
    })?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ThemectlConfig,
        hooks::tests::quiet_env,
        path::Layout,
        theme::{Section, Theme},
    };
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn vscode_theme() -> Theme {
        let Value::Object(vscode) = json!({"theme": "Nord"}) else {
            unreachable!()
        };
        Theme::new("Nord", "nord", "Nord").with_section("vscode", Section::new(vscode))
    }

    #[test]
    fn vscode_settings_rewritten_without_comments() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let config = ThemectlConfig {
            platform: Platform::Linux,
            ..Default::default()
        };
        let layout = Layout::resolve(root.path(), &config);
        let settings = root.path().join(".config/Code/User/settings.json");
        fs::create_dir_all(settings.parent().unwrap())?;
        fs::write(
            &settings,
            indoc! {r#"
                // user settings
                {
                  "editor.fontSize": 14,
                  "workbench.colorTheme": "Default Dark"
                }
            "#},
        )?;

        let theme = vscode_theme();
        let env = quiet_env();
        let ctx = HookContext {
            theme: &theme,
            config: &config,
            layout: &layout,
            env: &env,
        };

        let outcome = VsCodeHook.run(&ctx)?;
        assert!(matches!(outcome, HookOutcome::Applied(_)));
        assert_eq!(
            fs::read_to_string(&settings)?,
            indoc! {r#"
                {
                  "editor.fontSize": 14,
                  "workbench.colorTheme": "Nord"
                }
            "#}
        );

        let outcome = VsCodeHook.run(&ctx)?;
        assert_eq!(outcome, HookOutcome::skipped("already using Nord"));

        Ok(())
    }

    #[test]
    fn cursor_falls_back_to_vscode_theme_and_skips_missing_settings() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let config = ThemectlConfig {
            platform: Platform::Darwin,
            ..Default::default()
        };
        let layout = Layout::resolve(root.path(), &config);
        let theme = vscode_theme();
        let env = quiet_env();
        let ctx = HookContext {
            theme: &theme,
            config: &config,
            layout: &layout,
            env: &env,
        };

        assert!(matches!(CursorHook.run(&ctx)?, HookOutcome::Skipped(_)));

        let settings = root
            .path()
            .join("Library/Application Support/Cursor/User/settings.json");
        fs::create_dir_all(settings.parent().unwrap())?;
        fs::write(&settings, "")?;
        assert!(matches!(CursorHook.run(&ctx)?, HookOutcome::Applied(_)));
        assert!(fs::read_to_string(&settings)?.contains("\"workbench.colorTheme\": \"Nord\""));

        Ok(())
    }

    #[test]
    fn disabled_editor_is_skipped() -> anyhow::Result<()> {
        let mut config = ThemectlConfig::default();
        config.editor.vscode = false;
        let layout = Layout::resolve("/nonexistent-home", &config);
        let theme = vscode_theme();
        let env = quiet_env();
        let ctx = HookContext {
            theme: &theme,
            config: &config,
            layout: &layout,
            env: &env,
        };

        assert_eq!(
            VsCodeHook.run(&ctx)?,
            HookOutcome::skipped("disabled in config")
        );

        Ok(())
    }

    #[test]
    fn neovim_theme_file_replace_or_append() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let file = root.path().join("theme.lua");

        assert!(!update_theme_file(&file, "nord")?);

        fs::write(&file, "return {\n  colorscheme = \"tokyonight\",\n}\n")?;
        assert!(update_theme_file(&file, "nord")?);
        assert_eq!(
            fs::read_to_string(&file)?,
            "return {\n  colorscheme = \"nord\",\n}\n"
        );
        assert!(!update_theme_file(&file, "nord")?);

        fs::write(&file, "-- empty\n\n")?;
        assert!(update_theme_file(&file, "nord")?);
        assert_eq!(fs::read_to_string(&file)?, "-- empty\ncolorscheme = \"nord\"\n");

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn neovim_skipped_when_nvr_cannot_list_servers() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir()?;
        let bin = root.path().join("bin");
        fs::create_dir_all(&bin)?;
        fs::write(bin.join("nvr"), "#!/bin/sh\necho 'no servers' >&2\nexit 1\n")?;
        fs::set_permissions(bin.join("nvr"), fs::Permissions::from_mode(0o755))?;

        let config = ThemectlConfig::default();
        let layout = Layout::resolve(root.path(), &config);
        let theme = Theme::new("Nord", "nord", "Nord");
        let env = Environment {
            path_dirs: vec![bin],
            ..quiet_env()
        };
        let ctx = HookContext {
            theme: &theme,
            config: &config,
            layout: &layout,
            env: &env,
        };

        assert_eq!(
            NeovimHook.run(&ctx)?,
            HookOutcome::skipped("unable to query nvr servers")
        );

        Ok(())
    }
}
