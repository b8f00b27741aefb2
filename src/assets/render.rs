// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Per-integration config fragment renderers.
//!
//! Every renderer is a pure function from a [`Theme`] to the text of one
//! config file in that integration's native syntax. A renderer returns `None`
//! when the theme carries no data for its integration, in which case no file
//! is emitted at all.

use crate::theme::{value_text, Section, Theme};

use serde_json::{json, Value};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Integrations themectl knows how to render config fragments for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Integration {
    Hyprland,
    Waybar,
    Alacritty,
    Kitty,
    Ghostty,
    Walker,
    Mako,
    SwayOsd,
    VsCode,
    Chromium,
    Neovim,
    Hyprlock,
}

impl Integration {
    /// Every integration, in emission order.
    pub const ALL: [Integration; 12] = [
        Self::Hyprland,
        Self::Waybar,
        Self::Alacritty,
        Self::Kitty,
        Self::Ghostty,
        Self::Walker,
        Self::Mako,
        Self::SwayOsd,
        Self::VsCode,
        Self::Chromium,
        Self::Neovim,
        Self::Hyprlock,
    ];

    /// Name of file emitted into a theme's asset directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Hyprland => "hyprland.conf",
            Self::Waybar => "waybar.css",
            Self::Alacritty => "alacritty.toml",
            Self::Kitty => "kitty.conf",
            Self::Ghostty => "ghostty.conf",
            Self::Walker => "walker.css",
            Self::Mako => "mako.ini",
            Self::SwayOsd => "swayosd.css",
            Self::VsCode => "vscode.json",
            Self::Chromium => "chromium.theme",
            Self::Neovim => "neovim.lua",
            Self::Hyprlock => "hyprlock.conf",
        }
    }

    /// Render config fragment for theme.
    pub fn render(&self, theme: &Theme) -> Option<String> {
        match self {
            Self::Hyprland => render_hyprland(theme),
            Self::Waybar => render_waybar(theme),
            Self::Alacritty => render_alacritty(theme),
            Self::Kitty => render_kitty(theme),
            Self::Ghostty => render_ghostty(theme),
            Self::Walker => render_walker(theme),
            Self::Mako => render_mako(theme),
            Self::SwayOsd => render_swayosd(theme),
            Self::VsCode => render_vscode(theme),
            Self::Chromium => render_chromium(theme),
            Self::Neovim => render_neovim(theme),
            Self::Hyprlock => render_hyprlock(theme),
        }
    }
}

impl Display for Integration {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Hyprland => "hyprland",
            Self::Waybar => "waybar",
            Self::Alacritty => "alacritty",
            Self::Kitty => "kitty",
            Self::Ghostty => "ghostty",
            Self::Walker => "walker",
            Self::Mako => "mako",
            Self::SwayOsd => "swayosd",
            Self::VsCode => "vscode",
            Self::Chromium => "chromium",
            Self::Neovim => "neovim",
            Self::Hyprlock => "hyprlock",
        };
        fmt.write_str(name)
    }
}

/// Normalize rendered text: trailing whitespace trimmed, one final newline.
pub fn finish(text: &str) -> String {
    let mut out = text.trim_end().to_string();
    out.push('\n');
    out
}

fn non_empty<'a>(theme: &'a Theme, name: &str) -> Option<&'a Section> {
    theme.section(name).filter(|section| !section.is_empty())
}

fn render_hyprland(theme: &Theme) -> Option<String> {
    let hypr = non_empty(theme, "hyprland")?;
    let active = hypr.text_or("activeBorder", "rgba(ffffffff)");
    let inactive = hypr.text_or("inactiveBorder", "rgba(000000ff)");
    Some(format!(
        "# Hyprland border colors for {}\n\
         general {{\n  col.active_border = {active}\n  col.inactive_border = {inactive}\n}}\n",
        theme.display_name
    ))
}

fn render_waybar(theme: &Theme) -> Option<String> {
    let waybar = non_empty(theme, "waybar")?;
    let fg = waybar.text_or("foreground", "#ffffff");
    let bg = waybar.text_or("background", "#000000");
    Some(format!(
        "/* Waybar colors for {} */\n\
         @define-color foreground {fg};\n\
         @define-color background {bg};\n",
        theme.display_name
    ))
}

fn render_alacritty(theme: &Theme) -> Option<String> {
    let alacritty = non_empty(theme, "alacritty")?;
    let mut pieces = vec![format!("# Alacritty colors for {}", theme.display_name)];
    for name in ["primary", "normal", "bright"] {
        let Some(colors) = alacritty.section(name) else {
            continue;
        };
        let mut lines = vec![format!("[colors.{name}]")];
        for (key, value) in colors.iter() {
            if let Some(value) = value_text(value) {
                lines.push(format!("{key} = \"{value}\""));
            }
        }
        pieces.push(lines.join("\n"));
    }

    Some(pieces.join("\n\n"))
}

const KITTY_KEYS: [&str; 13] = [
    "foreground",
    "background",
    "selection_foreground",
    "selection_background",
    "cursor",
    "cursor_text_color",
    "url_color",
    "active_border_color",
    "inactive_border_color",
    "active_tab_foreground",
    "active_tab_background",
    "inactive_tab_foreground",
    "inactive_tab_background",
];

fn render_kitty(theme: &Theme) -> Option<String> {
    let kitty = non_empty(theme, "kitty")?;
    let mut lines = vec![
        format!("# Kitty colors for {}", theme.display_name),
        String::new(),
        "# Basic colors".to_string(),
    ];
    for key in KITTY_KEYS {
        if let Some(value) = kitty.text(key) {
            lines.push(format!("{} {value}", key.replace('_', " ")));
        }
    }

    lines.push(String::new());
    lines.push("# The basic 16 colors".to_string());
    for index in 0..18 {
        let key = format!("color{index}");
        if let Some(value) = kitty.text(&key) {
            lines.push(format!("{key} {value}"));
        }
    }

    Some(lines.join("\n"))
}

fn render_ghostty(theme: &Theme) -> Option<String> {
    let ghostty = non_empty(theme, "ghostty")?;
    if ghostty.len() == 1 {
        if let Some(name) = ghostty.text("theme") {
            return Some(format!("theme = {name}\n"));
        }
    }

    let mut lines = Vec::new();
    for (key, value) in ghostty.iter() {
        match value {
            Value::Array(entries) if key == "palette" => {
                for entry in entries.iter().filter_map(value_text) {
                    lines.push(format!("palette = {entry}"));
                }
            }
            other => {
                if let Some(text) = value_text(other) {
                    lines.push(format!("{key} = {text}"));
                }
            }
        }
    }

    Some(lines.join("\n"))
}

fn render_walker(theme: &Theme) -> Option<String> {
    let walker = non_empty(theme, "walker")?;
    let selected = walker.text_or("selectedText", "#ffffff");
    let text = walker.text_or("text", "#ffffff");
    let base = walker.text_or("base", "#000000");
    let border = walker.text_or("border", "#ffffff");
    Some(format!(
        "/* Walker launcher colors for {} */\n\
         @define-color selected-text {selected};\n\
         @define-color text {text};\n\
         @define-color base {base};\n\
         @define-color border {border};\n\
         @define-color foreground {text};\n\
         @define-color background {base};\n",
        theme.display_name
    ))
}

fn render_mako(theme: &Theme) -> Option<String> {
    let mako = non_empty(theme, "mako")?;
    let text = mako.text_or("textColor", "#ffffff");
    let border = mako.text_or("borderColor", "#ffffff");
    let background = mako.text_or("backgroundColor", "#000000");
    let progress = mako.text_or("progressColor", &text);
    Some(format!(
        "# Mako notification config for {}\n\
         include=$HOME/.config/mako/core.ini\n\n\
         text-color={text}\n\
         border-color={border}\n\
         background-color={background}\n\
         progress-color={progress}\n",
        theme.display_name
    ))
}

fn render_swayosd(theme: &Theme) -> Option<String> {
    let swayosd = non_empty(theme, "swayosd")?;
    let bg = swayosd.text_or("backgroundColor", "#000000");
    let border = swayosd.text_or("borderColor", "#ffffff");
    let text = swayosd.text_or("textColor", "#ffffff");
    Some(format!(
        "/* SwayOSD theme for {name} */\n\
         window {{\n  background-color: {bg};\n  border: 2px solid {border};\n  border-radius: 0;\n}}\n\n\
         label, image {{\n  color: {text};\n}}\n\n\
         progressbar {{\n  background-color: {bg};\n}}\n\n\
         trough {{\n  background-color: {border};\n}}\n\n\
         progress {{\n  background-color: {text};\n}}\n",
        name = theme.display_name
    ))
}

fn render_vscode(theme: &Theme) -> Option<String> {
    let name = theme.vscode_theme()?;
    serde_json::to_string_pretty(&json!({ "workbench.colorTheme": name })).ok()
}

fn render_chromium(theme: &Theme) -> Option<String> {
    theme.section("browser")?.text("themeColor")
}

fn render_neovim(theme: &Theme) -> Option<String> {
    non_empty(theme, "nvim")?;
    let colorscheme = theme
        .nvim_colorscheme()
        .unwrap_or_else(|| "tokyonight".to_string());
    Some(format!("return \"{colorscheme}\"\n"))
}

fn render_hyprlock(theme: &Theme) -> Option<String> {
    let hyprlock = non_empty(theme, "hyprlock")?;
    let fallback = theme
        .section("alacritty")
        .and_then(|alacritty| alacritty.section("primary"))
        .and_then(|primary| primary.text("background"))
        .unwrap_or_else(|| "#000000".to_string());

    let color = |key: &str| hex_to_rgb(&hyprlock.text_or(key, &fallback));
    let outer = color("outerColor")?;
    let inner = color("innerColor")?;
    let font = color("fontColor")?;
    let check = color("checkColor")?;
    let base = hex_to_rgb(&fallback)?;

    Some(
        [
            format!("# hyprlock colors for {}", theme.display_name),
            format!("$color = {}", rgba(base, 1.0)),
            format!("$inner_color = {}", rgba(inner, 0.8)),
            format!("$outer_color = {}", rgba(outer, 1.0)),
            format!("$font_color = {}", rgba(font, 1.0)),
            format!("$check_color = {}", rgba(check, 1.0)),
            String::new(),
        ]
        .join("\n"),
    )
}

fn rgba((r, g, b): (u8, u8, u8), alpha: f32) -> String {
    format!("rgba({r},{g},{b},{alpha:?})")
}

/// Parse `#rgb` or `#rrggbb` color.
pub fn hex_to_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let digits = color.trim().strip_prefix('#')?;
    let digits = match digits.len() {
        3 => digits.chars().flat_map(|ch| [ch, ch]).collect::<String>(),
        6 => digits.to_string(),
        _ => return None,
    };

    let channel = |at: usize| u8::from_str_radix(digits.get(at..at + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
