// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Theme switching for a desktop of many configurable programs.
//!
//! A single metadata document describes every theme, and for each theme how
//! a set of programs should be colored. Themectl renders those descriptions
//! into per-theme asset directories, flips a pair of runtime symlinks to make
//! one theme current, remembers that choice, and pokes running programs so
//! they notice.
//!
//! # Moving Parts
//!
//! - [`theme::ThemeRepository`] loads and indexes theme metadata.
//! - [`assets::AssetSynchronizer`] renders asset directories.
//! - [`engine::ApplyEngine`] activates a theme.
//! - [`engine::cycle::CycleEngine`] picks the next theme in a ring.
//! - [`state::StateStore`] persists the current theme and background.
//! - [`hooks::HookRunner`] reloads running programs afterwards.

pub mod assets;
pub mod config;
pub mod doctor;
pub mod engine;
pub mod hooks;
pub mod hotkeys;
pub mod path;
pub mod state;
pub mod syscall;
pub mod theme;
