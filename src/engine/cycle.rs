// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Theme cycling.
//!
//! Cycling walks a ring of theme slugs. The ring is the configured order
//! restricted to themes the repository actually knows, or every theme in
//! repository order when nothing configured survives that filter. Stepping
//! off either end wraps around.

use crate::{
    state::StateStore,
    theme::{Theme, ThemeRepository},
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use tracing::debug;

/// Direction to step through a ring.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Next,
    Prev,
}

impl Direction {
    /// Step index one position around a ring of given length.
    ///
    /// Ring length must be non-zero.
    pub fn step(self, index: usize, len: usize) -> usize {
        match self {
            Self::Next => (index + 1) % len,
            Self::Prev => (index + len - 1) % len,
        }
    }
}

impl FromStr for Direction {
    type Err = DirectionError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        match data.to_lowercase().as_str() {
            "next" => Ok(Self::Next),
            "prev" | "previous" => Ok(Self::Prev),
            _ => Err(DirectionError(data.to_string())),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Next => fmt.write_str("next"),
            Self::Prev => fmt.write_str("prev"),
        }
    }
}

/// Cycle through themes in configured order.
#[derive(Debug, Clone, Default)]
pub struct CycleEngine {
    configured: Vec<String>,
}

impl CycleEngine {
    /// Construct new cycle engine over configured order.
    pub fn new(configured: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            configured: configured.into_iter().map(Into::into).collect(),
        }
    }

    /// Compute ring of slugs to cycle through.
    ///
    /// Configured entries are resolved through the repository, so names and
    /// display names work too. Unknown entries and repeats are dropped.
    pub fn order(&self, repository: &ThemeRepository) -> Vec<String> {
        let mut order: Vec<String> = Vec::new();
        for entry in &self.configured {
            match repository.get(entry) {
                Some(theme) if !order.contains(&theme.slug) => order.push(theme.slug.clone()),
                Some(_) => continue,
                None => debug!("configured theme {entry:?} not in repository"),
            }
        }

        if order.is_empty() {
            order = repository.iter().map(|theme| theme.slug.clone()).collect();
        }

        order
    }

    /// Determine theme one step away from current theme.
    ///
    /// An absent or unknown current theme counts as the first theme of the
    /// ring. Returns `None` only when there are no themes at all.
    pub fn step<'repo>(
        &self,
        repository: &'repo ThemeRepository,
        current: Option<&str>,
        direction: Direction,
    ) -> Option<&'repo Theme> {
        let order = self.order(repository);
        if order.is_empty() {
            return None;
        }

        let index = current
            .and_then(|current| {
                let current = current.to_lowercase();
                let slug = repository
                    .get(&current)
                    .map(|theme| theme.slug.clone())
                    .unwrap_or(current);
                order.iter().position(|entry| *entry == slug)
            })
            .unwrap_or(0);

        let next = direction.step(index, order.len());
        debug!("cycle {direction} from {} to {}", order[index], order[next]);
        repository.get(&order[next])
    }

    /// Determine theme one step away from persisted current theme.
    pub fn cycle<'repo>(
        &self,
        repository: &'repo ThemeRepository,
        state: &StateStore,
        direction: Direction,
    ) -> Option<&'repo Theme> {
        self.step(repository, state.current_theme().as_deref(), direction)
    }
}

/// Invalid cycle direction.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid direction {0:?}, expected \"next\" or \"prev\"")]
pub struct DirectionError(String);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use simple_test_case::test_case;

    fn repository() -> ThemeRepository {
        ThemeRepository::from_document(&json!([
            {"name": "Catppuccin"},
            {"name": "Nord"},
            {"name": "Rose Pine"},
            {"name": "Tokyo Night"},
        ]))
    }

    fn slug<'a>(theme: Option<&'a Theme>) -> Option<&'a str> {
        theme.map(|theme| theme.slug.as_str())
    }

    #[test_case(Direction::Next, 0, 4, 1; "next inside")]
    #[test_case(Direction::Next, 3, 4, 0; "next wraps at end")]
    #[test_case(Direction::Prev, 2, 4, 1; "prev inside")]
    #[test_case(Direction::Prev, 0, 4, 3; "prev wraps at start")]
    #[test_case(Direction::Next, 0, 1, 0; "single next")]
    #[test_case(Direction::Prev, 0, 1, 0; "single prev")]
    #[test]
    fn step_wraps_both_ways(direction: Direction, index: usize, len: usize, expect: usize) {
        pretty_assertions::assert_eq!(direction.step(index, len), expect);
    }

    #[test]
    fn configured_order_filters_and_normalizes() {
        let repository = repository();
        let engine = CycleEngine::new(["Tokyo Night", "missing", "nord", "tokyo-night"]);
        assert_eq!(engine.order(&repository), vec!["tokyo-night", "nord"]);
    }

    #[test]
    fn fall_back_to_repository_order() {
        let repository = repository();
        let engine = CycleEngine::new(["missing"]);
        assert_eq!(
            engine.order(&repository),
            vec!["catppuccin", "nord", "rose-pine", "tokyo-night"]
        );
    }

    #[test]
    fn nothing_to_cycle() {
        let engine = CycleEngine::new(["nord"]);
        assert_eq!(
            engine.step(&ThemeRepository::default(), None, Direction::Next),
            None
        );
    }

    #[test]
    fn unknown_current_resets_to_first() {
        let repository = repository();
        let engine = CycleEngine::default();

        let next = engine.step(&repository, Some("does-not-exist"), Direction::Next);
        assert_eq!(slug(next), Some("nord"));

        let prev = engine.step(&repository, None, Direction::Prev);
        assert_eq!(slug(prev), Some("tokyo-night"));
    }

    #[test]
    fn next_n_times_returns_to_start() {
        let repository = repository();
        let engine = CycleEngine::new(["rose-pine", "catppuccin", "tokyo-night"]);
        let start = "catppuccin".to_string();

        let mut current = start.clone();
        for _ in 0..3 {
            current = engine
                .step(&repository, Some(current.as_str()), Direction::Next)
                .unwrap()
                .slug
                .clone();
        }

        assert_eq!(current, start);
    }

    #[test]
    fn prev_inverts_next() {
        let repository = repository();
        let engine = CycleEngine::default();

        for theme in repository.iter() {
            let forward = engine
                .step(&repository, Some(theme.slug.as_str()), Direction::Next)
                .unwrap();
            let back = engine.step(&repository, Some(forward.slug.as_str()), Direction::Prev);
            assert_eq!(slug(back), Some(theme.slug.as_str()));

            let backward = engine
                .step(&repository, Some(theme.slug.as_str()), Direction::Prev)
                .unwrap();
            let again = engine.step(&repository, Some(backward.slug.as_str()), Direction::Next);
            assert_eq!(slug(again), Some(theme.slug.as_str()));
        }
    }

    #[test]
    fn current_matched_case_insensitively() {
        let repository = repository();
        let engine = CycleEngine::default();
        let next = engine.step(&repository, Some("ROSE-PINE"), Direction::Next);
        assert_eq!(slug(next), Some("tokyo-night"));
    }

    #[test]
    fn cycle_reads_persisted_state() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let state = StateStore::new(root.path().join("theme"), root.path().join("bg"));
        state.set_current_theme("nord")?;

        let repository = repository();
        let engine = CycleEngine::default();
        let next = engine.cycle(&repository, &state, Direction::Next);
        assert_eq!(slug(next), Some("rose-pine"));

        Ok(())
    }

    #[test_case("next", Direction::Next; "next")]
    #[test_case("PREV", Direction::Prev; "prev upper")]
    #[test_case("previous", Direction::Prev; "previous")]
    #[test]
    fn parse_direction(raw: &str, expect: Direction) {
        pretty_assertions::assert_eq!(raw.parse::<Direction>().unwrap(), expect);
    }

    #[test]
    fn reject_bad_direction() {
        assert!("sideways".parse::<Direction>().is_err());
    }
}
