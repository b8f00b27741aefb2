// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Health checks.
//!
//! Each check either passes or fails with a severity. Failed errors mean
//! themectl cannot work at all, failed warnings mean something will look off
//! but apply and cycle still function.

use crate::{
    hooks::error_chain,
    path::Layout,
    state::StateStore,
    theme::ThemeRepository,
};

use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::{debug, instrument};

/// How bad a failed check is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Error => fmt.write_str("error"),
            Self::Warning => fmt.write_str("warning"),
        }
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: &'static str,
    pub severity: Severity,
    pub passed: bool,
    pub detail: String,
}

impl Check {
    fn new(
        name: &'static str,
        severity: Severity,
        passed: bool,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            name,
            severity,
            passed,
            detail: detail.into(),
        }
    }
}

/// Outcome of every check, in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<Check>,
}

impl DoctorReport {
    /// No error level check failed.
    pub fn passed(&self) -> bool {
        self.failures().all(|check| check.severity != Severity::Error)
    }

    /// Every failed check.
    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|check| !check.passed)
    }

    fn push(&mut self, check: Check) {
        debug!("check {} passed: {}", check.name, check.passed);
        self.checks.push(check);
    }
}

/// Run every health check against layout and state.
#[instrument(skip(layout, state), level = "debug")]
pub fn diagnose(layout: &Layout, state: &StateStore) -> DoctorReport {
    let mut report = DoctorReport::default();

    let metadata_exists = layout.metadata.is_file();
    report.push(Check::new(
        "metadata",
        Severity::Error,
        metadata_exists,
        format!("metadata file at {:?}", layout.metadata.display()),
    ));

    let repository = match ThemeRepository::try_load(&layout.metadata) {
        Ok(repository) => {
            if metadata_exists {
                report.push(Check::new(
                    "metadata parses",
                    Severity::Error,
                    true,
                    "metadata is valid JSON",
                ));
            }
            repository
        }
        Err(error) => {
            report.push(Check::new(
                "metadata parses",
                Severity::Error,
                false,
                error_chain(&error),
            ));
            ThemeRepository::default()
        }
    };

    report.push(Check::new(
        "themes",
        Severity::Error,
        !repository.is_empty(),
        match repository.len() {
            0 => "no themes available, fix metadata then run sync-assets".to_string(),
            count => format!("{count} theme(s) available"),
        },
    ));

    let unsynced: Vec<&str> = repository
        .iter()
        .filter(|theme| !layout.theme_dir(&theme.slug).is_dir())
        .map(|theme| theme.slug.as_str())
        .collect();
    report.push(Check::new(
        "assets",
        Severity::Warning,
        unsynced.is_empty(),
        match unsynced.is_empty() {
            true => "every theme has synced assets".to_string(),
            false => format!("not synced: {}, run sync-assets", unsynced.join(", ")),
        },
    ));

    let (known, detail) = match state.current_theme() {
        None => (true, "no theme applied yet".to_string()),
        Some(current) if repository.get(&current).is_some() => {
            (true, format!("current theme {current}"))
        }
        Some(current) => (false, format!("current theme {current:?} is not in metadata")),
    };
    report.push(Check::new("current theme", Severity::Warning, known, detail));

    let link = layout.current_theme_link();
    let (resolves, detail) = match (link.symlink_metadata().is_ok(), link.is_dir()) {
        (_, true) => (true, format!("{:?} resolves", link.display())),
        (true, false) => (false, format!("{:?} is dangling", link.display())),
        (false, false) => (false, format!("{:?} does not exist", link.display())),
    };
    report.push(Check::new("current link", Severity::Warning, resolves, detail));

    report
}
