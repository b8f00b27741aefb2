// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External process plumbing.
//!
//! Reload hooks drive a handful of desktop tools through their command line
//! interfaces. Everything a hook needs to know about the surrounding process
//! environment is captured once in an [`Environment`], so hooks themselves
//! never read environment variables and can be exercised against a fake one.

use crate::config::Platform;

use std::{
    env,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::debug;

/// Environment variable forcing UI automation off when set to `1`.
pub const DISABLE_AUTOMATION_VAR: &str = "THEME_DISABLE_EDITOR_AUTOMATION";

/// Environment variable naming the running Hyprland instance.
pub const HYPRLAND_SIGNATURE_VAR: &str = "HYPRLAND_INSTANCE_SIGNATURE";

/// Snapshot of process environment that reload hooks depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Directories searched for executables, in order.
    pub path_dirs: Vec<PathBuf>,

    /// Signature of running Hyprland instance, if exported.
    pub hypr_signature: Option<String>,

    /// Per-user runtime directory.
    pub xdg_runtime_dir: Option<PathBuf>,

    /// Platform the binary is running on.
    pub host: Platform,

    /// Whether UI automation through `osascript` may run.
    pub ui_automation: bool,
}

impl Environment {
    /// Capture environment of current process.
    pub fn from_process() -> Self {
        Self {
            path_dirs: env::var_os("PATH")
                .map(|path| env::split_paths(&path).collect())
                .unwrap_or_default(),
            hypr_signature: env::var(HYPRLAND_SIGNATURE_VAR)
                .ok()
                .filter(|signature| !signature.is_empty()),
            xdg_runtime_dir: env::var_os("XDG_RUNTIME_DIR").map(PathBuf::from),
            host: Platform::host(),
            ui_automation: env::var(DISABLE_AUTOMATION_VAR).as_deref() != Ok("1"),
        }
    }

    /// Locate executable by name.
    ///
    /// Searches the path directories first, then falls back to any existing
    /// entry of `extra_paths`.
    pub fn find_binary(&self, name: &str, extra_paths: &[&str]) -> Option<PathBuf> {
        self.path_dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
            .or_else(|| {
                extra_paths
                    .iter()
                    .map(PathBuf::from)
                    .find(|candidate| candidate.exists())
            })
    }

    /// Check whether a process with exact name is running.
    pub fn process_running(&self, name: &str) -> bool {
        let pgrep = self
            .find_binary("pgrep", &["/usr/bin/pgrep"])
            .unwrap_or_else(|| PathBuf::from("pgrep"));
        syscall_non_interactive(pgrep, ["-x", name]).is_ok()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(windows)]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

/// Run command to completion, capturing its output.
///
/// # Errors
///
/// - Return [`SyscallError::Spawn`] if command cannot be started.
/// - Return [`SyscallError::Failed`] if command exits unsuccessfully.
pub fn syscall_non_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<String> {
    syscall_with_env(cmd, args, std::iter::empty::<(&str, &str)>())
}

/// Run command to completion with extra environment variables.
///
/// # Errors
///
/// - Same as [`syscall_non_interactive`].
pub fn syscall_with_env(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
    envs: impl IntoIterator<Item = (impl AsRef<OsStr>, impl AsRef<OsStr>)>,
) -> Result<String> {
    let command = cmd.as_ref().to_string_lossy().into_owned();
    debug!("run {command:?}");
    let output = Command::new(cmd.as_ref())
        .args(args)
        .envs(envs)
        .output()
        .map_err(|source| SyscallError::Spawn {
            source,
            command: command.clone(),
        })?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();

    if !output.status.success() {
        let message = chomp(if stderr.trim().is_empty() { stdout } else { stderr });
        return Err(SyscallError::Failed { command, message });
    }

    Ok(chomp(stdout))
}

// INVARIANT: Chomp trailing newlines.
fn chomp(message: String) -> String {
    message
        .strip_suffix("\r\n")
        .or(message.strip_suffix('\n'))
        .map(ToString::to_string)
        .unwrap_or(message)
}

/// External command error types.
#[derive(Debug, thiserror::Error)]
pub enum SyscallError {
    /// Command cannot be started.
    #[error("failed to run command {command:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        command: String,
    },

    /// Command exited unsuccessfully.
    #[error("command {command:?} failed: {message}")]
    Failed { command: String, message: String },
}

/// Friendly result alias :3
pub type Result<T, E = SyscallError> = std::result::Result<T, E>;
