// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Hotkey manifest.
//!
//! The manifest is a JSON document mapping action names to key bindings.
//! Groups may nest to any depth:
//!
//! ```json
//! {
//!   "theme": { "next": "hyper+t", "prev": "hyper+shift+t" },
//!   "terminal": "hyper+enter"
//! }
//! ```
//!
//! Flattening joins nested keys with dots, so the above lists `theme.next`,
//! `theme.prev`, and `terminal`.

use serde_json::{Map, Value};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

/// Load hotkey manifest at path.
///
/// # Errors
///
/// - Return [`HotkeyError::Read`] if manifest cannot be read.
/// - Return [`HotkeyError::Parse`] if manifest is not valid JSON.
/// - Return [`HotkeyError::NotAMapping`] if top level is not an object.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Map<String, Value>> {
    let path = path.as_ref();
    let data = read_to_string(path).map_err(|source| HotkeyError::Read {
        source,
        path: path.to_path_buf(),
    })?;
    let value: Value = serde_json::from_str(&data).map_err(|source| HotkeyError::Parse {
        source,
        path: path.to_path_buf(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(HotkeyError::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}

/// Flatten nested bindings into `(dotted.action, binding)` rows.
///
/// Rows keep manifest order.
pub fn flatten_bindings(bindings: &Map<String, Value>) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    for (key, value) in bindings {
        flatten_into(key.clone(), value, &mut rows);
    }
    rows
}

fn flatten_into(prefix: String, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, sub) in map {
                flatten_into(format!("{prefix}.{key}"), sub, rows);
            }
        }
        Value::String(text) => rows.push((prefix, text.clone())),
        other => rows.push((prefix, other.to_string())),
    }
}

/// Hotkey manifest error types.
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    /// Manifest cannot be read.
    #[error("failed to read hotkey manifest at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Manifest is not valid JSON.
    #[error("failed to parse hotkey manifest at {:?}", path.display())]
    Parse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },

    /// Manifest top level is not an object.
    #[error("hotkey manifest at {:?} must be a mapping", path.display())]
    NotAMapping { path: PathBuf },
}

/// Friendly result alias :3
pub type Result<T, E = HotkeyError> = std::result::Result<T, E>;
