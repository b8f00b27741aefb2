// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Theme metadata loading.
//!
//! A __theme__ is a named bundle of per-integration attribute sections, e.g.,
//! the border colors Hyprland should use, the palette Kitty should use, the
//! colorscheme Neovim should load, plus an ordered list of wallpapers.
//!
//! # Metadata Layout
//!
//! Theme metadata is a JSON document in one of three shapes:
//!
//! 1. `{"themes": [ {...}, {...} ]}`
//! 2. `{"anything": {...}, "else": {...}}`, a mapping of arbitrary keys to
//!    theme objects.
//! 3. `[ {...}, {...} ]`, a bare list.
//!
//! Each theme object needs a `displayName` or `name`. An optional `slug`
//! field names the theme's unique key; otherwise the slug is derived from the
//! name. Any other field holding a JSON object is an integration section.
//!
//! ```json
//! {
//!   "name": "Tokyo Night",
//!   "slug": "tokyo-night",
//!   "wallpapers": ["~/Pictures/tokyo.png"],
//!   "kitty": { "foreground": "#c0caf5", "background": "#1a1b26" },
//!   "nvim": { "colorscheme": "tokyonight" }
//! }
//! ```
//!
//! Loading is lenient. Malformed entries are skipped one at a time, and a
//! missing metadata file is simply an empty repository.

use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs::read_to_string,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, instrument, warn};

/// Ordered attribute mapping for one integration.
///
/// Schema is up to each integration, so values are kept as raw JSON in the
/// order they appeared in the metadata document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Section(Map<String, Value>);

impl Section {
    /// Construct new section from JSON object.
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Get raw value of key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get value of key rendered as text.
    ///
    /// Strings are returned verbatim. Other scalars use their JSON text.
    /// Returns `None` for absent keys, nulls, and empty strings.
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(value_text)
    }

    /// Get value of key rendered as text, or a default when absent.
    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or_else(|| default.to_string())
    }

    /// Get nested section stored under key.
    pub fn section(&self, key: &str) -> Option<Section> {
        match self.0.get(key) {
            Some(Value::Object(map)) => Some(Section(map.clone())),
            _ => None,
        }
    }

    /// Check if key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Render scalar JSON value as plain text.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// A single theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Raw label as written in metadata.
    pub name: String,

    /// Unique lowercase key.
    pub slug: String,

    /// Human readable label.
    pub display_name: String,

    /// Optional free-form tag, e.g., "light" or "dark".
    pub kind: Option<String>,

    /// Wallpapers in declaration order.
    pub wallpapers: Vec<PathBuf>,

    sections: HashMap<String, Section>,
}

impl Theme {
    /// Construct theme from its parts.
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            display_name: display_name.into(),
            kind: None,
            wallpapers: Vec::new(),
            sections: HashMap::new(),
        }
    }

    /// Attach integration section.
    pub fn with_section(mut self, integration: impl Into<String>, section: Section) -> Self {
        self.sections.insert(integration.into(), section);
        self
    }

    /// Attach wallpaper.
    pub fn with_wallpaper(mut self, path: impl Into<PathBuf>) -> Self {
        self.wallpapers.push(path.into());
        self
    }

    /// Get attribute section of an integration, if any.
    pub fn section(&self, integration: &str) -> Option<&Section> {
        self.sections.get(integration)
    }

    /// Colorscheme Neovim should load.
    pub fn nvim_colorscheme(&self) -> Option<String> {
        self.section("nvim").and_then(|s| s.text("colorscheme"))
    }

    /// Color theme VSCode should use.
    pub fn vscode_theme(&self) -> Option<String> {
        self.section("vscode").and_then(|s| s.text("theme"))
    }

    /// Extension providing the VSCode color theme.
    pub fn vscode_extension(&self) -> Option<String> {
        self.section("vscode").and_then(|s| s.text("extension"))
    }

    /// Color theme Cursor should use.
    pub fn cursor_theme(&self) -> Option<String> {
        self.section("cursor").and_then(|s| s.text("theme"))
    }

    /// Check if a query names this theme by slug, raw name, or display name.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.slug == query
            || self.name.to_lowercase() == query
            || self.display_name.to_lowercase() == query
    }

    fn from_entry(entry: &Map<String, Value>) -> Option<Self> {
        let display_name = entry
            .get("displayName")
            .and_then(value_text)
            .or_else(|| entry.get("name").and_then(value_text))
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())?;
        let name = entry
            .get("name")
            .and_then(value_text)
            .unwrap_or_else(|| display_name.clone());
        let slug = match entry.get("slug").and_then(value_text) {
            Some(slug) => slug.to_lowercase(),
            None => slugify(&name),
        };
        if !is_valid_slug(&slug) {
            warn!("skip theme {display_name:?} with unusable slug {slug:?}");
            return None;
        }

        let mut wallpapers = Vec::new();
        if let Some(Value::String(single)) = entry.get("wallpaper") {
            wallpapers.push(expand_tilde(single));
        }
        if let Some(Value::Array(many)) = entry.get("wallpapers") {
            for wallpaper in many {
                match wallpaper {
                    Value::String(path) => wallpapers.push(expand_tilde(path)),
                    other => debug!("skip malformed wallpaper entry {other} for {display_name}"),
                }
            }
        }

        let sections = entry
            .iter()
            .filter_map(|(key, value)| match value {
                Value::Object(map) => Some((key.clone(), Section(map.clone()))),
                _ => None,
            })
            .collect();

        Some(Self {
            kind: entry.get("kind").and_then(value_text),
            name,
            slug,
            display_name,
            wallpapers,
            sections,
        })
    }
}

/// Derive slug from a theme name.
pub fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// Check that slug names exactly one plain directory entry.
///
/// Slugs become directory names under the themes root, so anything empty or
/// containing a separator, `.`, or `..` is rejected.
pub fn is_valid_slug(slug: &str) -> bool {
    let mut components = Path::new(slug).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == slug
    )
}

fn expand_tilde(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Indexed collection of themes.
///
/// # Invariants
///
/// - Iteration order is themes sorted by lowercase display name.
/// - Slugs are unique.
/// - Lookup is case-insensitive over slug, raw name, and display name.
#[derive(Debug, Default, Clone)]
pub struct ThemeRepository {
    themes: Vec<Theme>,
    index: HashMap<String, usize>,
}

impl ThemeRepository {
    /// Construct repository from a list of themes.
    ///
    /// Later themes reusing an already registered slug are dropped.
    pub fn new(themes: impl IntoIterator<Item = Theme>) -> Self {
        let mut unique: Vec<Theme> = Vec::new();
        for theme in themes {
            if unique.iter().any(|known| known.slug == theme.slug) {
                warn!(
                    "duplicate theme slug {:?} for {:?}, keeping first definition",
                    theme.slug, theme.display_name
                );
                continue;
            }
            unique.push(theme);
        }
        unique.sort_by_key(|theme| theme.display_name.to_lowercase());

        // INVARIANT: Slugs first, then raw names, then display names.
        //   - Colliding keys resolve to whichever registration came last.
        let mut index = HashMap::new();
        for (position, theme) in unique.iter().enumerate() {
            index.insert(theme.slug.clone(), position);
        }
        for (position, theme) in unique.iter().enumerate() {
            index.insert(theme.name.to_lowercase(), position);
        }
        for (position, theme) in unique.iter().enumerate() {
            index.insert(theme.display_name.to_lowercase(), position);
        }

        Self {
            themes: unique,
            index,
        }
    }

    /// Load theme metadata leniently.
    ///
    /// Any failure to read or parse the metadata degrades to an empty
    /// repository, logged as a warning.
    #[instrument(skip(path), level = "debug")]
    pub fn load(path: impl AsRef<Path>) -> Self {
        match Self::try_load(path.as_ref()) {
            Ok(repository) => repository,
            Err(error) => {
                warn!("{error}, treating as empty theme list");
                Self::default()
            }
        }
    }

    /// Load theme metadata strictly.
    ///
    /// A missing file is still an empty repository.
    ///
    /// # Errors
    ///
    /// - Return [`ThemeError::Read`] if metadata cannot be read.
    /// - Return [`ThemeError::Parse`] if metadata is not valid JSON.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no theme metadata at {:?}", path.display());
            return Ok(Self::default());
        }

        let content = read_to_string(path).map_err(|source| ThemeError::Read {
            source,
            path: path.to_path_buf(),
        })?;
        let document: Value =
            serde_json::from_str(&content).map_err(|source| ThemeError::Parse {
                source,
                path: path.to_path_buf(),
            })?;

        Ok(Self::from_document(&document))
    }

    /// Build repository from already parsed metadata document.
    pub fn from_document(document: &Value) -> Self {
        let entries: Vec<&Value> = match document {
            Value::Object(map) => match map.get("themes") {
                Some(Value::Array(items)) => items.iter().collect(),
                Some(Value::Object(items)) => items.values().collect(),
                Some(_) => Vec::new(),
                None => map.values().collect(),
            },
            Value::Array(items) => items.iter().collect(),
            _ => Vec::new(),
        };

        Self::new(entries.into_iter().filter_map(|entry| match entry {
            Value::Object(map) => Theme::from_entry(map),
            _ => None,
        }))
    }

    /// Lookup theme by slug, raw name, or display name, ignoring case.
    pub fn get(&self, query: &str) -> Option<&Theme> {
        self.index
            .get(&query.to_lowercase())
            .map(|position| &self.themes[*position])
    }

    /// Iterate themes in display name order.
    pub fn iter(&self) -> impl Iterator<Item = &Theme> {
        self.themes.iter()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// Theme metadata error types.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// Metadata file exists but cannot be read.
    #[error("failed to read theme metadata at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Metadata file is not valid JSON.
    #[error("failed to parse theme metadata at {:?}", path.display())]
    Parse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ThemeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use simple_test_case::test_case;

    fn slugs(repository: &ThemeRepository) -> Vec<&str> {
        repository.iter().map(|theme| theme.slug.as_str()).collect()
    }

    #[test_case(json!({"themes": [{"name": "Nord"}, {"name": "Ayu"}]}); "themes key")]
    #[test_case(json!({"a": {"name": "Nord"}, "b": {"name": "Ayu"}}); "mapping")]
    #[test_case(json!([{"name": "Nord"}, {"name": "Ayu"}]); "bare list")]
    #[test]
    fn accept_all_document_shapes(document: Value) {
        let repository = ThemeRepository::from_document(&document);
        pretty_assertions::assert_eq!(slugs(&repository), vec!["ayu", "nord"]);
    }

    #[test]
    fn derive_slug_and_display_name() {
        let repository = ThemeRepository::from_document(&json!([
            {"name": "Tokyo Night"},
            {"name": "catppuccin", "displayName": "Catppuccin Mocha", "slug": "Catppuccin"},
            {"displayName": "Only Display"},
        ]));

        let tokyo = repository.get("tokyo-night").unwrap();
        assert_eq!(tokyo.name, "Tokyo Night");
        assert_eq!(tokyo.display_name, "Tokyo Night");

        let mocha = repository.get("catppuccin").unwrap();
        assert_eq!(mocha.name, "catppuccin");
        assert_eq!(mocha.display_name, "Catppuccin Mocha");

        let display = repository.get("only-display").unwrap();
        assert_eq!(display.name, "Only Display");
    }

    #[test]
    fn skip_entries_without_name() {
        let repository = ThemeRepository::from_document(&json!([
            {"slug": "nameless"},
            {"name": "   "},
            "not an object",
            42,
            {"name": "Kept"},
        ]));
        assert_eq!(slugs(&repository), vec!["kept"]);
    }

    #[test]
    fn lookup_resolves_every_key_to_same_theme() {
        let repository = ThemeRepository::from_document(&json!([
            {"name": "rosepine", "displayName": "Rose Pine", "slug": "rose-pine"},
        ]));

        let by_slug = repository.get("ROSE-PINE").unwrap();
        let by_name = repository.get("RosePine").unwrap();
        let by_display = repository.get("rose pine").unwrap();
        assert_eq!(by_slug, by_name);
        assert_eq!(by_name, by_display);
        assert!(repository.get("rose").is_none());
    }

    #[test]
    fn wallpapers_skip_malformed_entries() {
        let repository = ThemeRepository::from_document(&json!([{
            "name": "Nord",
            "wallpaper": "/walls/a.png",
            "wallpapers": ["/walls/b.png", 7, null, "/walls/c.png"],
        }]));

        let theme = repository.get("nord").unwrap();
        assert_eq!(
            theme.wallpapers,
            vec![
                PathBuf::from("/walls/a.png"),
                PathBuf::from("/walls/b.png"),
                PathBuf::from("/walls/c.png"),
            ]
        );
    }

    #[test]
    fn sections_keep_document_order() {
        let repository = ThemeRepository::from_document(&json!([{
            "name": "Nord",
            "kind": "dark",
            "ghostty": {"zeta": "1", "alpha": "2"},
            "vscode": {"theme": "Nord", "extension": "arcticicestudio.nord-visual-studio-code"},
        }]));

        let theme = repository.get("nord").unwrap();
        let ghostty = theme.section("ghostty").unwrap();
        let keys: Vec<&String> = ghostty.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(theme.kind.as_deref(), Some("dark"));
        assert_eq!(theme.vscode_theme().as_deref(), Some("Nord"));
        assert!(theme.section("name").is_none());
    }

    #[test]
    fn skip_themes_with_unusable_slugs() {
        let repository = ThemeRepository::from_document(&json!([
            {"displayName": "Zed", "name": "   "},
            {"name": "Up", "slug": ".."},
            {"name": "Here", "slug": "."},
            {"name": "Nested", "slug": "a/b"},
            {"name": "Rooted", "slug": "/etc"},
            {"name": "Kept", "slug": "kept"},
        ]));

        assert_eq!(slugs(&repository), vec!["kept"]);
    }

    #[test]
    fn valid_slug_is_single_plain_component() {
        assert!(is_valid_slug("tokyo-night"));
        assert!(is_valid_slug("v1.2"));
        for slug in ["", ".", "..", "a/b", "/abs", "trailing/", "./x"] {
            assert!(!is_valid_slug(slug), "{slug:?}");
        }
    }

    #[test]
    fn duplicate_slug_keeps_first_definition() {
        let repository = ThemeRepository::from_document(&json!([
            {"name": "First", "slug": "dup"},
            {"name": "Second", "slug": "dup"},
        ]));

        assert_eq!(repository.len(), 1);
        assert_eq!(repository.get("dup").unwrap().name, "First");
        assert!(repository.get("second").is_none());
    }

    #[test]
    fn missing_metadata_is_empty_repository() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let repository = ThemeRepository::try_load(dir.path().join("themes.json"))?;
        assert!(repository.is_empty());

        Ok(())
    }

    #[test]
    fn malformed_metadata_degrades_when_lenient() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("themes.json");
        std::fs::write(&path, "{ not json")?;

        assert!(matches!(
            ThemeRepository::try_load(&path),
            Err(ThemeError::Parse { .. })
        ));
        assert!(ThemeRepository::load(&path).is_empty());

        Ok(())
    }
}
