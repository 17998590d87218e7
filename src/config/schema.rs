//! Configuration schema types
//!
//! Serde types for the game configuration file and the frozen
//! [`GameConfig`] handed to the game engine.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use super::defaults;

/// Newtype for theme identifiers (e.g. `"worried"`).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeId(pub String);

impl ThemeId {
    /// Creates a new `ThemeId` from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThemeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for context identifiers (e.g. `"dropped-ice-cream"`).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub String);

impl ContextId {
    /// Creates a new `ContextId` from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An emotion card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeEntry {
    /// Stable identifier, compared against the outsider's guess
    pub id: ThemeId,
    /// Human-readable name; falls back to the id when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Opaque reference for the presentation layer (an image path)
    #[serde(default)]
    pub display_ref: String,
}

impl ThemeEntry {
    /// Creates an entry with a label and display reference.
    #[must_use]
    pub fn new(id: &str, label: &str, display_ref: &str) -> Self {
        Self {
            id: ThemeId::new(id),
            label: Some(label.to_string()),
            display_ref: display_ref.to_string(),
        }
    }

    /// Returns the label, or the id when no label is configured.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }
}

/// A situation card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    /// Stable identifier, unique within the catalog
    pub id: ContextId,
    /// Human-readable description; falls back to the id when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Opaque reference for the presentation layer (an image path)
    #[serde(default)]
    pub display_ref: String,
}

impl ContextEntry {
    /// Creates an entry with a label and display reference.
    #[must_use]
    pub fn new(id: &str, label: &str, display_ref: &str) -> Self {
        Self {
            id: ContextId::new(id),
            label: Some(label.to_string()),
            display_ref: display_ref.to_string(),
        }
    }

    /// Returns the label, or the id when no label is configured.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Immutable card catalog shared by every round of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Emotions; one is drawn per round
    pub themes: Vec<ThemeEntry>,
    /// Situations; one distinct entry per player per round
    pub contexts: Vec<ContextEntry>,
    /// Suggested questions for the discussion phase
    #[serde(default)]
    pub prompts: Vec<String>,
    /// Sentence starter for the self-review phase
    #[serde(default)]
    pub review_prompt: Option<String>,
}

impl Catalog {
    /// Creates a catalog with no prompts.
    #[must_use]
    pub const fn new(themes: Vec<ThemeEntry>, contexts: Vec<ContextEntry>) -> Self {
        Self {
            themes,
            contexts,
            prompts: Vec::new(),
            review_prompt: None,
        }
    }

    /// Looks up a theme by id.
    #[must_use]
    pub fn theme(&self, id: &ThemeId) -> Option<&ThemeEntry> {
        self.themes.iter().find(|t| &t.id == id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        defaults::builtin_catalog()
    }
}

// ============================================================================
// File Form
// ============================================================================

/// Catalog section of the configuration file. Missing keys keep the
/// built-in value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    /// Replacement theme list
    pub themes: Option<Vec<ThemeEntry>>,
    /// Replacement context list
    pub contexts: Option<Vec<ContextEntry>>,
    /// Replacement discussion prompts
    pub prompts: Option<Vec<String>>,
    /// Replacement self-review prompt
    pub review_prompt: Option<String>,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfigFile {
    /// Discussion length, e.g. `"7m"` or `"90s"`
    #[serde(default, deserialize_with = "deserialize_duration")]
    pub discussion: Option<Duration>,
    /// Card catalog overrides
    #[serde(default)]
    pub catalog: Option<CatalogFile>,
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom))
        .transpose()
}

// ============================================================================
// Frozen Configuration
// ============================================================================

/// Resolved configuration for a game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Length of the open discussion period
    pub discussion: Duration,
    /// Card catalog
    pub catalog: Arc<Catalog>,
}

impl GameConfig {
    /// Discussion length in whole seconds, as driven by the countdown.
    #[must_use]
    pub const fn discussion_seconds(&self) -> u64 {
        self.discussion.as_secs()
    }

    /// Merges a parsed file over the built-in defaults.
    #[must_use]
    pub fn from_file(file: GameConfigFile) -> Self {
        let mut catalog = defaults::builtin_catalog();
        if let Some(overrides) = file.catalog {
            if let Some(themes) = overrides.themes {
                catalog.themes = themes;
            }
            if let Some(contexts) = overrides.contexts {
                catalog.contexts = contexts;
            }
            if let Some(prompts) = overrides.prompts {
                catalog.prompts = prompts;
            }
            if overrides.review_prompt.is_some() {
                catalog.review_prompt = overrides.review_prompt;
            }
        }
        Self {
            discussion: file.discussion.unwrap_or(defaults::DISCUSSION),
            catalog: Arc::new(catalog),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            discussion: defaults::DISCUSSION,
            catalog: Arc::new(defaults::builtin_catalog()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_to_id() {
        let entry: ThemeEntry = serde_yaml::from_str("id: worried").unwrap();
        assert_eq!(entry.label(), "worried");
        assert_eq!(entry.display_ref, "");
    }

    #[test]
    fn file_parses_duration() {
        let file: GameConfigFile = serde_yaml::from_str("discussion: 90s").unwrap();
        assert_eq!(file.discussion, Some(Duration::from_secs(90)));
    }

    #[test]
    fn file_rejects_bad_duration() {
        let result: Result<GameConfigFile, _> = serde_yaml::from_str("discussion: soon");
        assert!(result.is_err());
    }

    #[test]
    fn file_rejects_unknown_keys() {
        let result: Result<GameConfigFile, _> = serde_yaml::from_str("rounds: 3");
        assert!(result.is_err());
    }

    #[test]
    fn partial_catalog_keeps_defaults() {
        let yaml = r"
catalog:
  themes:
    - id: calm
    - id: proud
";
        let file: GameConfigFile = serde_yaml::from_str(yaml).unwrap();
        let config = GameConfig::from_file(file);

        assert_eq!(config.catalog.themes.len(), 2);
        assert_eq!(
            config.catalog.contexts.len(),
            defaults::builtin_catalog().contexts.len()
        );
        assert_eq!(config.discussion, defaults::DISCUSSION);
    }

    #[test]
    fn catalog_theme_lookup() {
        let catalog = Catalog::default();
        assert!(catalog.theme(&ThemeId::new("worried")).is_some());
        assert!(catalog.theme(&ThemeId::new("bored")).is_none());
    }
}
