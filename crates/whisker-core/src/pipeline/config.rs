use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How the template evaluator renders its placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Markup {
    /// Inline-styled `<span>` placeholders for HTML preview panes.
    #[default]
    Html,
    /// Bracketed plain-text placeholders for terminals and logs.
    Plain,
}

impl Markup {
    /// Parse a markup name (`"html"` or `"plain"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "html" => Some(Markup::Html),
            "plain" => Some(Markup::Plain),
            _ => None,
        }
    }
}

/// Configuration for template rendering.
///
/// Every field has a default, so a config file only needs to mention the
/// settings it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub markup: Markup,
    /// Maximum number of characters of script source echoed by the
    /// placeholder shown when no script runtime is available.
    pub script_preview_chars: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            markup: Markup::Html,
            script_preview_chars: 50,
        }
    }
}

impl RenderConfig {
    /// Default config with plain-text placeholders.
    pub fn plain() -> Self {
        Self {
            markup: Markup::Plain,
            ..Self::default()
        }
    }

    /// Load a config from JSON, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}
