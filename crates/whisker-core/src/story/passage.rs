use serde::{Deserialize, Serialize};

/// One node of the story graph: renderable template text plus outgoing
/// choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub title: String,
    /// Canonical template text.
    pub content: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Where this passage came from, when it was imported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<PassageOrigin>,
}

/// A labeled edge to another passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    /// Id of the target passage.
    pub target: String,
}

/// Graph canvas position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const DEFAULT_COORD: f64 = 100.0;
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: Self::DEFAULT_COORD,
            y: Self::DEFAULT_COORD,
        }
    }
}

/// Traceability record for an imported passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageOrigin {
    /// The passage id in the source document (Twine `pid`).
    pub foreign_id: String,
    pub original_name: String,
    /// Normalized source format name (e.g. `"harlowe"`).
    pub format: String,
}
