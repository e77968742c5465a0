//! Story-level metadata from the `<tw-storydata>` root.

use whisker_core::story::StoryFormat;

use crate::naming::generate_ifid;
use crate::record::StoryRecord;

/// Metadata read from the story root, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwineMetadata {
    pub title: String,
    pub author: String,
    pub ifid: String,
    pub format: StoryFormat,
    pub format_version: String,
    /// Raw `startnode` attribute: a passage pid, or sometimes a name.
    pub start_node: Option<String>,
}

/// Read metadata from the story root. Empty attributes count as absent.
pub fn extract_metadata<R: StoryRecord>(root: &R) -> TwineMetadata {
    let attr = |name: &str| root.attr(name).filter(|v| !v.is_empty());

    TwineMetadata {
        title: attr("name").unwrap_or("Untitled").to_string(),
        author: attr("creator").unwrap_or("Unknown").to_string(),
        ifid: attr("ifid").map_or_else(generate_ifid, str::to_string),
        format: detect_format(attr("format").unwrap_or("")),
        format_version: attr("format-version").unwrap_or("").to_string(),
        start_node: attr("startnode").map(str::to_string),
    }
}

/// Normalize a `format` attribute by case-insensitive substring match.
pub fn detect_format(format: &str) -> StoryFormat {
    let lower = format.to_lowercase();
    if lower.contains("harlowe") {
        StoryFormat::Harlowe
    } else if lower.contains("sugarcube") {
        StoryFormat::SugarCube
    } else if lower.contains("snowman") {
        StoryFormat::Snowman
    } else if lower.contains("chapbook") {
        StoryFormat::Chapbook
    } else {
        StoryFormat::Unknown
    }
}
