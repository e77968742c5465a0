use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::passage::Passage;
use super::value::{VariableDecl, Variables};

/// The canonical in-memory story project.
///
/// Built wholesale by an importer, then edited in place by the editor. The
/// template evaluator only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDocument {
    pub metadata: StoryMetadata,
    pub settings: StorySettings,
    /// Declared variables keyed by name (BTreeMap for stable order in
    /// serialized JSON).
    #[serde(default)]
    pub variables: BTreeMap<String, VariableDecl>,
    pub passages: Vec<Passage>,
}

/// Story-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryMetadata {
    pub title: String,
    pub author: String,
    /// Interactive Fiction IDentifier (UUID-shaped).
    pub ifid: String,
    #[serde(default)]
    pub description: String,
    /// RFC 3339 UTC timestamp.
    pub created: String,
    /// RFC 3339 UTC timestamp.
    pub modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_origin: Option<ForeignOrigin>,
}

/// The foreign format a story was imported from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignOrigin {
    pub format: StoryFormat,
    #[serde(default)]
    pub format_version: String,
}

/// Twine story formats recognized by the importer.
///
/// Only Harlowe and SugarCube markup is converted; Snowman and Chapbook are
/// recognized by name and imported without macro conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryFormat {
    Harlowe,
    SugarCube,
    Snowman,
    Chapbook,
    Unknown,
}

impl StoryFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            StoryFormat::Harlowe => "harlowe",
            StoryFormat::SugarCube => "sugarcube",
            StoryFormat::Snowman => "snowman",
            StoryFormat::Chapbook => "chapbook",
            StoryFormat::Unknown => "unknown",
        }
    }

    /// Whether passage markup in this format is rewritten on import.
    pub fn has_converter(self) -> bool {
        matches!(self, StoryFormat::Harlowe | StoryFormat::SugarCube)
    }
}

impl fmt::Display for StoryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project settings that belong to the story itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySettings {
    /// Id of the passage the story starts at.
    pub start_passage: String,
}

impl StoryDocument {
    pub fn passage(&self, id: &str) -> Option<&Passage> {
        self.passages.iter().find(|p| p.id == id)
    }

    pub fn start_passage(&self) -> Option<&Passage> {
        self.passage(&self.settings.start_passage)
    }

    /// Environment seeded with every declared variable's initial value.
    pub fn initial_values(&self) -> Variables {
        self.variables
            .iter()
            .map(|(name, decl)| (name.clone(), decl.initial.clone()))
            .collect()
    }

    /// Passage ids shared by more than one passage, in first-seen order.
    ///
    /// Importers derive ids from display names and do not deduplicate them,
    /// so two differently titled passages can collide.
    pub fn duplicate_passage_ids(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for passage in &self.passages {
            *counts.entry(passage.id.as_str()).or_default() += 1;
        }
        let mut dups = Vec::new();
        for passage in &self.passages {
            let id = passage.id.as_str();
            if counts[id] > 1 && !dups.contains(&id) {
                dups.push(id);
            }
        }
        dups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{Passage, Position, Value};

    fn passage(id: &str, title: &str) -> Passage {
        Passage {
            id: id.to_string(),
            title: title.to_string(),
            content: String::new(),
            choices: Vec::new(),
            position: Position::default(),
            tags: Vec::new(),
            origin: None,
        }
    }

    fn document(passages: Vec<Passage>) -> StoryDocument {
        StoryDocument {
            metadata: StoryMetadata {
                title: "T".into(),
                author: "A".into(),
                ifid: "X".into(),
                description: String::new(),
                created: String::new(),
                modified: String::new(),
                foreign_origin: Some(ForeignOrigin {
                    format: StoryFormat::SugarCube,
                    format_version: "2.36.1".into(),
                }),
            },
            settings: StorySettings {
                start_passage: "start".into(),
            },
            variables: BTreeMap::new(),
            passages,
        }
    }

    #[test]
    fn start_passage_lookup() {
        let doc = document(vec![passage("intro", "Intro"), passage("start", "Start")]);
        assert_eq!(doc.start_passage().map(|p| p.title.as_str()), Some("Start"));
        assert!(doc.passage("missing").is_none());
    }

    #[test]
    fn duplicate_ids_reported_once() {
        let doc = document(vec![
            passage("a_b", "A b"),
            passage("c", "C"),
            passage("a_b", "A-B"),
            passage("a_b", "a b"),
        ]);
        assert_eq!(doc.duplicate_passage_ids(), vec!["a_b"]);
        assert!(document(vec![passage("c", "C")]).duplicate_passage_ids().is_empty());
    }

    #[test]
    fn initial_values_from_declarations() {
        let mut doc = document(vec![passage("start", "Start")]);
        doc.variables
            .insert("gold".into(), VariableDecl::new(Value::from(10), ""));
        let env = doc.initial_values();
        assert_eq!(env.get("gold"), Some(&Value::Num(10.0)));
    }

    #[test]
    fn format_serializes_lowercase() {
        let json = serde_json::to_string(&StoryFormat::SugarCube).unwrap();
        assert_eq!(json, "\"sugarcube\"");
        assert!(StoryFormat::Harlowe.has_converter());
        assert!(!StoryFormat::Chapbook.has_converter());
    }
}
