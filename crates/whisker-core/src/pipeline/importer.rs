use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::CoreError;
use crate::story::StoryDocument;

/// Importer trait: parses a foreign story format into a canonical document.
pub trait Importer {
    /// Short name of the source format family (e.g. `"twine"`).
    fn name(&self) -> &str;

    /// Whether `source` looks like a document this importer understands.
    ///
    /// A cheap sniff used to pick an importer; `import` still reports a
    /// proper error for documents that pass the sniff but are malformed.
    fn accepts(&self, source: &str) -> bool;

    /// Parse the source document into a canonical story.
    fn import(&self, source: &str) -> Result<StoryDocument, CoreError>;
}

/// Load a story from `path`.
///
/// Canonical JSON documents are read as-is; anything else goes to the first
/// importer whose sniff accepts it.
pub fn load_story(path: &Path, importers: &[&dyn Importer]) -> Result<StoryDocument, CoreError> {
    let source = fs::read_to_string(path)?;
    if source.trim_start().starts_with('{') {
        return Ok(serde_json::from_str(&source)?);
    }
    let importer = importers
        .iter()
        .find(|i| i.accepts(&source))
        .ok_or_else(|| CoreError::UnsupportedFormat {
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        })?;
    debug!(importer = importer.name(), path = %path.display(), "importing story");
    importer.import(&source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    struct Sniffer;

    impl Importer for Sniffer {
        fn name(&self) -> &str {
            "sniffer"
        }

        fn accepts(&self, source: &str) -> bool {
            source.starts_with("STORY")
        }

        fn import(&self, _source: &str) -> Result<StoryDocument, CoreError> {
            Err(FormatError::NoPassages.into())
        }
    }

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir()
            .join(format!("whisker-core-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn picks_accepting_importer() {
        let path = temp_file("story.txt", "STORY body");
        let err = load_story(&path, &[&Sniffer]).unwrap_err();
        assert!(matches!(err, CoreError::Format(FormatError::NoPassages)));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn unknown_source_is_unsupported() {
        let path = temp_file("story.docx", "nothing to see");
        let err = load_story(&path, &[&Sniffer]).unwrap_err();
        assert_eq!(err.to_string(), "unsupported story format: docx");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_story(Path::new("/nonexistent/whisker/story.html"), &[]).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }

    #[test]
    fn canonical_json_loads_back_equal() {
        use crate::story::{
            Choice, ForeignOrigin, Passage, Position, StoryFormat, StoryMetadata, StorySettings,
            Value, VariableDecl,
        };

        let mut doc = StoryDocument {
            metadata: StoryMetadata {
                title: "Cave".into(),
                author: "Ann".into(),
                ifid: "3F2A9C1E-0B7D-4E1A-9C55-1A2B3C4D5E6F".into(),
                description: "Imported from Twine (harlowe)".into(),
                created: "2026-01-02T03:04:05.000Z".into(),
                modified: "2026-01-02T03:04:05.000Z".into(),
                foreign_origin: Some(ForeignOrigin {
                    format: StoryFormat::Harlowe,
                    format_version: "3.3.8".into(),
                }),
            },
            settings: StorySettings {
                start_passage: "start".into(),
            },
            variables: Default::default(),
            passages: vec![Passage {
                id: "start".into(),
                title: "Start".into(),
                content: "Gold: {{gold}}".into(),
                choices: vec![Choice {
                    text: "Leave".into(),
                    target: "outside".into(),
                }],
                position: Position { x: 0.0, y: 250.0 },
                tags: vec!["intro".into()],
                origin: None,
            }],
        };
        doc.variables
            .insert("gold".into(), VariableDecl::new(Value::Num(50.0), "Imported"));

        let path = temp_file("story.json", &serde_json::to_string_pretty(&doc).unwrap());
        let loaded = load_story(&path, &[]).unwrap();
        assert_eq!(loaded, doc);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn json_is_read_without_importers() {
        let path = temp_file("bad.json", "{ \"metadata\": 3 }");
        let err = load_story(&path, &[]).unwrap_err();
        assert!(matches!(err, CoreError::Json(_)));
        fs::remove_file(path).unwrap();
    }
}
