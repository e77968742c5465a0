//! Twine 2 importer for the Whisker editor.
//!
//! Reads a compiled Twine HTML file, converts Harlowe and SugarCube passage
//! markup into the canonical template language, turns `[[links]]` into
//! choices, and infers variable declarations. Snowman and Chapbook stories
//! are recognized and imported with their passage text unconverted.

pub mod convert;
pub mod extract;
pub mod harlowe;
pub mod links;
pub mod metadata;
pub mod naming;
pub mod record;
pub mod sugarcube;
pub mod summary;
pub mod variables;

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};
use whisker_core::error::{CoreError, FormatError};
use whisker_core::pipeline::Importer;
use whisker_core::story::{
    Choice, ForeignOrigin, Passage, PassageOrigin, Position, StoryDocument, StoryFormat,
    StoryMetadata, StorySettings,
};

pub use extract::{PassageData, StoryData};
use links::{extract_links, Link};
use metadata::extract_metadata;
use naming::passage_id;
pub use record::{PassageRecord, StoryRecord};
pub use summary::ImportSummary;
use variables::infer_variables;

/// Twine importer: compiled Twine 2 HTML in, canonical document out.
#[derive(Debug, Default, Clone, Copy)]
pub struct TwineImporter;

impl Importer for TwineImporter {
    fn name(&self) -> &str {
        "twine"
    }

    fn accepts(&self, source: &str) -> bool {
        source.to_ascii_lowercase().contains("<tw-storydata")
    }

    fn import(&self, source: &str) -> Result<StoryDocument, CoreError> {
        Ok(import_html(source)?)
    }
}

/// Import a compiled Twine 2 HTML document.
pub fn import_html(html: &str) -> Result<StoryDocument, FormatError> {
    import_story(StoryData::parse(html).as_ref())
}

/// Import a story from its root record, `None` when the document has no
/// root.
///
/// Fails only when the root is missing or holds no passages. Everything
/// else degrades: unresolved links keep their derived id, an unknown start
/// node falls back to the first passage, unconvertible macros stay as text.
pub fn import_story<R: StoryRecord>(root: Option<&R>) -> Result<StoryDocument, FormatError> {
    let root = root.ok_or(FormatError::MissingStoryData)?;
    let records = root.passages();
    if records.is_empty() {
        return Err(FormatError::NoPassages);
    }

    let meta = extract_metadata(root);
    info!(
        title = %meta.title,
        format = %meta.format,
        passages = records.len(),
        "importing Twine story"
    );
    if !meta.format.has_converter() {
        warn!(
            format = %meta.format,
            "no markup converter for this story format; passage text kept as written"
        );
    }

    let mut by_name: HashMap<&str, String> = HashMap::new();
    let mut by_pid: HashMap<&str, String> = HashMap::new();
    let mut passages = Vec::with_capacity(records.len());
    let mut pending_links = Vec::with_capacity(records.len());

    for record in records {
        let (passage, links) = build_passage(record, meta.format);
        // Later passages with the same name overwrite earlier ones.
        by_name.insert(record.attr("name").unwrap_or(""), passage.id.clone());
        if let Some(pid) = record.attr("pid") {
            by_pid.insert(pid, passage.id.clone());
        }
        passages.push(passage);
        pending_links.push(links);
    }

    for (passage, links) in passages.iter_mut().zip(pending_links) {
        passage.choices = links
            .into_iter()
            .map(|link| {
                let target = match by_name.get(link.target_name.as_str()) {
                    Some(id) => id.clone(),
                    None => {
                        debug!(
                            from = %passage.id,
                            target = %link.target_name,
                            "link to unknown passage"
                        );
                        link.target_id
                    }
                };
                Choice {
                    text: link.text,
                    target,
                }
            })
            .collect();
    }

    let first_id = passages.first().map(|p| p.id.clone()).unwrap_or_default();
    let start_passage = match meta.start_node.as_deref() {
        Some(node) => match by_name.get(node).or_else(|| by_pid.get(node)) {
            Some(id) => id.clone(),
            None => {
                warn!(
                    start_node = node,
                    fallback = %first_id,
                    "start node not found; using first passage"
                );
                first_id
            }
        },
        None => first_id,
    };

    let variables = infer_variables(&passages, meta.format);
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    let doc = StoryDocument {
        metadata: StoryMetadata {
            title: meta.title,
            author: meta.author,
            ifid: meta.ifid,
            description: format!("Imported from Twine ({})", meta.format),
            created: now.clone(),
            modified: now,
            foreign_origin: Some(ForeignOrigin {
                format: meta.format,
                format_version: meta.format_version,
            }),
        },
        settings: StorySettings { start_passage },
        variables,
        passages,
    };

    for id in doc.duplicate_passage_ids() {
        warn!(id, "several passages derive the same id; lookups by id see the first");
    }
    info!(
        passages = doc.passages.len(),
        variables = doc.variables.len(),
        "import complete"
    );
    Ok(doc)
}

/// Rewrite passage markup for `format`. Formats without a converter are
/// returned unchanged.
pub fn convert_markup(format: StoryFormat, text: &str) -> String {
    match format {
        StoryFormat::Harlowe => harlowe::convert(text),
        StoryFormat::SugarCube => sugarcube::convert(text),
        StoryFormat::Snowman | StoryFormat::Chapbook | StoryFormat::Unknown => text.to_string(),
    }
}

/// Build a passage with its choices still unresolved.
fn build_passage<P: PassageRecord>(record: &P, format: StoryFormat) -> (Passage, Vec<Link>) {
    let name = record.attr("name").unwrap_or("");
    let id = passage_id(name);
    debug!(name, %id, "converting passage");

    let extracted = extract_links(record.text());
    let content = convert_markup(format, &extracted.clean_text);

    let passage = Passage {
        id,
        title: name.to_string(),
        content: content.trim().to_string(),
        choices: Vec::new(),
        position: parse_position(record.attr("position")),
        tags: record
            .attr("tags")
            .unwrap_or("")
            .split(' ')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        origin: Some(PassageOrigin {
            foreign_id: record.attr("pid").unwrap_or("").to_string(),
            original_name: name.to_string(),
            format: format.as_str().to_string(),
        }),
    };
    (passage, extracted.choices)
}

/// `"x,y"` → position. Each coordinate is the leading integer of its
/// component; anything missing or unparsable is 100.
fn parse_position(raw: Option<&str>) -> Position {
    let mut parts = raw.unwrap_or("").split(',');
    let mut coord = || {
        parts
            .next()
            .and_then(leading_integer)
            .unwrap_or(Position::DEFAULT_COORD)
    };
    let x = coord();
    let y = coord();
    Position { x, y }
}

fn leading_integer(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let digits_from = usize::from(s.starts_with(['+', '-']));
    let len = s[digits_from..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if len == 0 {
        return None;
    }
    s[..digits_from + len].parse().ok()
}
