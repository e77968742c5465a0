//! Twine story extraction from compiled HTML files.
//!
//! All Twine 2 story formats compile to a single HTML file with embedded
//! `<tw-storydata>` and `<tw-passagedata>` elements. This module scans the raw
//! HTML for those elements without building a DOM, so passage text such as
//! `<<if $x>>` is never re-parsed as markup. Attribute values and passage text
//! are entity-decoded.

use crate::record::{PassageRecord, StoryRecord};

const STORY_OPEN: &str = "<tw-storydata";
const STORY_CLOSE: &str = "</tw-storydata>";
const PASSAGE_OPEN: &str = "<tw-passagedata";
const PASSAGE_CLOSE: &str = "</tw-passagedata>";

/// The `<tw-storydata>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryData {
    attrs: Vec<(String, String)>,
    passages: Vec<PassageData>,
}

/// A `<tw-passagedata>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassageData {
    attrs: Vec<(String, String)>,
    text: String,
}

impl StoryData {
    /// Locate the story root in `html`. `None` when there is no
    /// `<tw-storydata>` element.
    ///
    /// Tag names are matched case-insensitively. Only passages between the
    /// root's opening and closing tags belong to it; a missing closing tag
    /// extends the root to the end of the input.
    pub fn parse(html: &str) -> Option<Self> {
        // ASCII lowercasing keeps byte offsets aligned with `html`.
        let lower = html.to_ascii_lowercase();

        let sd_start = find_tag(&lower, STORY_OPEN, 0)?;
        let sd_tag_end = tag_end(html, sd_start)?;
        let attrs = parse_attrs(&html[sd_start + STORY_OPEN.len()..sd_tag_end]);

        let body_start = sd_tag_end + 1;
        let body_end = lower[body_start..]
            .find(STORY_CLOSE)
            .map_or(html.len(), |i| body_start + i);

        let mut passages = Vec::new();
        let mut search_from = body_start;
        while let Some(pd_start) = find_tag(&lower[..body_end], PASSAGE_OPEN, search_from) {
            let Some(pd_tag_end) = tag_end(html, pd_start) else {
                break;
            };
            let attrs = parse_attrs(&html[pd_start + PASSAGE_OPEN.len()..pd_tag_end]);

            // Source is between `>` and `</tw-passagedata>`.
            let content_start = pd_tag_end + 1;
            let (content_end, next) = match lower[content_start..].find(PASSAGE_CLOSE) {
                Some(i) => (content_start + i, content_start + i + PASSAGE_CLOSE.len()),
                None => (content_start, content_start),
            };
            let text = decode_html_entities(&html[content_start..content_end]);

            passages.push(PassageData { attrs, text });
            search_from = next;
        }

        Some(StoryData { attrs, passages })
    }
}

impl StoryRecord for StoryData {
    type Passage = PassageData;

    fn attr(&self, name: &str) -> Option<&str> {
        lookup(&self.attrs, name)
    }

    fn passages(&self) -> &[PassageData] {
        &self.passages
    }
}

impl PassageRecord for PassageData {
    fn attr(&self, name: &str) -> Option<&str> {
        lookup(&self.attrs, name)
    }

    fn text(&self) -> &str {
        &self.text
    }
}

fn lookup<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Find `<tagname` at or after `from` where the tag name is not just a
/// prefix of a longer name.
fn find_tag(lower: &str, open: &str, from: usize) -> Option<usize> {
    let mut search = from;
    while let Some(rel) = lower.get(search..)?.find(open) {
        let start = search + rel;
        let boundary = match lower.as_bytes().get(start + open.len()) {
            None | Some(b'>' | b'/') => true,
            Some(b) => b.is_ascii_whitespace(),
        };
        if boundary {
            return Some(start);
        }
        search = start + open.len();
    }
    None
}

/// Byte offset of the `>` closing the tag that starts at `start`, skipping
/// over quoted attribute values.
fn tag_end(html: &str, start: usize) -> Option<usize> {
    let mut quote = None;
    for (i, b) in html.bytes().enumerate().skip(start) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return Some(i),
            _ => {}
        }
    }
    None
}

/// Parse the attribute list of a start tag (everything between the tag name
/// and `>`). Handles double-quoted, single-quoted, unquoted, and bare
/// attributes. Names are lowercased; values are entity-decoded.
fn parse_attrs(s: &str) -> Vec<(String, String)> {
    let bytes = s.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'/')
        {
            i += 1;
        }
        if i == name_start {
            break;
        }
        let name = s[name_start..i].to_ascii_lowercase();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] != b'=' {
            attrs.push((name, String::new()));
            continue;
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let (raw, next) = match bytes.get(j) {
            Some(&q @ (b'"' | b'\'')) => {
                let value_start = j + 1;
                let end = s[value_start..]
                    .find(q as char)
                    .map_or(s.len(), |e| value_start + e);
                (&s[value_start..end], (end + 1).min(s.len()))
            }
            _ => {
                let end = s[j..]
                    .find(|c: char| c.is_ascii_whitespace())
                    .map_or(s.len(), |e| j + e);
                (&s[j..end], end)
            }
        };
        attrs.push((name, decode_html_entities(raw)));
        i = next;
    }
    attrs
}

/// Decode HTML entities in attribute values and passage source.
fn decode_html_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}
