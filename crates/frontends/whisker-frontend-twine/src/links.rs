//! `[[...]]` link extraction.
//!
//! Twine links become passage choices. Four spellings are recognized:
//!
//! - `[[Target]]`
//! - `[[Text|Target]]`
//! - `[[Text->Target]]`
//! - `[[Target<-Text]]`

use crate::naming::passage_id;

/// A link found in passage text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Display text of the choice.
    pub text: String,
    /// Target passage name as written in the link.
    pub target_name: String,
    /// Id derived from `target_name`; the importer replaces it with the id of
    /// the passage actually carrying that name when there is one.
    pub target_id: String,
}

/// Result of [`extract_links`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLinks {
    /// Links in the order they appear.
    pub choices: Vec<Link>,
    /// The input with every link span removed.
    pub clean_text: String,
}

/// Extract every `[[body]]` span from `text`.
///
/// A body is one or more characters other than `]`. Spans do not nest or
/// overlap; a single-bracket `[text]` is never a link.
pub fn extract_links(text: &str) -> ExtractedLinks {
    let mut choices = Vec::new();
    let mut clean_text = String::with_capacity(text.len());
    let mut copied_to = 0;
    let mut pos = 0;

    while let Some(rel) = text[pos..].find("[[") {
        let open = pos + rel;
        let body_start = open + 2;
        let body_len = text[body_start..].find(']').unwrap_or(text.len() - body_start);
        let close = body_start + body_len;

        if body_len > 0 && text[close..].starts_with("]]") {
            choices.push(parse_link(&text[body_start..close]));
            clean_text.push_str(&text[copied_to..open]);
            pos = close + 2;
            copied_to = pos;
        } else {
            pos = open + 1;
        }
    }

    clean_text.push_str(&text[copied_to..]);
    ExtractedLinks {
        choices,
        clean_text,
    }
}

/// Parse a link body into display text and target.
///
/// Separators are tried in order `|`, `->`, `<-`. With repeated separators
/// only the first two segments count.
pub fn parse_link(body: &str) -> Link {
    let (text, target) = if body.contains('|') {
        first_two(body, "|")
    } else if body.contains("->") {
        first_two(body, "->")
    } else if body.contains("<-") {
        let (target, text) = first_two(body, "<-");
        (text, target)
    } else {
        let both = body.trim();
        (both, both)
    };

    Link {
        text: text.to_string(),
        target_name: target.to_string(),
        target_id: passage_id(target),
    }
}

fn first_two<'a>(body: &'a str, sep: &str) -> (&'a str, &'a str) {
    let mut parts = body.split(sep).map(str::trim);
    let first = parts.next().unwrap_or("");
    let second = parts.next().unwrap_or("");
    (first, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(text: &str, target: &str) -> (String, String) {
        (text.to_string(), target.to_string())
    }

    fn pairs(text: &str) -> Vec<(String, String)> {
        extract_links(text)
            .choices
            .into_iter()
            .map(|l| (l.text, l.target_name))
            .collect()
    }

    #[test]
    fn all_four_spellings() {
        assert_eq!(pairs("[[Cellar]]"), vec![link("Cellar", "Cellar")]);
        assert_eq!(pairs("[[Go down|Cellar]]"), vec![link("Go down", "Cellar")]);
        assert_eq!(pairs("[[Go down->Cellar]]"), vec![link("Go down", "Cellar")]);
        assert_eq!(pairs("[[Cellar<-Go down]]"), vec![link("Go down", "Cellar")]);
    }

    #[test]
    fn separator_precedence() {
        // `|` wins over `->`.
        assert_eq!(pairs("[[a->b|c]]"), vec![link("a->b", "c")]);
        // `->` wins over `<-`.
        assert_eq!(pairs("[[a<-b->c]]"), vec![link("a<-b", "c")]);
        // Only the first two segments are used.
        assert_eq!(pairs("[[a|b|c]]"), vec![link("a", "b")]);
    }

    #[test]
    fn sides_are_trimmed_and_target_id_derived() {
        let links = extract_links("[[ Go to Part 2 -> End (Part 2) ]]").choices;
        assert_eq!(
            links,
            vec![Link {
                text: "Go to Part 2".into(),
                target_name: "End (Part 2)".into(),
                target_id: "end_part_2".into(),
            }]
        );
    }

    #[test]
    fn links_are_removed_from_text() {
        let out = extract_links("You see a door. [[Open it|Door]] Or [[Leave]].");
        assert_eq!(out.clean_text, "You see a door.  Or .");
        assert_eq!(out.choices.len(), 2);
        assert_eq!(out.choices[1].target_id, "leave");
    }

    #[test]
    fn no_links_is_identity() {
        let text = "A [single] bracket and [[]] empty pair.";
        let out = extract_links(text);
        assert!(out.choices.is_empty());
        assert_eq!(out.clean_text, text);
    }

    #[test]
    fn extra_open_bracket_joins_body() {
        let out = extract_links("[[[x]]");
        assert_eq!(out.choices[0].text, "[x");
        assert_eq!(out.clean_text, "");
    }

    #[test]
    fn removed_spans_reassemble_original() {
        let text = "a[[b]]c[[d|e]]f[[g->h]]";
        let out = extract_links(text);
        assert_eq!(out.choices.len(), 3);

        assert_eq!(out.clean_text, "acf");

        // Each removed span sat after one character of clean text.
        let mut rebuilt = String::new();
        let mut rest = out.clean_text.as_str();
        for span in ["[[b]]", "[[d|e]]", "[[g->h]]"] {
            let (head, tail) = rest.split_at(1);
            rebuilt.push_str(head);
            rebuilt.push_str(span);
            rest = tail;
        }
        rebuilt.push_str(rest);
        assert_eq!(rebuilt, text);
    }
}
