//! Variable declarations inferred from converted passage text.

use std::collections::BTreeMap;

use whisker_core::story::{parse_decimal, Passage, StoryFormat, Value, VariableDecl};

use crate::convert::STATE_WRITE;

/// Scan passages for canonical state writes and declare each variable from
/// its first assignment.
///
/// Passages are scanned in order, writes within a passage left to right.
/// Later writes to an already-declared name are ignored here; they still
/// take effect when the story runs.
pub fn infer_variables(
    passages: &[Passage],
    format: StoryFormat,
) -> BTreeMap<String, VariableDecl> {
    let description = format!("Imported from Twine ({format})");
    let mut variables = BTreeMap::new();

    for passage in passages {
        for (name, literal) in state_writes(&passage.content) {
            variables
                .entry(name.to_string())
                .or_insert_with(|| VariableDecl::new(infer_value(literal), description.clone()));
        }
    }
    variables
}

/// Type a literal: `true`/`false`, then a decimal number, then a string with
/// one enclosing quote stripped from each end.
pub fn infer_value(literal: &str) -> Value {
    match literal {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match parse_decimal(literal) {
            Some(n) => Value::Num(n),
            None => Value::Str(strip_one_quote(literal).to_string()),
        },
    }
}

fn strip_one_quote(s: &str) -> &str {
    let is_quote = |c: char| c == '"' || c == '\'';
    let s = s.strip_prefix(is_quote).unwrap_or(s);
    s.strip_suffix(is_quote).unwrap_or(s)
}

/// Every `{{script: game_state:set("name", value)}}` in `content`, as
/// `(name, trimmed value)`.
///
/// The value may not contain `}` and must be followed directly by `)}}`.
fn state_writes(content: &str) -> Vec<(&str, &str)> {
    let mut writes = Vec::new();
    let mut pos = 0;
    while let Some(rel) = content[pos..].find("{{script:") {
        let start = pos + rel;
        pos = start + 2;
        if let Some(write) = parse_state_write(&content[start..]) {
            writes.push(write);
        }
    }
    writes
}

fn parse_state_write(s: &str) -> Option<(&str, &str)> {
    let rest = s.strip_prefix("{{script:")?.trim_start();
    let rest = rest.strip_prefix(STATE_WRITE)?.strip_prefix("(\"")?;

    let name_len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];
    let rest = rest[name_len..].strip_prefix("\",")?.trim_start();

    let brace = rest.find('}')?;
    let value = rest[..brace].strip_suffix(')')?;
    if value.is_empty() || !rest[brace..].starts_with("}}") {
        return None;
    }
    Some((name, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use whisker_core::story::{Position, ValueType};

    fn passage(content: &str) -> Passage {
        Passage {
            id: "p".into(),
            title: "P".into(),
            content: content.into(),
            choices: Vec::new(),
            position: Position::default(),
            tags: Vec::new(),
            origin: None,
        }
    }

    #[test]
    fn literal_typing() {
        assert_eq!(infer_value("true"), Value::Bool(true));
        assert_eq!(infer_value("false"), Value::Bool(false));
        assert_eq!(infer_value("100"), Value::Num(100.0));
        assert_eq!(infer_value("-2.5"), Value::Num(-2.5));
        assert_eq!(infer_value("\"Alice\""), Value::from("Alice"));
        assert_eq!(infer_value("'Bob'"), Value::from("Bob"));
        assert_eq!(infer_value("$gold"), Value::from("$gold"));
        assert_eq!(infer_value("\"mixed'"), Value::from("mixed"));
        assert_eq!(infer_value("True"), Value::from("True"));
        assert_eq!(infer_value("1e3"), Value::Num(1000.0));
        assert_eq!(infer_value("0x10"), Value::from("0x10"));
        assert_eq!(infer_value("1_000"), Value::from("1_000"));
    }

    #[test]
    fn first_writer_wins() {
        let passages = [
            passage("{{script: game_state:set(\"x\", 1)}}"),
            passage("{{script: game_state:set(\"x\", 2)}}{{script: game_state:set(\"y\", \"a\")}}"),
        ];
        let vars = infer_variables(&passages, StoryFormat::SugarCube);
        assert_eq!(vars["x"].initial, Value::Num(1.0));
        assert_eq!(vars["x"].ty, ValueType::Number);
        assert_eq!(vars["y"].initial, Value::from("a"));
        assert_eq!(vars["y"].description, "Imported from Twine (sugarcube)");
    }

    #[test]
    fn left_to_right_within_passage() {
        let passages = [passage(
            "{{script: game_state:set(\"flag\", false)}} then {{script: game_state:set(\"flag\", true)}}",
        )];
        let vars = infer_variables(&passages, StoryFormat::Harlowe);
        assert_eq!(vars["flag"].initial, Value::Bool(false));
        assert_eq!(vars["flag"].ty, ValueType::Boolean);
    }

    #[test]
    fn malformed_writes_are_skipped() {
        let passages = [passage(
            "{{script: game_state:set(\"a\", )}} {{script: game_state:set(\"b\", {x})}} \
             {{script: other(\"c\", 1)}} {{script: game_state:set(\"d\",  7 )}}",
        )];
        let vars = infer_variables(&passages, StoryFormat::Unknown);
        assert_eq!(vars.keys().collect::<Vec<_>>(), vec!["d"]);
        assert_eq!(vars["d"].initial, Value::Num(7.0));
    }
}
