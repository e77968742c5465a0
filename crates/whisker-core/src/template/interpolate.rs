//! `{{identifier}}` interpolation.

use crate::pipeline::Markup;
use crate::story::VariableEnv;

/// Replace each `{{identifier}}` with the variable's display form.
///
/// Identifiers match `[A-Za-z_][A-Za-z0-9_]*` with no inner whitespace.
/// Undefined names render a visible placeholder instead of vanishing.
pub fn interpolate(content: &str, env: &dyn VariableEnv, markup: Markup) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match identifier_span(after) {
            Some(len) => {
                let name = &after[..len];
                match env.get(name) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => out.push_str(&missing(name, markup)),
                }
                rest = &after[len + 2..];
            }
            None => {
                out.push('{');
                rest = &rest[open + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Length of an identifier at the start of `s` that is directly followed by
/// `}}`.
fn identifier_span(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    let len = bytes
        .iter()
        .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
        .unwrap_or(bytes.len());
    s[len..].starts_with("}}").then_some(len)
}

fn missing(name: &str, markup: Markup) -> String {
    match markup {
        Markup::Plain => format!("[{name}]"),
        Markup::Html => format!("<span style=\"color: #61dafb;\">[{name}]</span>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{Value, Variables};

    #[test]
    fn defined_names_render_their_value() {
        let mut vars = Variables::new();
        vars.insert("gold".into(), Value::from(100));
        vars.insert("name".into(), Value::from("Alice"));
        vars.insert("brave".into(), Value::from(true));
        assert_eq!(
            interpolate("{{name}} has {{gold}} gold ({{brave}})", &vars, Markup::Plain),
            "Alice has 100 gold (true)"
        );
    }

    #[test]
    fn missing_names_render_placeholder() {
        let vars = Variables::new();
        assert_eq!(interpolate("{{ghost}}", &vars, Markup::Plain), "[ghost]");
        assert_eq!(
            interpolate("{{ghost}}", &vars, Markup::Html),
            "<span style=\"color: #61dafb;\">[ghost]</span>"
        );
    }

    #[test]
    fn non_identifiers_are_left_alone() {
        let vars = Variables::new();
        for text in ["{{ gold }}", "{{1abc}}", "{{a-b}}", "{{}}", "{{x", "{{{{"] {
            assert_eq!(interpolate(text, &vars, Markup::Plain), text);
        }
    }

    #[test]
    fn brace_run_before_identifier() {
        let mut vars = Variables::new();
        vars.insert("x".into(), Value::from(1));
        assert_eq!(interpolate("{{{x}}", &vars, Markup::Plain), "{1");
    }
}
