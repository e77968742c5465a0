//! `{{script: ...}}` blocks.
//!
//! Script payloads are opaque to the core. With a [`ScriptRuntime`]
//! capability the payload is handed over for execution and the block renders
//! as nothing; without one the block renders as an inert placeholder that
//! previews the code.

use tracing::warn;

use crate::error::ScriptError;
use crate::pipeline::{Markup, RenderConfig};
use crate::story::VariableEnv;

pub const SCRIPT_OPEN: &str = "{{script:";
const SCRIPT_CLOSE: &str = "}}";

/// A host-provided script runtime.
///
/// Constructed once by the host application and lent to the renderer; the
/// renderer never owns or caches it.
pub trait ScriptRuntime {
    /// Execute `code` with read/write access to the story variables.
    fn execute(&self, code: &str, env: &mut dyn VariableEnv) -> Result<(), ScriptError>;
}

/// Run or replace every script block in `content`.
pub fn process_scripts(
    content: &str,
    env: &mut dyn VariableEnv,
    runtime: Option<&dyn ScriptRuntime>,
    config: &RenderConfig,
) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(open) = rest.find(SCRIPT_OPEN) {
        let code_start = open + SCRIPT_OPEN.len();
        let Some(close) = rest[code_start..].find(SCRIPT_CLOSE) else {
            break;
        };
        let code = &rest[code_start..code_start + close];

        out.push_str(&rest[..open]);
        match runtime {
            Some(runtime) => {
                if let Err(e) = runtime.execute(code.trim(), env) {
                    warn!(error = %e, "script block failed during preview");
                    out.push_str(&error_marker(config.markup));
                }
            }
            None => out.push_str(&placeholder(code, config)),
        }
        rest = &rest[code_start + close + SCRIPT_CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

/// Inert stand-in for a script block: the first line of the code, cut to
/// `script_preview_chars`.
fn placeholder(code: &str, config: &RenderConfig) -> String {
    let code = code.trim();
    let limit = config.script_preview_chars;
    let preview: String = code.lines().next().unwrap_or("").chars().take(limit).collect();
    let ellipsis = if code.chars().count() > limit { "..." } else { "" };

    match config.markup {
        Markup::Plain => format!("[script: {preview}{ellipsis}]"),
        Markup::Html => format!(
            "<span style=\"display: inline-block; background: #fef3c7; color: #92400e; \
             padding: 2px 8px; border-radius: 4px; font-size: 0.85em; font-family: monospace;\" \
             title=\"{}\">Script: {}{ellipsis}</span>",
            html_escape::encode_double_quoted_attribute(code),
            html_escape::encode_text(&preview),
        ),
    }
}

fn error_marker(markup: Markup) -> String {
    match markup {
        Markup::Plain => "[script error]".to_string(),
        Markup::Html => "<span style=\"color: #ef4444;\">Script Error</span>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::story::{Value, Variables};

    /// Records every payload it is asked to run and sets `ran = true`.
    #[derive(Default)]
    struct Recording {
        calls: RefCell<Vec<String>>,
    }

    impl ScriptRuntime for Recording {
        fn execute(&self, code: &str, env: &mut dyn VariableEnv) -> Result<(), ScriptError> {
            self.calls.borrow_mut().push(code.to_string());
            env.set("ran", Value::Bool(true));
            Ok(())
        }
    }

    struct Failing;

    impl ScriptRuntime for Failing {
        fn execute(&self, _code: &str, _env: &mut dyn VariableEnv) -> Result<(), ScriptError> {
            Err(ScriptError::new("boom"))
        }
    }

    #[test]
    fn runtime_executes_and_block_renders_empty() {
        let runtime = Recording::default();
        let mut vars = Variables::new();
        let out = process_scripts(
            "a{{script: game_state:set(\"x\", 1) }}b",
            &mut vars,
            Some(&runtime),
            &RenderConfig::default(),
        );
        assert_eq!(out, "ab");
        assert_eq!(*runtime.calls.borrow(), vec!["game_state:set(\"x\", 1)".to_string()]);
        assert_eq!(vars.get("ran"), Some(&Value::Bool(true)));
    }

    #[test]
    fn placeholder_without_runtime() {
        let mut vars = Variables::new();
        let out = process_scripts(
            "{{script: game_state:set(\"x\", 1)}}",
            &mut vars,
            None,
            &RenderConfig::plain(),
        );
        assert_eq!(out, "[script: game_state:set(\"x\", 1)]");
        assert!(vars.is_empty());
    }

    #[test]
    fn placeholder_truncates_long_code() {
        let config = RenderConfig {
            script_preview_chars: 5,
            ..RenderConfig::plain()
        };
        let out = process_scripts("{{script: abcdefghij}}", &mut Variables::new(), None, &config);
        assert_eq!(out, "[script: abcde...]");
    }

    #[test]
    fn html_placeholder_escapes_code() {
        let out = process_scripts(
            "{{script: x = \"<b>\"}}",
            &mut Variables::new(),
            None,
            &RenderConfig::default(),
        );
        assert!(out.starts_with("<span"));
        assert!(out.contains("title=\"x = &quot;&lt;b&gt;&quot;\""));
        assert!(out.contains("Script: x = \"&lt;b&gt;\""));
    }

    #[test]
    fn failing_script_renders_error_marker() {
        let out = process_scripts(
            "{{script: explode()}}!",
            &mut Variables::new(),
            Some(&Failing),
            &RenderConfig::plain(),
        );
        assert_eq!(out, "[script error]!");
    }

    #[test]
    fn unterminated_block_is_left_alone() {
        let text = "{{script: never closed";
        let out = process_scripts(text, &mut Variables::new(), None, &RenderConfig::plain());
        assert_eq!(out, text);
    }
}
