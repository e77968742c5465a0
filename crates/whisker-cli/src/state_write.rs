//! Script capability for previews: applies literal state writes.

use whisker_core::error::ScriptError;
use whisker_core::story::{parse_decimal, VariableEnv};
use whisker_core::template::ScriptRuntime;
use whisker_frontend_twine::convert::STATE_WRITE;
use whisker_frontend_twine::variables::infer_value;

/// Runs `game_state:set("name", literal)` and nothing else.
///
/// Any other script, including writes whose value is an expression, fails
/// and renders as an error marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct StateWriteRuntime;

impl ScriptRuntime for StateWriteRuntime {
    fn execute(&self, code: &str, env: &mut dyn VariableEnv) -> Result<(), ScriptError> {
        let (name, literal) = parse_write(code)
            .ok_or_else(|| ScriptError::new(format!("unsupported script: {}", code.trim())))?;
        env.set(name, infer_value(literal));
        Ok(())
    }
}

fn parse_write(code: &str) -> Option<(&str, &str)> {
    let args = code
        .trim()
        .strip_prefix(STATE_WRITE)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?;
    let (name, value) = args.split_once(',')?;

    let name = name.trim().strip_prefix('"')?.strip_suffix('"')?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }
    let value = value.trim();
    is_literal(value).then_some((name, value))
}

fn is_literal(value: &str) -> bool {
    if value == "true" || value == "false" || parse_decimal(value).is_some() {
        return true;
    }
    [b'"', b'\''].into_iter().any(|q| {
        let bytes = value.as_bytes();
        bytes.len() >= 2
            && bytes[0] == q
            && bytes[bytes.len() - 1] == q
            && !bytes[1..bytes.len() - 1].contains(&q)
    })
}
