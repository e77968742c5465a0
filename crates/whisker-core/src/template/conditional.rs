//! `{{#if}}` / `{{else if}}` / `{{else}}` / `{{/if}}` resolution.
//!
//! Resolution is textual: each pass finds the first opening marker and the
//! first `{{/if}}` after it, then splices the winning block in place. Blocks
//! do not nest; an inner `{{#if}}` ends up paired with the outer block's
//! closing marker on a later pass.

use tracing::{debug, warn};

use super::condition::evaluate;
use crate::story::VariableEnv;

/// Hard cap on resolution passes, bounding the work done on malformed or
/// self-reproducing input.
pub const MAX_CONDITIONAL_PASSES: usize = 100;

const IF_OPEN: &str = "{{#if";
const ELSE_IF: &str = "{{else if";
const ELSE: &str = "{{else}}";
const IF_CLOSE: &str = "{{/if}}";

/// A matched `{{<keyword> <condition>}}` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker<'a> {
    start: usize,
    end: usize,
    condition: &'a str,
}

/// One arm of a conditional chain. `condition` is `None` for `{{else}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Arm<'a> {
    condition: Option<&'a str>,
    body: &'a str,
}

/// Replace every resolvable conditional chain with its winning arm.
pub fn resolve_conditionals(template: &str, env: &dyn VariableEnv) -> String {
    let mut content = template.to_string();
    let mut passes = 0;

    while content.contains(IF_OPEN) && passes < MAX_CONDITIONAL_PASSES {
        passes += 1;

        let Some(open) = find_marker(&content, IF_OPEN, 0) else {
            break;
        };
        let Some(close) = content[open.end..].find(IF_CLOSE).map(|i| open.end + i) else {
            debug!(at = open.start, "unterminated {{{{#if}}}}, leaving the rest as text");
            break;
        };

        let span = open.start..close + IF_CLOSE.len();
        let replacement = split_arms(&content[open.end..close], open.condition)
            .into_iter()
            .find(|arm| arm.condition.map_or(true, |c| evaluate(c, env)))
            .map(|arm| arm.body.to_string())
            .unwrap_or_default();

        content.replace_range(span, &replacement);
    }

    if passes == MAX_CONDITIONAL_PASSES && find_marker(&content, IF_OPEN, 0).is_some() {
        warn!(
            passes,
            "conditional resolution hit the pass limit; remaining markers left as text"
        );
    }
    content
}

/// Find the first `<keyword> <condition>}}` marker at or after `from`.
///
/// The keyword must be followed by whitespace, then a condition containing
/// no `}`, then `}}`. Positions that look like the keyword but fail the rest
/// of the shape are skipped.
fn find_marker<'a>(text: &'a str, keyword: &str, from: usize) -> Option<Marker<'a>> {
    let mut search = from;
    while let Some(rel) = text[search..].find(keyword) {
        let start = search + rel;
        let after = start + keyword.len();
        if let Some((condition, len)) = match_condition_tail(&text[after..]) {
            return Some(Marker {
                start,
                end: after + len,
                condition,
            });
        }
        search = after;
    }
    None
}

/// Match `\s+[^}]+}}` at the start of `rest`, returning the condition and the
/// number of bytes consumed.
fn match_condition_tail(rest: &str) -> Option<(&str, usize)> {
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let brace = rest.find('}')?;
    if !rest[brace..].starts_with("}}") {
        return None;
    }
    let segment = &rest[..brace];
    // At least one whitespace character plus at least one more character.
    if segment.chars().count() < 2 {
        return None;
    }
    Some((segment.trim_start(), brace + 2))
}

/// Split the text between `{{#if}}` and `{{/if}}` into ordered arms.
fn split_arms<'a>(body: &'a str, first_condition: &'a str) -> Vec<Arm<'a>> {
    // (start, end, condition) of each `{{else if}}` / `{{else}}` marker.
    let mut markers: Vec<(usize, usize, Option<&'a str>)> = Vec::new();
    let mut pos = 0;
    while pos < body.len() {
        let else_if = find_marker(body, ELSE_IF, pos);
        let else_ = body[pos..].find(ELSE).map(|i| pos + i);

        let next = match (else_if, else_) {
            (Some(m), Some(e)) if m.start < e => (m.start, m.end, Some(m.condition)),
            (Some(m), None) => (m.start, m.end, Some(m.condition)),
            (_, Some(e)) => (e, e + ELSE.len(), None),
            (None, None) => break,
        };
        markers.push(next);
        pos = next.1;
    }

    let mut arms = Vec::with_capacity(markers.len() + 1);
    let first_end = markers.first().map_or(body.len(), |m| m.0);
    arms.push(Arm {
        condition: Some(first_condition),
        body: &body[..first_end],
    });
    for (i, &(_, end, condition)) in markers.iter().enumerate() {
        let arm_end = markers.get(i + 1).map_or(body.len(), |m| m.0);
        arms.push(Arm {
            condition,
            body: &body[end..arm_end],
        });
    }
    arms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{Value, Variables};

    fn env(pairs: &[(&str, bool)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::Bool(*v)))
            .collect()
    }

    #[test]
    fn chain_picks_first_truthy_arm() {
        let text = "{{#if a}}X{{else if b}}Y{{else}}Z{{/if}}";
        assert_eq!(resolve_conditionals(text, &env(&[("a", true), ("b", true)])), "X");
        assert_eq!(resolve_conditionals(text, &env(&[("a", false), ("b", true)])), "Y");
        assert_eq!(resolve_conditionals(text, &env(&[("a", false), ("b", false)])), "Z");
    }

    #[test]
    fn no_matching_arm_renders_empty() {
        let text = "before {{#if a}}X{{else if b}}Y{{/if}} after";
        assert_eq!(resolve_conditionals(text, &Variables::new()), "before  after");
    }

    #[test]
    fn multiple_sequential_blocks() {
        let text = "{{#if a}}A{{/if}}-{{#if b}}B{{else}}notB{{/if}}";
        assert_eq!(resolve_conditionals(text, &env(&[("a", true), ("b", false)])), "A-notB");
    }

    #[test]
    fn unterminated_block_is_left_alone() {
        let text = "{{#if a}}never closed";
        assert_eq!(resolve_conditionals(text, &env(&[("a", true)])), text);
    }

    #[test]
    fn malformed_open_marker_is_skipped() {
        // `{{#if}}` has no condition, so the next well-formed marker is used.
        let text = "{{#if}} {{#if a}}yes{{/if}}";
        assert_eq!(resolve_conditionals(text, &env(&[("a", true)])), "{{#if}} yes");
    }

    #[test]
    fn inner_open_pairs_with_outer_close() {
        // First pass takes `X{{#if b}}Y` as the arm, second pass resolves the
        // leftover `{{#if b}}YZ{{/if}}`.
        let text = "{{#if a}}X{{#if b}}Y{{/if}}Z{{/if}}";
        assert_eq!(resolve_conditionals(text, &env(&[("a", true), ("b", true)])), "XYZ");
    }

    #[test]
    fn pass_limit_bounds_work() {
        let text = "{{#if a}}x{{/if}}".repeat(MAX_CONDITIONAL_PASSES + 5);
        let out = resolve_conditionals(&text, &env(&[("a", true)]));
        assert!(out.starts_with(&"x".repeat(MAX_CONDITIONAL_PASSES)));
        assert_eq!(out.matches("{{#if a}}").count(), 5);
    }

    #[test]
    fn split_arms_orders_markers() {
        let arms = split_arms("A{{else if b == 2}}B{{else}}C", "a");
        assert_eq!(
            arms,
            vec![
                Arm { condition: Some("a"), body: "A" },
                Arm { condition: Some("b == 2"), body: "B" },
                Arm { condition: None, body: "C" },
            ]
        );
    }

    #[test]
    fn comparison_condition_in_marker() {
        let mut vars = Variables::new();
        vars.insert("health".into(), Value::Num(50.0));
        let text = "{{#if health >= 50}}strong{{else}}weak{{/if}}";
        assert_eq!(resolve_conditionals(text, &vars), "strong");
    }
}
