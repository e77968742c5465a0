//! Harlowe markup conversion.
//!
//! Harlowe writes macros as `(name: args)` and attaches content to them with
//! a `[hook]`. The converter rewrites assignments, conditional hooks, and
//! prints into canonical template directives, then turns any remaining
//! `$variable` into an interpolation. Keywords match case-insensitively.
//!
//! Hooks are matched one level deep: a hook body runs to the first `]`.

use crate::convert::{
    apply_rules, bare_variables, replace_each, state_write, translate_condition, Cursor, Rule,
};

const RULES: &[Rule] = &[
    set_macros,
    if_chains,
    stray_else_ifs,
    stray_elses,
    print_macros,
    bare_variables,
];

/// Convert Harlowe passage markup into canonical template text.
///
/// Never fails; macros that do not have the expected shape are left as they
/// are.
pub fn convert(text: &str) -> String {
    apply_rules(text, RULES)
}

/// `(set: $name to value)` → state write. The value runs to the first `)`.
fn set_macros(text: &str) -> String {
    replace_each(text, "(set:", |s| {
        let mut c = Cursor::new(s);
        c.tag_ci("(set:")?;
        c.ws0();
        let name = c.variable()?;
        c.ws1()?;
        c.keyword_ci("to")?;
        c.ws1()?;
        let value = c.until(')')?;
        c.tag(")")?;
        Some((c.offset(), state_write(name, value)))
    })
}

/// `(if: C)[a]`, plus directly following `(else-if: C)[b]` and `(else:)[c]`
/// hooks, → one canonical chain closed by `{{/if}}`.
fn if_chains(text: &str) -> String {
    replace_each(text, "(if:", |s| {
        let mut c = Cursor::new(s);
        let (condition, body) = conditional_hook(&mut c, "(if:")?;
        let mut out = format!("{{{{#if {condition}}}}}{body}");

        loop {
            let mut next = c;
            next.ws0();
            if let Some((condition, body)) = conditional_hook(&mut next, "(else-if:") {
                out.push_str(&format!("{{{{else if {condition}}}}}{body}"));
                c = next;
                continue;
            }
            if let Some(body) = else_hook(&mut next) {
                out.push_str("{{else}}");
                out.push_str(body);
                c = next;
            }
            break;
        }

        out.push_str("{{/if}}");
        Some((c.offset(), out))
    })
}

/// An `(else-if:)` hook not attached to a preceding `(if:)`.
fn stray_else_ifs(text: &str) -> String {
    replace_each(text, "(else-if:", |s| {
        let mut c = Cursor::new(s);
        let (condition, body) = conditional_hook(&mut c, "(else-if:")?;
        Some((c.offset(), format!("{{{{else if {condition}}}}}{body}")))
    })
}

/// An `(else:)` hook not attached to a preceding `(if:)`.
fn stray_elses(text: &str) -> String {
    replace_each(text, "(else:", |s| {
        let mut c = Cursor::new(s);
        let body = else_hook(&mut c)?;
        Some((c.offset(), format!("{{{{else}}}}{body}")))
    })
}

/// `(print: $name)` → `{{name}}`.
fn print_macros(text: &str) -> String {
    replace_each(text, "(print:", |s| {
        let mut c = Cursor::new(s);
        c.tag_ci("(print:")?;
        c.ws0();
        let name = c.variable()?;
        c.tag(")")?;
        Some((c.offset(), format!("{{{{{name}}}}}")))
    })
}

/// `<opener> C)[body]`, returning the translated condition and the body.
fn conditional_hook<'a>(c: &mut Cursor<'a>, opener: &str) -> Option<(String, &'a str)> {
    let mut probe = *c;
    probe.tag_ci(opener)?;
    let condition = translate_condition(probe.until(')')?)?;
    probe.tag(")")?;
    let body = hook(&mut probe)?;
    *c = probe;
    Some((condition, body))
}

/// `(else:)[body]`
fn else_hook<'a>(c: &mut Cursor<'a>) -> Option<&'a str> {
    let mut probe = *c;
    probe.tag_ci("(else:")?;
    probe.ws0();
    probe.tag(")")?;
    let body = hook(&mut probe)?;
    *c = probe;
    Some(body)
}

/// `[body]` with a non-empty body containing no `]`.
fn hook<'a>(c: &mut Cursor<'a>) -> Option<&'a str> {
    c.tag("[")?;
    let body = c.until(']')?;
    c.tag("]")?;
    Some(body)
}
