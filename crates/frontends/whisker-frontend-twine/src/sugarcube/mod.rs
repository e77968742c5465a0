//! SugarCube markup conversion.
//!
//! SugarCube (v2.x) writes macros as `<<name args>>` with TwineScript
//! arguments. The converter handles `<<set>>`, the `<<if>>` family, and the
//! print macros; everything else is left in place for manual adjustment.
//! Macro names match case-insensitively.

use crate::convert::{
    apply_rules, bare_variables, replace_each, state_write, translate_condition, Cursor, Rule,
};

const RULES: &[Rule] = &[set_macros, conditionals, print_macros, bare_variables];

/// Convert SugarCube passage markup into canonical template text.
///
/// Never fails; macros that do not have the expected shape are left as they
/// are.
pub fn convert(text: &str) -> String {
    apply_rules(text, RULES)
}

/// `<<set $name to value>>` / `<<set $name = value>>` → state write.
///
/// The value is trimmed and may not contain `>`.
fn set_macros(text: &str) -> String {
    replace_each(text, "<<set", |s| {
        let mut c = Cursor::new(s);
        c.tag_ci("<<set")?;
        c.ws1()?;
        let name = c.variable()?;
        c.ws1()?;
        if c.keyword_ci("to").is_none() {
            c.tag("=")?;
        }
        c.ws1()?;
        let value = c.until('>')?.trim();
        c.tag(">>")?;
        Some((c.offset(), state_write(name, value)))
    })
}

/// `<<if C>>`, `<<elseif C>>`, `<<else if C>>`, `<<else>>`, and the closing
/// forms `<<endif>>`, `<</endif>>`, `<</if>>`.
fn conditionals(text: &str) -> String {
    replace_each(text, "<<", |s| {
        let mut c = Cursor::new(s);
        c.tag("<<")?;
        let replacement = if let Some(condition) = condition_macro(&mut c, &["if"]) {
            format!("{{{{#if {condition}}}}}")
        } else if let Some(condition) = condition_macro(&mut c, &["elseif"])
            .or_else(|| condition_macro(&mut c, &["else", "if"]))
        {
            format!("{{{{else if {condition}}}}}")
        } else if bare_macro(&mut c, &["else"]) {
            "{{else}}".to_string()
        } else if bare_macro(&mut c, &["endif"])
            || bare_macro(&mut c, &["/endif"])
            || bare_macro(&mut c, &["/if"])
        {
            "{{/if}}".to_string()
        } else {
            return None;
        };
        Some((c.offset(), replacement))
    })
}

/// `<<print $name>>`, `<<= $name>>`, `<<- $name>>` → `{{name}}`.
fn print_macros(text: &str) -> String {
    replace_each(text, "<<", |s| {
        let mut c = Cursor::new(s);
        c.tag("<<")?;
        if c.keyword_ci("print").is_some() {
            c.ws1()?;
        } else if c.tag("=").is_some() || c.tag("-").is_some() {
            c.ws0();
        } else {
            return None;
        }
        let name = c.variable()?;
        c.ws0();
        c.tag(">>")?;
        Some((c.offset(), format!("{{{{{name}}}}}")))
    })
}

/// Macro name made of whitespace-separated `words`, then whitespace and a
/// condition running to `>>`. Advances `c` only on success.
fn condition_macro(c: &mut Cursor<'_>, words: &[&str]) -> Option<String> {
    let mut probe = *c;
    for word in words {
        probe.keyword_ci(word)?;
        probe.ws1()?;
    }
    let condition = translate_condition(probe.until('>')?)?;
    probe.tag(">>")?;
    *c = probe;
    Some(condition)
}

/// Macro with no arguments. Advances `c` only on success.
fn bare_macro(c: &mut Cursor<'_>, words: &[&str]) -> bool {
    let mut probe = *c;
    for word in words {
        if probe.tag_ci(word).is_none() {
            return false;
        }
    }
    probe.ws0();
    if probe.tag(">>").is_none() {
        return false;
    }
    *c = probe;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_both_spellings() {
        assert_eq!(
            convert("<<set $fuel to 100>>"),
            "{{script: game_state:set(\"fuel\", 100)}}"
        );
        assert_eq!(
            convert("<<SET $fuel = 100 >>"),
            "{{script: game_state:set(\"fuel\", 100)}}"
        );
        assert_eq!(
            convert("<<set $name to \"Alice\">>"),
            "{{script: game_state:set(\"name\", \"Alice\")}}"
        );
    }

    #[test]
    fn set_requires_spaced_operator() {
        assert_eq!(convert("<<set $x=1>>"), "<<set {{x}}=1>>");
        assert_eq!(convert("<<set $x to $y > 2>>"), "<<set {{x}} to {{y}} > 2>>");
    }

    #[test]
    fn set_then_interpolation() {
        assert_eq!(
            convert("<<set $fuel to 100>>\nFuel: $fuel"),
            "{{script: game_state:set(\"fuel\", 100)}}\nFuel: {{fuel}}"
        );
    }

    #[test]
    fn conditional_family() {
        assert_eq!(
            convert("<<if $a>>A<<elseif $b>>B<<else if $c>>C<<else>>D<<endif>>"),
            "{{#if a}}A{{else if b}}B{{else if c}}C{{else}}D{{/if}}"
        );
        assert_eq!(convert("<<IF $a>>x<</if>>"), "{{#if a}}x{{/if}}");
        assert_eq!(convert("<<if $a>>x<</endif>>"), "{{#if a}}x{{/if}}");
    }

    #[test]
    fn keyword_conditions_are_translated() {
        assert_eq!(
            convert("<<if $gold gte 10 and $gems gte 1>>rich<</if>>"),
            "{{#if gold >= 10 and gems >= 1}}rich{{/if}}"
        );
        assert_eq!(
            convert("<<if $name is \"Bob\" or $name is \"Ann\">>hi<</if>>"),
            "{{#if name == \"Bob\" or name == \"Ann\"}}hi{{/if}}"
        );
        assert_eq!(
            convert("<<if not $door>>closed<</if>>"),
            "{{#if not door}}closed{{/if}}"
        );
    }

    #[test]
    fn symbolic_gt_cannot_be_matched() {
        // The condition would run into the `>` of the operator.
        assert_eq!(convert("<<if $x > 5>>big<</if>>"), "<<if {{x}} > 5>>big{{/if}}");
    }

    #[test]
    fn print_forms() {
        assert_eq!(convert("<<print $gold>>"), "{{gold}}");
        assert_eq!(convert("<<= $gold>>"), "{{gold}}");
        assert_eq!(convert("<<-$gold>>"), "{{gold}}");
        assert_eq!(convert("<<print $gold + 1>>"), "<<print {{gold}} + 1>>");
    }

    #[test]
    fn unrelated_macros_survive() {
        assert_eq!(
            convert("<<link \"Go\" \"Room\">><</link>> <<iffy>> <<elsewhere>>"),
            "<<link \"Go\" \"Room\">><</link>> <<iffy>> <<elsewhere>>"
        );
    }

    #[test]
    fn conversion_is_idempotent() {
        let src = "<<set $hp to 10>><<if $hp gt 5>>Fine, $name<<else>>Hurt<</if>> <<print $hp>>";
        let once = convert(src);
        assert_eq!(convert(&once), once);
    }
}
