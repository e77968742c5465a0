//! Condition expressions inside `{{#if ...}}` and `{{else if ...}}` markers.
//!
//! This is deliberately not an operator-precedence parser. A condition is
//! checked against a fixed sequence of shapes and the first shape that fits
//! decides the meaning:
//!
//! 1. a comparison (`==`, `!=`, `>=`, `<=`, `>`, `<`, in that order) whose
//!    operator occurs exactly once with non-empty operands,
//! 2. a conjunction split on `" and "`,
//! 3. a disjunction split on `" or "`,
//! 4. a negation prefixed by `not ` or `!`,
//! 5. a bare variable name, judged by truthiness.
//!
//! Mixing `and` with `or` therefore groups as "split on `and` first", which
//! existing stories rely on.

use crate::story::{parse_decimal, Value, VariableEnv};

/// Evaluate a condition against a variable environment.
///
/// Never fails: undefined variables are falsy, and anything unrecognized
/// falls through to a variable lookup.
pub fn evaluate(condition: &str, env: &dyn VariableEnv) -> bool {
    let condition = condition.trim();
    if condition.is_empty() {
        return false;
    }

    for cmp in Comparison::ALL {
        if let Some((lhs, rhs)) = split_comparison(condition, cmp.symbol()) {
            let lhs = Operand::resolve(lhs, env);
            let rhs = Operand::resolve(rhs, env);
            return cmp.apply(&lhs, &rhs);
        }
    }

    if condition.contains(" and ") {
        return condition.split(" and ").all(|part| evaluate(part, env));
    }

    if condition.contains(" or ") {
        return condition.split(" or ").any(|part| evaluate(part, env));
    }

    if let Some(inner) = strip_negation(condition) {
        return !evaluate(inner, env);
    }

    env.get(condition).is_some_and(Value::is_truthy)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

impl Comparison {
    /// Checked in this order: two-character operators before the
    /// one-character operators they contain.
    const ALL: [Comparison; 6] = [
        Comparison::Eq,
        Comparison::Ne,
        Comparison::Ge,
        Comparison::Le,
        Comparison::Gt,
        Comparison::Lt,
    ];

    fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
        }
    }

    fn apply(self, lhs: &Operand, rhs: &Operand) -> bool {
        match self {
            Comparison::Eq => loose_eq(lhs, rhs),
            Comparison::Ne => !loose_eq(lhs, rhs),
            Comparison::Ge => lhs.to_number() >= rhs.to_number(),
            Comparison::Le => lhs.to_number() <= rhs.to_number(),
            Comparison::Gt => lhs.to_number() > rhs.to_number(),
            Comparison::Lt => lhs.to_number() < rhs.to_number(),
        }
    }
}

/// Split `condition` around `op` when it occurs exactly once and both sides
/// are non-empty after trimming.
fn split_comparison<'a>(condition: &'a str, op: &str) -> Option<(&'a str, &'a str)> {
    if condition.matches(op).count() != 1 {
        return None;
    }
    let (lhs, rhs) = condition.split_once(op)?;
    let (lhs, rhs) = (lhs.trim(), rhs.trim());
    if lhs.is_empty() || rhs.is_empty() {
        return None;
    }
    Some((lhs, rhs))
}

/// `not x` / `!x` → `x`. A `not ` prefix is removed first, then a single `!`.
fn strip_negation(condition: &str) -> Option<&str> {
    if !(condition.starts_with("not ") || condition.starts_with('!')) {
        return None;
    }
    let mut inner = condition;
    if let Some(rest) = inner.strip_prefix("not") {
        if rest.starts_with(char::is_whitespace) {
            inner = rest.trim_start();
        }
    }
    Some(inner.strip_prefix('!').unwrap_or(inner))
}

/// One side of a comparison after resolution.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Undefined,
    Bool(bool),
    Num(f64),
    Str(String),
}

impl Operand {
    /// Quoted string, then number, then boolean literal, then variable.
    fn resolve(raw: &str, env: &dyn VariableEnv) -> Operand {
        let raw = raw.trim();

        if let Some(quoted) = strip_quotes(raw) {
            return Operand::Str(quoted.to_string());
        }

        let n = to_number(raw);
        if !n.is_nan() {
            return Operand::Num(n);
        }

        match raw {
            "true" => Operand::Bool(true),
            "false" => Operand::Bool(false),
            name => match env.get(name) {
                Some(Value::Bool(b)) => Operand::Bool(*b),
                Some(Value::Num(n)) => Operand::Num(*n),
                Some(Value::Str(s)) => Operand::Str(s.clone()),
                None => Operand::Undefined,
            },
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Operand::Undefined => f64::NAN,
            Operand::Bool(b) => bool_to_number(*b),
            Operand::Num(n) => *n,
            Operand::Str(s) => to_number(s),
        }
    }
}

fn strip_quotes(raw: &str) -> Option<&str> {
    for quote in ['"', '\''] {
        if raw.starts_with(quote) && raw.ends_with(quote) {
            // A lone quote character is both the opener and the closer.
            return Some(raw.get(1..raw.len() - 1).unwrap_or(""));
        }
    }
    None
}

fn bool_to_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Loose equality: mixed number/string compares numerically, booleans
/// compare as 0/1, and undefined only equals undefined.
fn loose_eq(lhs: &Operand, rhs: &Operand) -> bool {
    match (lhs, rhs) {
        (Operand::Undefined, Operand::Undefined) => true,
        (Operand::Undefined, _) | (_, Operand::Undefined) => false,
        (Operand::Bool(a), Operand::Bool(b)) => a == b,
        (Operand::Num(a), Operand::Num(b)) => a == b,
        (Operand::Str(a), Operand::Str(b)) => a == b,
        (Operand::Bool(a), other) => loose_eq(&Operand::Num(bool_to_number(*a)), other),
        (other, Operand::Bool(b)) => loose_eq(other, &Operand::Num(bool_to_number(*b))),
        (Operand::Num(n), Operand::Str(s)) | (Operand::Str(s), Operand::Num(n)) => {
            *n == to_number(s)
        }
    }
}

/// String-to-number coercion: blank is 0, `Infinity` and radix-prefixed
/// integers are accepted, anything else that is not a plain decimal literal
/// is `NaN`.
fn to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }

    let (sign, body) = match s.as_bytes()[0] {
        b'+' => (1.0, &s[1..]),
        b'-' => (-1.0, &s[1..]),
        _ => (1.0, s),
    };
    if body == "Infinity" {
        return sign * f64::INFINITY;
    }
    parse_decimal(s).unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0.0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => value = value * f64::from(radix) + f64::from(d),
            None => return f64::NAN,
        }
    }
    value
}
