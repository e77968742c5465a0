use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A story variable value.
///
/// Stories only ever hold booleans, numbers, and strings. The type is decided
/// once, from the literal that introduced the variable, and carried alongside
/// the value in [`VariableDecl`] rather than re-inferred on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Num(f64),
    Str(String),
}

/// Type tag for a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Number,
    String,
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Boolean,
            Value::Num(_) => ValueType::Number,
            Value::Str(_) => ValueType::String,
        }
    }

    /// Truthiness as seen by a bare `{{#if name}}` condition.
    ///
    /// Numbers are truthy when nonzero (so `NaN` counts as truthy), strings
    /// when nonempty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
        })
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Num(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Stringify a number the way story scripts print it: integral values have
/// no fractional part, non-finite values use their script names.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let name = if n > 0.0 { "Infinity" } else { "-Infinity" };
        name.to_string()
    } else if n == 0.0 {
        // Covers -0.0 as well.
        "0".to_string()
    } else {
        format!("{n}")
    }
}

/// Parse a plain decimal literal (`42`, `-1.5`, `.5`, `3e2`).
///
/// Unlike `f64::from_str`, rejects `inf`, `NaN`, and surrounding text.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return None;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }

    if i != bytes.len() {
        return None;
    }
    s.parse().ok()
}

/// A declared story variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub initial: Value,
    #[serde(rename = "type")]
    pub ty: ValueType,
    #[serde(default)]
    pub description: String,
}

impl VariableDecl {
    /// Declare a variable, tagging it with the type of its initial value.
    pub fn new(initial: Value, description: impl Into<String>) -> Self {
        Self {
            ty: initial.value_type(),
            initial,
            description: description.into(),
        }
    }
}

/// A flat variable environment keyed by name.
pub type Variables = BTreeMap<String, Value>;

/// Read/write access to variables by name.
///
/// The template evaluator reads through this trait, and script runtimes
/// write through it. Implemented for the standard map types so any flat
/// string-keyed map can serve as an environment.
pub trait VariableEnv {
    fn get(&self, name: &str) -> Option<&Value>;
    fn set(&mut self, name: &str, value: Value);
}

impl VariableEnv for BTreeMap<String, Value> {
    fn get(&self, name: &str) -> Option<&Value> {
        BTreeMap::get(self, name)
    }

    fn set(&mut self, name: &str, value: Value) {
        self.insert(name.to_string(), value);
    }
}

impl<S: std::hash::BuildHasher> VariableEnv for HashMap<String, Value, S> {
    fn get(&self, name: &str) -> Option<&Value> {
        HashMap::get(self, name)
    }

    fn set(&mut self, name: &str, value: Value) {
        self.insert(name.to_string(), value);
    }
}
