//! Shared machinery for the dialect converters.
//!
//! Each dialect is an ordered list of rules. A rule is applied to the whole
//! passage text (left to right, non-overlapping) before the next rule runs,
//! so later rules see the output of earlier ones. Rules never fail: text a
//! rule cannot match is copied through untouched.

/// The canonical state-write call emitted for variable assignments.
pub const STATE_WRITE: &str = "game_state:set";

/// A rewrite pass over the full passage text.
pub type Rule = fn(&str) -> String;

/// Run `rules` in order.
pub fn apply_rules(text: &str, rules: &[Rule]) -> String {
    rules.iter().fold(text.to_string(), |acc, rule| rule(&acc))
}

/// `{{script: game_state:set("<name>", <value>)}}`
pub fn state_write(name: &str, value: &str) -> String {
    format!("{{{{script: {STATE_WRITE}(\"{name}\", {value})}}}}")
}

/// Replace every match of `matcher` at positions where `trigger` occurs
/// (ASCII case-insensitive).
///
/// `matcher` receives the text starting at the trigger and returns the
/// number of bytes it consumed plus the replacement, or `None` to leave that
/// position alone and keep scanning after it.
pub fn replace_each<F>(text: &str, trigger: &str, mut matcher: F) -> String
where
    F: FnMut(&str) -> Option<(usize, String)>,
{
    let mut out = String::with_capacity(text.len());
    let mut copied_to = 0;
    let mut pos = 0;

    while let Some(at) = find_ci(text, trigger, pos) {
        match matcher(&text[at..]) {
            Some((len, replacement)) if len > 0 => {
                out.push_str(&text[copied_to..at]);
                out.push_str(&replacement);
                pos = at + len;
                copied_to = pos;
            }
            _ => pos = at + trigger.len(),
        }
    }

    out.push_str(&text[copied_to..]);
    out
}

/// ASCII case-insensitive substring search starting at `from`.
fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || from >= hay.len() || hay.len() - from < needle.len() {
        return None;
    }
    (from..=hay.len() - needle.len())
        .find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Catch-all: `$name` becomes `{{name}}`.
///
/// Text already inside a canonical `{{ ... }}` span is copied through, which
/// keeps state-write values unconverted and makes the rule idempotent.
pub fn bare_variables(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text;

    while let Some(i) = rest.find(['$', '{']) {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];

        if let Some(span) = tail.strip_prefix("{{") {
            if let Some(end) = span.find("}}") {
                let len = 2 + end + 2;
                out.push_str(&tail[..len]);
                rest = &tail[len..];
                continue;
            }
        } else if tail.starts_with('$') {
            let name_len = word_len(&tail[1..]);
            if name_len > 0 {
                out.push_str("{{");
                out.push_str(&tail[1..1 + name_len]);
                out.push_str("}}");
                rest = &tail[1 + name_len..];
                continue;
            }
        }

        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Length of the run of `[A-Za-z0-9_]` at the start of `s`.
fn word_len(s: &str) -> usize {
    s.bytes().take_while(|&b| is_word_byte(b)).count()
}

/// A backtrackable position in the text being matched.
///
/// Matchers take a copy, advance it piece by piece, and either commit the
/// consumed length or drop it.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Consume `lit` exactly.
    pub fn tag(&mut self, lit: &str) -> Option<()> {
        self.rest().starts_with(lit).then(|| self.pos += lit.len())
    }

    /// Consume `lit`, ignoring ASCII case.
    pub fn tag_ci(&mut self, lit: &str) -> Option<()> {
        let rest = self.rest().as_bytes();
        (rest.len() >= lit.len() && rest[..lit.len()].eq_ignore_ascii_case(lit.as_bytes()))
            .then(|| self.pos += lit.len())
    }

    /// Consume a keyword ignoring ASCII case, only if no word character
    /// follows it.
    pub fn keyword_ci(&mut self, kw: &str) -> Option<()> {
        let mut probe = *self;
        probe.tag_ci(kw)?;
        if probe.rest().bytes().next().is_some_and(is_word_byte) {
            return None;
        }
        *self = probe;
        Some(())
    }

    /// Skip any whitespace.
    pub fn ws0(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Skip at least one whitespace character.
    pub fn ws1(&mut self) -> Option<()> {
        let before = self.pos;
        self.ws0();
        (self.pos > before).then_some(())
    }

    /// Consume `$name`, returning `name`.
    pub fn variable(&mut self) -> Option<&'a str> {
        let rest = self.rest().strip_prefix('$')?;
        let len = word_len(rest);
        if len == 0 {
            return None;
        }
        self.pos += 1 + len;
        Some(&rest[..len])
    }

    /// Consume everything before the first `stop` without consuming `stop`.
    /// Fails when `stop` does not occur or the run is empty.
    pub fn until(&mut self, stop: char) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.find(stop)?;
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }
}

/// Operators the template evaluator recognizes, in the order it tries them.
const EVALUATOR_COMPARISONS: [&str; 6] = ["==", "!=", ">=", "<=", ">", "<"];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Atom(String),
    Compare(&'static str),
    Logic(&'static str),
    Not,
}

/// Rewrite a dialect condition into the template evaluator's grammar.
///
/// Accepts `$variables`, numbers, quoted strings, `true`/`false`, the
/// comparison keywords and symbols of both dialects, `and`/`or`/`&&`/`||`,
/// and `not`/`!` in front of a single operand. Returns `None` for anything
/// the evaluator would read differently than the source dialect does
/// (parentheses, arithmetic, calls, property access, mixed `and`/`or`,
/// negated comparisons), so the caller can leave the macro untouched.
pub fn translate_condition(src: &str) -> Option<String> {
    let tokens = tokenize(src)?;
    let mut iter = tokens.into_iter().peekable();
    let mut clauses: Vec<String> = Vec::new();
    let mut connective: Option<&'static str> = None;

    loop {
        let negated = iter.next_if_eq(&Token::Not).is_some();
        let Some(Token::Atom(lhs)) = iter.next() else {
            return None;
        };

        let clause = match iter.next_if(|t| matches!(t, Token::Compare(_))) {
            Some(Token::Compare(op)) => {
                if negated {
                    return None;
                }
                let Some(Token::Atom(rhs)) = iter.next() else {
                    return None;
                };
                format!("{lhs} {op} {rhs}")
            }
            _ if negated => format!("not {lhs}"),
            _ => lhs,
        };
        clauses.push(clause);

        match iter.next() {
            None => break,
            Some(Token::Logic(op)) => {
                if connective.is_some_and(|c| c != op) {
                    return None;
                }
                connective = Some(op);
            }
            Some(_) => return None,
        }
    }

    let Some(op) = connective else {
        return clauses.pop();
    };
    let joined = clauses.join(&format!(" {op} "));

    // The evaluator tries comparisons before splitting on `and`/`or`; an
    // operator occurring exactly once in the whole condition would be taken
    // as a comparison of the surrounding clauses.
    if EVALUATOR_COMPARISONS
        .iter()
        .any(|cmp| joined.matches(cmp).count() == 1)
    {
        return None;
    }
    Some(joined)
}

fn tokenize(src: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = src.trim();
    if rest.is_empty() {
        return None;
    }

    while !rest.is_empty() {
        let bytes = rest.as_bytes();
        let operand_expected = !matches!(tokens.last(), Some(Token::Atom(_)));

        let (token, len) = match bytes[0] {
            b'$' => {
                let len = word_len(&rest[1..]);
                if len == 0 {
                    return None;
                }
                (Token::Atom(rest[1..1 + len].to_string()), 1 + len)
            }
            q @ (b'"' | b'\'') => {
                let end = rest[1..].find(q as char)? + 1;
                let inner = &rest[1..end];
                if !string_is_safe(inner) {
                    return None;
                }
                (Token::Atom(rest[..=end].to_string()), end + 1)
            }
            b'0'..=b'9' | b'.' => number(rest)?,
            b'-' if operand_expected && bytes.get(1).is_some_and(u8::is_ascii_digit) => {
                let (token, len) = number(&rest[1..])?;
                let Token::Atom(digits) = token else {
                    return None;
                };
                (Token::Atom(format!("-{digits}")), len + 1)
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let len = word_len(rest);
                let word = &rest[..len];
                let token = match word {
                    "is" => {
                        let after = rest[len..].trim_start();
                        if after.starts_with("not")
                            && !after.as_bytes().get(3).copied().is_some_and(is_word_byte)
                        {
                            let skipped = rest.len() - after.len() + 3;
                            tokens.push(Token::Compare("!="));
                            rest = rest[skipped..].trim_start();
                            continue;
                        }
                        Token::Compare("==")
                    }
                    "eq" => Token::Compare("=="),
                    "isnot" | "neq" => Token::Compare("!="),
                    "gt" => Token::Compare(">"),
                    "gte" => Token::Compare(">="),
                    "lt" => Token::Compare("<"),
                    "lte" => Token::Compare("<="),
                    "and" => Token::Logic("and"),
                    "or" => Token::Logic("or"),
                    "not" => Token::Not,
                    "true" | "false" => Token::Atom(word.to_string()),
                    _ => return None,
                };
                (token, len)
            }
            _ => symbol(rest)?,
        };

        tokens.push(token);
        rest = rest[len..].trim_start();
    }
    Some(tokens)
}

fn number(s: &str) -> Option<(Token, usize)> {
    let len = s
        .bytes()
        .take_while(|b| b.is_ascii_digit() || *b == b'.')
        .count();
    let literal = &s[..len];
    if s.as_bytes().get(len).copied().is_some_and(is_word_byte) {
        return None;
    }
    whisker_core::story::parse_decimal(literal)?;
    Some((Token::Atom(literal.to_string()), len))
}

fn symbol(s: &str) -> Option<(Token, usize)> {
    const SYMBOLS: [(&str, Token); 11] = [
        ("===", Token::Compare("==")),
        ("!==", Token::Compare("!=")),
        ("==", Token::Compare("==")),
        ("!=", Token::Compare("!=")),
        (">=", Token::Compare(">=")),
        ("<=", Token::Compare("<=")),
        ("&&", Token::Logic("and")),
        ("||", Token::Logic("or")),
        (">", Token::Compare(">")),
        ("<", Token::Compare("<")),
        ("!", Token::Not),
    ];
    SYMBOLS
        .iter()
        .find(|(sym, _)| s.starts_with(sym))
        .map(|(sym, token)| (token.clone(), sym.len()))
}

/// Quoted strings must not contain anything the evaluator would split on.
fn string_is_safe(inner: &str) -> bool {
    !inner.contains(['=', '<', '>', '!', '{', '}', '"', '\''])
        && !inner.contains(" and ")
        && !inner.contains(" or ")
}
