//! Identifier generation: passage ids derived from display names, and IFIDs.

use rand::Rng;
use uuid::Uuid;

/// Maximum length of a derived passage id.
pub const MAX_PASSAGE_ID_LEN: usize = 50;

const FALLBACK_PREFIX: &str = "passage_";
const FALLBACK_SUFFIX_LEN: usize = 9;

/// Derive a passage id from a display name.
///
/// Lowercases the name, collapses every run of characters outside `[a-z0-9]`
/// into a single `_`, strips leading and trailing `_`, and keeps at most
/// [`MAX_PASSAGE_ID_LEN`] characters. Names with nothing usable get a random
/// `passage_xxxxxxxxx` id.
///
/// The mapping is not injective: `"A b"` and `"a-b"` both become `a_b`.
pub fn passage_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            id.push(c);
            in_run = false;
        } else if !in_run {
            id.push('_');
            in_run = true;
        }
    }

    let trimmed = id.trim_matches('_');
    // Only ASCII remains, so byte and char lengths agree.
    let truncated = &trimmed[..trimmed.len().min(MAX_PASSAGE_ID_LEN)];
    if truncated.is_empty() {
        fallback_passage_id()
    } else {
        truncated.to_string()
    }
}

/// `passage_` followed by nine random base-36 digits.
fn fallback_passage_id() -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..FALLBACK_SUFFIX_LEN)
        .map(|_| DIGITS[rng.gen_range(0..DIGITS.len())] as char)
        .collect();
    format!("{FALLBACK_PREFIX}{suffix}")
}

/// Generate a fresh Interactive Fiction IDentifier: an uppercase UUID v4.
pub fn generate_ifid() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}
