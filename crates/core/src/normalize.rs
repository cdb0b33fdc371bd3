//! Text cleaning for scraped slide content.
//!
//! Page text often carries stray control characters and ragged
//! whitespace from the markup. Everything that ends up in a title,
//! author line, or speaker note goes through [`clean_text`].

use regex::Regex;
use std::sync::LazyLock;

/// C0 and C1 control characters, including DEL.
static CONTROL_CHAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{0000}-\x{001F}\x{007F}-\x{009F}]").unwrap());

/// Runs of any Unicode whitespace.
static WHITESPACE_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Clean a piece of scraped text.
///
/// - Replaces control characters with a space
/// - Collapses whitespace runs to single spaces
/// - Trims leading/trailing whitespace
///
/// Cleaning is idempotent: `clean_text(&clean_text(s)) == clean_text(s)`.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let without_controls = CONTROL_CHAR_REGEX.replace_all(text, " ");
    WHITESPACE_RUN_REGEX
        .replace_all(&without_controls, " ")
        .trim()
        .to_string()
}

/// Keep at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
