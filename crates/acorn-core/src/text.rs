//! Token normalization and output truncation helpers.
//!
//! Every user-supplied token (command names, runner aliases, language
//! aliases, help arguments) goes through the same NFKC + case-fold pass
//! before lookup, so full-width forms and mixed case resolve the same as
//! their plain ASCII spellings.

use unicode_normalization::UnicodeNormalization;

/// Marker appended to truncated output and over-long echoed tokens.
pub const ELLIPSIS: &str = "…";

/// NFKC-normalizes and lowercases a token for exact alias lookup.
pub fn normalize_token(token: &str) -> String {
    token.nfkc().collect::<String>().to_lowercase()
}

/// Truncates `text` to at most `limit` bytes, appending [`ELLIPSIS`] when
/// anything was cut. The cut never splits a character, so the kept prefix
/// may fall short of `limit` by up to three bytes on multi-byte input.
pub fn truncate_bytes(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &text[..end], ELLIPSIS)
}

/// Truncates a token echoed back in an error message to `limit` characters.
pub fn truncate_chars(token: &str, limit: usize) -> String {
    if token.chars().count() <= limit {
        return token.to_string();
    }
    let kept: String = token.chars().take(limit).collect();
    format!("{}{}", kept, ELLIPSIS)
}
