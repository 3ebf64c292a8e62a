use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static ESCAPE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B\[[0-9;]*[mK]").unwrap_or_else(|e| panic!("escape pattern: {e}"))
});

pub fn strip_escapes(text: &str) -> Cow<'_, str> {
    ESCAPE_SEQUENCE.replace_all(text, "")
}

/// Strips color sequences and composes the text to NFC so that the same path
/// typed with precomposed or combining diacritics matches identically.
pub fn sanitize(text: &str) -> String {
    strip_escapes(text).nfc().collect()
}
