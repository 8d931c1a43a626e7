use std::sync::LazyLock;

use regex::Regex;

use super::AnnotatedSpan;

// Dotted abbreviations ("U.S."), clock times ("9:30pm"), word runs,
// clitics split off as their own unit ("Canada" + "'s"), then any single
// non-space symbol.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\p{L}\.){2,}|\d{1,2}:\d{2}(?:[aApP][mM])?|[\p{L}\p{N}]+|['’](?i:s|re|ve|ll|d|m|t)\b|[^\s\p{L}\p{N}]",
    )
    .unwrap()
});

/// Split text into unannotated units with byte offsets.
pub fn tokenize(text: &str) -> Vec<AnnotatedSpan> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| AnnotatedSpan::new(m.as_str(), m.start(), m.end()))
        .collect()
}

pub fn is_word(unit: &AnnotatedSpan) -> bool {
    unit.text.chars().next().is_some_and(|c| c.is_alphanumeric())
}
