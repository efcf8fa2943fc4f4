//! Text helpers shared by extraction and lookups.

use chrono::Datelike;

/// Earliest year a card can carry.
pub const MIN_CARD_YEAR: i32 = 1887;

/// Latest year accepted: two years past the current one.
#[must_use]
pub fn max_card_year() -> i32 {
    chrono::Utc::now().year() + 2
}

/// Normalize a lookup fragment into a cache key: lowercase, single spaces.
#[must_use]
pub fn normalize_key(fragment: &str) -> String {
    fragment
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split text into lowercase words, trimming surrounding punctuation.
#[must_use]
pub fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '&'))
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Byte offsets of every word-bounded occurrence of `needle` in `haystack`.
///
/// Boundaries are only enforced on the sides where the needle itself starts
/// or ends with a word character, so spans like `/25` still match `kwan/25`.
#[must_use]
pub fn phrase_positions(haystack: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    let check_left = needle.chars().next().is_some_and(is_word_char);
    let check_right = needle.chars().last().is_some_and(is_word_char);

    let mut positions = Vec::new();
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        let end = start + needle.len();
        let left_ok = !check_left || !haystack[..start].chars().last().is_some_and(is_word_char);
        let right_ok = !check_right || !haystack[end..].chars().next().is_some_and(is_word_char);
        if left_ok && right_ok {
            positions.push(start);
        }
        from = start + needle.chars().next().map_or(1, char::len_utf8);
    }
    positions
}

/// Whether `needle` occurs in `haystack` as a whole word or phrase.
#[must_use]
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    !phrase_positions(haystack, needle).is_empty()
}

/// Replace every word-bounded occurrence of `needle` with spaces.
#[must_use]
pub fn remove_phrase(haystack: &str, needle: &str) -> String {
    let positions = phrase_positions(haystack, needle);
    if positions.is_empty() {
        return haystack.to_string();
    }
    let mut out = haystack.to_string();
    for start in positions.into_iter().rev() {
        out.replace_range(start..start + needle.len(), &" ".repeat(needle.len()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_key("  Mike   TROUT "), "mike trout");
    }

    #[test]
    fn words_trim_punctuation() {
        assert_eq!(words("Trout, #27 (RC)!"), vec!["trout", "27", "rc"]);
    }

    #[test]
    fn phrase_respects_word_boundaries() {
        assert!(contains_phrase("evan white rc", "white"));
        assert!(!contains_phrase("whitener", "white"));
        assert!(contains_phrase("short print auto", "short print"));
        assert!(contains_phrase("kwan/25", "/25"));
        assert!(!contains_phrase("/250", "/25"));
    }

    #[test]
    fn remove_phrase_preserves_length() {
        let out = remove_phrase("trout rc 2011", "rc");
        assert_eq!(out.len(), "trout rc 2011".len());
        assert_eq!(words(&out), vec!["trout", "2011"]);
    }

    #[test]
    fn max_year_is_in_the_future() {
        assert!(max_card_year() > 2024);
    }
}
