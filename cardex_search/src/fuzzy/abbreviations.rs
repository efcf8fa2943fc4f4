use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Single-word shorthands collectors type, mapped to the catalog's wording.
static ABBREVIATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Sets and manufacturers
        ("bc", "bowman chrome"),
        ("bdc", "bowman draft chrome"),
        ("bcp", "bowman chrome prospects"),
        ("tc", "topps chrome"),
        ("ud", "upper deck"),
        ("gq", "gypsy queen"),
        ("opc", "o-pee-chee"),
        ("chr", "chrome"),
        ("ref", "refractor"),
        ("prosp", "prospects"),
        // Teams
        ("nyy", "new york yankees"),
        ("bos", "boston red sox"),
        ("lad", "los angeles dodgers"),
        ("sf", "san francisco giants"),
        ("cle", "cleveland guardians"),
        ("stl", "st louis cardinals"),
        // Ordinals
        ("1st", "first"),
        ("2nd", "second"),
        ("3rd", "third"),
    ])
});

#[must_use]
pub fn lookup(word: &str) -> Option<&'static str> {
    ABBREVIATIONS.get(word).copied()
}

/// Substitute every known shorthand; `None` when nothing was expanded.
/// Unknown words pass through lowercased.
#[must_use]
pub fn expand_query(query: &str) -> Option<String> {
    let mut expanded = false;
    let words: Vec<String> = query
        .split_whitespace()
        .map(|raw| {
            let word = raw.to_lowercase();
            lookup(&word).map_or(word, |replacement| {
                expanded = true;
                replacement.to_string()
            })
        })
        .collect();
    expanded.then(|| words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_words_only() {
        assert_eq!(
            expand_query("Kwan BC 2020 ref").as_deref(),
            Some("kwan bowman chrome 2020 refractor")
        );
        assert_eq!(expand_query("trout 2011 update"), None);
    }

    #[test]
    fn expansion_is_word_level() {
        assert_eq!(expand_query("bcp-50"), None);
        assert_eq!(lookup("nyy"), Some("new york yankees"));
    }
}
