//! Closed vocabularies: card types, colour/finish names, design keywords.

use cardex_core::CardTypeFlags;
use cardex_core::util::contains_phrase;

pub const ROOKIE: &[&str] = &["rookie", "rookies", "rc", "rk"];
pub const AUTOGRAPH: &[&str] = &[
    "autographs",
    "autographed",
    "autograph",
    "autos",
    "auto",
    "signed",
    "signature",
];
pub const SHORT_PRINT: &[&str] = &["short print", "short-print", "shortprint", "ssp", "sp"];
pub const RELIC: &[&str] = &[
    "relics",
    "relic",
    "patch",
    "jersey",
    "memorabilia",
    "mem",
    "swatch",
];

pub const COLOR_KEYWORDS: &[&str] = &[
    "red", "blue", "green", "gold", "orange", "purple", "pink", "black", "white", "silver",
    "yellow", "aqua", "teal", "bronze", "sepia", "refractor", "prizm", "xfractor", "atomic",
    "mojo", "shimmer", "wave", "speckle", "lava", "sapphire", "magenta", "platinum", "rainbow",
    "camo", "negative",
];

pub const DESIGN_KEYWORDS: &[&str] = &[
    "image variation",
    "printing plate",
    "stained glass",
    "vintage",
    "retro",
    "holo",
    "foil",
    "variation",
    "sketch",
    "throwback",
    "logo",
];

/// Filler words never worth a name lookup on their own.
pub const NOISE_WORDS: &[&str] = &["card", "cards", "the", "a", "of", "and", "lot"];

/// Every card-type phrase across the four vocabularies.
pub fn all_card_type_phrases() -> impl Iterator<Item = &'static str> {
    [ROOKIE, AUTOGRAPH, SHORT_PRINT, RELIC]
        .into_iter()
        .flat_map(|vocab| vocab.iter().copied())
}

/// First hit in a vocabulary, if any.
fn first_hit(lower: &str, vocab: &[&'static str]) -> Option<&'static str> {
    vocab.iter().copied().find(|p| contains_phrase(lower, p))
}

/// Card-type flags plus the phrases that set them.
#[must_use]
pub fn detect_card_types(query: &str) -> (CardTypeFlags, Vec<&'static str>) {
    let lower = query.to_lowercase();
    let rookie = first_hit(&lower, ROOKIE);
    let autograph = first_hit(&lower, AUTOGRAPH);
    let short_print = first_hit(&lower, SHORT_PRINT);
    let relic = first_hit(&lower, RELIC);

    let flags = CardTypeFlags {
        rookie: rookie.is_some(),
        autograph: autograph.is_some(),
        short_print: short_print.is_some(),
        relic: relic.is_some(),
    };
    let spans = [rookie, autograph, short_print, relic]
        .into_iter()
        .flatten()
        .collect();
    (flags, spans)
}

/// Colour keywords present in the query, in vocabulary order.
#[must_use]
pub fn matched_colors(query: &str) -> Vec<&'static str> {
    let lower = query.to_lowercase();
    COLOR_KEYWORDS
        .iter()
        .copied()
        .filter(|c| contains_phrase(&lower, c))
        .collect()
}

/// Design keywords present in the query. A multi-word keyword hides the
/// single words it contains ("image variation" does not also yield
/// "variation").
#[must_use]
pub fn matched_keywords(query: &str) -> Vec<&'static str> {
    let lower = query.to_lowercase();
    let mut found: Vec<&'static str> = Vec::new();
    for keyword in DESIGN_KEYWORDS.iter().copied() {
        if contains_phrase(&lower, keyword)
            && !found.iter().any(|f| contains_phrase(f, keyword))
        {
            found.push(keyword);
        }
    }
    found
}

#[must_use]
pub fn is_color_word(word: &str) -> bool {
    COLOR_KEYWORDS.contains(&word)
}

#[must_use]
pub fn is_noise_word(word: &str) -> bool {
    NOISE_WORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_types_are_independent_flags() {
        let (flags, spans) = detect_card_types("Trout RC auto patch /25");
        assert!(flags.rookie);
        assert!(flags.autograph);
        assert!(flags.relic);
        assert!(!flags.short_print);
        assert_eq!(spans, vec!["rc", "auto", "patch"]);
    }

    #[test]
    fn card_types_respect_word_boundaries() {
        let (flags, _) = detect_card_types("sprague memphis");
        assert!(!flags.any());

        let (flags, spans) = detect_card_types("judge short print");
        assert!(flags.short_print);
        assert_eq!(spans, vec!["short print"]);
    }

    #[test]
    fn colors_in_vocabulary_order() {
        assert_eq!(matched_colors("gold pink refractor"), vec!["gold", "pink", "refractor"]);
        assert!(matched_colors("goldschmidt").is_empty());
    }

    #[test]
    fn longer_keyword_hides_contained_word() {
        assert_eq!(matched_keywords("image variation trout"), vec!["image variation"]);
        assert_eq!(matched_keywords("vintage logo"), vec!["vintage", "logo"]);
    }
}
