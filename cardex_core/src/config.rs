//! Tunables for the search pipeline.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub ngram: NgramConfig,

    #[serde(default)]
    pub fuzzy: FuzzyConfig,

    /// Name candidates within this many points of the best are kept.
    #[serde(default = "default_candidate_window")]
    pub candidate_window: u8,

    /// Matches at or above this confidence are always kept.
    #[serde(default = "default_strong_match")]
    pub strong_match_confidence: u8,

    /// Name candidates scoring below this are discarded.
    #[serde(default = "default_min_name_confidence")]
    pub min_name_confidence: u8,

    #[serde(default = "default_limit")]
    pub default_limit: usize,

    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Trimmed queries shorter than this never reach the pipeline.
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    #[serde(default = "default_enabled")]
    pub relaxation_enabled: bool,
}

const fn default_candidate_window() -> u8 {
    15
}
const fn default_strong_match() -> u8 {
    95
}
const fn default_min_name_confidence() -> u8 {
    60
}
const fn default_limit() -> usize {
    20
}
const fn default_max_limit() -> usize {
    100
}
const fn default_min_query_chars() -> usize {
    2
}
const fn default_enabled() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            ngram: NgramConfig::default(),
            fuzzy: FuzzyConfig::default(),
            candidate_window: default_candidate_window(),
            strong_match_confidence: default_strong_match(),
            min_name_confidence: default_min_name_confidence(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            min_query_chars: default_min_query_chars(),
            relaxation_enabled: true,
        }
    }
}

impl SearchConfig {
    /// Clamp a caller-supplied limit to `max_limit`. Zero stays zero.
    #[must_use]
    pub fn effective_limit(&self, requested: usize) -> usize {
        requested.min(self.max_limit)
    }
}

/// LRU capacity per entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "CacheConfig::default_players")]
    pub players: usize,
    #[serde(default = "CacheConfig::default_teams")]
    pub teams: usize,
    #[serde(default = "CacheConfig::default_series")]
    pub series: usize,
    #[serde(default = "CacheConfig::default_colors")]
    pub colors: usize,
}

impl CacheConfig {
    const fn default_players() -> usize {
        1000
    }
    const fn default_teams() -> usize {
        64
    }
    const fn default_series() -> usize {
        500
    }
    const fn default_colors() -> usize {
        128
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            players: Self::default_players(),
            teams: Self::default_teams(),
            series: Self::default_series(),
            colors: Self::default_colors(),
        }
    }
}

/// N-gram generation bounds for name lookups.
///
/// The character minimums and the single-word rule were tuned by hand and
/// are kept configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NgramConfig {
    #[serde(default = "NgramConfig::default_max_words")]
    pub max_words: usize,

    /// 1-word n-grams are only generated when the cleaned remainder has at
    /// most this many words.
    #[serde(default = "NgramConfig::default_single_word_max_remaining")]
    pub single_word_max_remaining: usize,

    #[serde(default = "NgramConfig::default_player_min_chars")]
    pub player_min_chars: usize,

    #[serde(default = "NgramConfig::default_team_min_chars")]
    pub team_min_chars: usize,

    #[serde(default = "NgramConfig::default_set_min_chars")]
    pub set_min_chars: usize,
}

impl NgramConfig {
    const fn default_max_words() -> usize {
        4
    }
    const fn default_single_word_max_remaining() -> usize {
        2
    }
    const fn default_player_min_chars() -> usize {
        3
    }
    const fn default_team_min_chars() -> usize {
        2
    }
    const fn default_set_min_chars() -> usize {
        3
    }
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self {
            max_words: Self::default_max_words(),
            single_word_max_remaining: Self::default_single_word_max_remaining(),
            player_min_chars: Self::default_player_min_chars(),
            team_min_chars: Self::default_team_min_chars(),
            set_min_chars: Self::default_set_min_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzyConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Edit-distance similarity needed for a fuzzy name match.
    #[serde(default = "FuzzyConfig::default_min_similarity")]
    pub min_similarity: f64,

    /// Accept Soundex-equal names at a lower similarity.
    #[serde(default = "default_enabled")]
    pub phonetic: bool,

    /// Suggestions are emitted when the top match scores below this.
    #[serde(default = "FuzzyConfig::default_suggestion_threshold")]
    pub suggestion_threshold: u8,

    #[serde(default = "FuzzyConfig::default_max_suggestions")]
    pub max_suggestions: usize,
}

impl FuzzyConfig {
    const fn default_min_similarity() -> f64 {
        0.75
    }
    const fn default_suggestion_threshold() -> u8 {
        70
    }
    const fn default_max_suggestions() -> usize {
        2
    }
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_similarity: Self::default_min_similarity(),
            phonetic: true,
            suggestion_threshold: Self::default_suggestion_threshold(),
            max_suggestions: Self::default_max_suggestions(),
        }
    }
}
