//! Abbreviation expansion, edit-distance fallback and suggestions.

pub mod abbreviations;
pub mod distance;

use cardex_core::{
    FuzzyConfig, PlayerCandidate, PlayerToken, SetToken, Token, TokenSet, push_unique,
};
use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::extraction::TokenExtractor;
use crate::extraction::lookup::cached_lookup;
use crate::extraction::names::{NameContext, player_token};
use crate::extraction::vocabulary;

/// Shortest residual word worth a fuzzy lookup.
const FUZZY_MIN_WORD_CHARS: usize = 4;
const FUZZY_PREFIX_CHARS: usize = 3;
const FUZZY_SCALE: f64 = 80.0;
const PHONETIC_CONFIDENCE: u8 = 55;
const PHONETIC_MIN_SIMILARITY: f64 = 0.5;

/// Second-chance matching for queries the exact extractors missed.
pub struct FuzzyEnhancer {
    config: FuzzyConfig,
}

impl FuzzyEnhancer {
    #[must_use]
    pub const fn new(config: FuzzyConfig) -> Self {
        Self { config }
    }

    /// Improve `tokens` in place.
    ///
    /// The query is re-extracted with shorthands expanded and the expanded
    /// player/team/set tokens replace the current ones only when strictly more
    /// confident. If no player was found at all, residual words are matched
    /// by edit distance and Soundex.
    pub async fn enhance(&self, extractor: &TokenExtractor, query: &str, tokens: &mut TokenSet) {
        if !self.config.enabled {
            return;
        }

        if let Some(expanded) = abbreviations::expand_query(query) {
            debug!("Re-extracting with abbreviations expanded: '{}'", expanded);
            let alternative = extractor.extract_raw(&expanded).await;
            adopt_if_stronger("player", &mut tokens.players, alternative.players);
            adopt_if_stronger("team", &mut tokens.teams, alternative.teams);
            adopt_if_stronger("set", &mut tokens.sets, alternative.sets);
        }

        if tokens.players.is_empty() {
            match self.fallback_players(extractor, query, tokens).await {
                Ok(found) => tokens.players = found,
                Err(e) => warn!("Fuzzy player lookup failed: {:#}", e),
            }
        }
    }

    async fn fallback_players(
        &self,
        extractor: &TokenExtractor,
        query: &str,
        tokens: &TokenSet,
    ) -> anyhow::Result<Vec<Token<PlayerToken>>> {
        let claimed: Vec<&str> = tokens
            .teams
            .iter()
            .map(|t| t.matched_span.as_str())
            .chain(tokens.sets.iter().map(|t| t.matched_span.as_str()))
            .chain(tokens.inserts.iter().map(|t| t.matched_span.as_str()))
            .collect();
        let context = NameContext::build(query, tokens);
        let residual: Vec<&String> = context
            .words()
            .iter()
            .filter(|w| w.chars().count() >= FUZZY_MIN_WORD_CHARS)
            .filter(|w| !vocabulary::is_color_word(w))
            .filter(|w| {
                !claimed
                    .iter()
                    .any(|span| span.split_whitespace().any(|s| s == w.as_str()))
            })
            .collect();
        if residual.is_empty() {
            return Ok(Vec::new());
        }

        let repo = extractor.repository();
        let cache = extractor.caches().players.as_ref();
        let lookups = try_join_all(residual.iter().map(|word| async move {
            let prefix: String = word.chars().take(FUZZY_PREFIX_CHARS).collect();
            let candidates = cached_lookup(repo, cache, &prefix).await?;
            anyhow::Ok((*word, candidates))
        }))
        .await?;

        let mut found = Vec::new();
        for (word, candidates) in lookups {
            for candidate in candidates.iter() {
                if let Some(confidence) = self.fuzzy_confidence(word, candidate) {
                    push_unique(
                        &mut found,
                        Token::new(player_token(candidate), confidence, word.as_str()),
                    );
                }
            }
        }
        found.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then_with(|| a.value.player_id.cmp(&b.value.player_id))
        });
        if let Some(best) = found.first().map(|t| t.confidence) {
            let window = extractor.config().candidate_window;
            found.retain(|t| t.confidence.saturating_add(window) >= best);
        }
        debug!("Fuzzy fallback matched {} player(s)", found.len());
        Ok(found)
    }

    fn fuzzy_confidence(&self, word: &str, candidate: &PlayerCandidate) -> Option<u8> {
        let names = [
            Some(candidate.last_name.as_str()),
            Some(candidate.first_name.as_str()),
            candidate.nickname.as_deref(),
        ];
        let best = names
            .iter()
            .flatten()
            .map(|name| distance::similarity(word, name))
            .fold(0.0_f64, f64::max);

        if best >= self.config.min_similarity {
            return Some(scaled_confidence(best));
        }
        let phonetic = self.config.phonetic
            && best >= PHONETIC_MIN_SIMILARITY
            && names
                .iter()
                .flatten()
                .any(|name| distance::sounds_alike(word, name));
        phonetic.then_some(PHONETIC_CONFIDENCE)
    }

    /// "Did you mean" hints naming the alternates of a weak top player or
    /// set match. A weak match without alternates gets no hint.
    #[must_use]
    pub fn suggestions(&self, tokens: &TokenSet, query: &str) -> Vec<String> {
        if !self.config.enabled || self.config.max_suggestions == 0 {
            return Vec::new();
        }
        let query = query.trim().to_lowercase();
        let threshold = self.config.suggestion_threshold;
        let names = alternates(&tokens.players, threshold, |t| t.value.full_name.as_str())
            .into_iter()
            .chain(alternates(&tokens.sets, threshold, set_label));

        let mut suggestions: Vec<String> = Vec::new();
        for name in names {
            if name.to_lowercase() == query {
                continue;
            }
            let suggestion = format!("Did you mean {name}?");
            if !suggestions.contains(&suggestion) {
                suggestions.push(suggestion);
            }
            if suggestions.len() == self.config.max_suggestions {
                break;
            }
        }
        suggestions
    }
}

fn set_label(token: &Token<SetToken>) -> &str {
    token.value.series_name.as_str()
}

/// Labels of every token except the top one, strongest first, when the top
/// token is below `threshold`.
fn alternates<'a, T>(
    tokens: &'a [Token<T>],
    threshold: u8,
    label: impl Fn(&'a Token<T>) -> &'a str,
) -> Vec<&'a str> {
    let Some(best) = tokens.iter().map(|t| t.confidence).max() else {
        return Vec::new();
    };
    if best >= threshold {
        return Vec::new();
    }
    let Some(top) = tokens.iter().position(|t| t.confidence == best) else {
        return Vec::new();
    };
    let top_label = label(&tokens[top]);

    let mut rest: Vec<&Token<T>> = tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != top)
        .map(|(_, t)| t)
        .collect();
    rest.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    rest.into_iter()
        .map(label)
        .filter(|name| *name != top_label)
        .collect()
}

fn adopt_if_stronger<T>(facet: &str, current: &mut Vec<Token<T>>, expanded: Vec<Token<T>>) {
    let best = |tokens: &[Token<T>]| tokens.iter().map(|t| t.confidence).max();
    if let Some(candidate) = best(expanded.as_slice())
        && best(current.as_slice()).is_none_or(|existing| candidate > existing)
    {
        debug!("Adopting expanded {} tokens (confidence {})", facet, candidate);
        *current = expanded;
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_confidence(similarity: f64) -> u8 {
    (similarity.clamp(0.0, 1.0) * FUZZY_SCALE).round() as u8
}
