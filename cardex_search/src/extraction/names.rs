//! N-gram name matching for players, teams, sets and insert series.

use cardex_core::util::{remove_phrase, words};
use cardex_core::{
    EntityRepository, Identity, InsertToken, LookupCache, NgramConfig, PlayerCandidate,
    PlayerToken, SearchConfig, SeriesCandidate, SetToken, TeamCandidate, TeamToken, Token,
    TokenSet, YearToken,
};
use futures::future::try_join_all;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::lookup::{NameLookup, cached_lookup};
use super::vocabulary;

const HALL_OF_FAME_BONUS: u8 = 3;
const POPULAR_BONUS: u8 = 2;
const POPULAR_CARD_COUNT: u32 = 500;
const MAX_LENGTH_BONUS: u8 = 6;
const SET_YEAR_BONUS: u8 = 3;

/// Query text left over for name lookups once pattern tokens and
/// vocabulary phrases are stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameContext {
    words: Vec<String>,
}

impl NameContext {
    /// Strip the spans of pattern tokens, card-type phrases, design keywords
    /// and noise words. Colour words stay: they may be part of a name.
    #[must_use]
    pub fn build(query: &str, pattern_tokens: &TokenSet) -> Self {
        let mut text = query.to_lowercase();

        let spans = pattern_tokens
            .card_numbers
            .iter()
            .map(|t| &t.matched_span)
            .chain(pattern_tokens.years.iter().map(|t| &t.matched_span))
            .chain(pattern_tokens.serials.iter().map(|t| &t.matched_span))
            .chain(pattern_tokens.production_codes.iter().map(|t| &t.matched_span));
        for span in spans {
            text = remove_phrase(&text, &span.to_lowercase());
        }
        for phrase in vocabulary::all_card_type_phrases()
            .chain(vocabulary::DESIGN_KEYWORDS.iter().copied())
        {
            text = remove_phrase(&text, phrase);
        }

        let words = words(&text)
            .into_iter()
            .filter(|w| !vocabulary::is_noise_word(w))
            .filter(|w| w.chars().any(char::is_alphabetic))
            .collect();
        Self { words }
    }

    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    fn name_word_count(&self) -> usize {
        self.words
            .iter()
            .filter(|w| !vocabulary::is_color_word(w))
            .count()
    }

    /// Contiguous n-grams, longest first, then left to right.
    ///
    /// N-grams made only of colour words are skipped, as are single words
    /// when the remainder is long enough to make them noise.
    #[must_use]
    pub fn ngrams(&self, config: &NgramConfig, min_chars: usize) -> Vec<String> {
        let longest = config.max_words.min(self.words.len());
        let allow_single = self.name_word_count() <= config.single_word_max_remaining;

        let mut grams: Vec<String> = Vec::new();
        for size in (1..=longest).rev() {
            if size == 1 && !allow_single {
                continue;
            }
            for window in self.words.windows(size) {
                if window.iter().all(|w| vocabulary::is_color_word(w)) {
                    continue;
                }
                let gram = window.join(" ");
                if gram.chars().filter(|c| !c.is_whitespace()).count() < min_chars {
                    continue;
                }
                if !grams.contains(&gram) {
                    grams.push(gram);
                }
            }
        }
        grams
    }
}

fn length_bonus(gram: &str) -> u8 {
    let extra = gram.split_whitespace().count().saturating_sub(1);
    u8::try_from(extra * 2).map_or(MAX_LENGTH_BONUS, |b| b.min(MAX_LENGTH_BONUS))
}

fn gram_words(gram: &str) -> Vec<&str> {
    gram.split_whitespace().collect()
}

/// Score a player against an n-gram. Exact component matches beat partial
/// containment; longer n-grams and well-known players get small bonuses.
#[must_use]
pub fn score_player(candidate: &PlayerCandidate, gram: &str) -> Option<u8> {
    let full = candidate.full_name.to_lowercase();
    let first = candidate.first_name.to_lowercase();
    let last = candidate.last_name.to_lowercase();
    let nickname = candidate.nickname.as_deref().map(str::to_lowercase);
    let tokens = gram_words(gram);

    let base = if gram == full {
        98
    } else if tokens.len() >= 2 && tokens.contains(&first.as_str()) && tokens.contains(&last.as_str())
    {
        96
    } else if nickname.as_deref() == Some(gram) || gram == last {
        95
    } else if gram == first {
        80
    } else if full.contains(gram) {
        70
    } else {
        return None;
    };

    let mut score = base + length_bonus(gram);
    if candidate.is_hall_of_fame {
        score += HALL_OF_FAME_BONUS;
    }
    if candidate.total_card_count >= POPULAR_CARD_COUNT {
        score += POPULAR_BONUS;
    }
    Some(score.min(100))
}

#[must_use]
pub fn score_team(candidate: &TeamCandidate, gram: &str) -> Option<u8> {
    let name = candidate.name.to_lowercase();
    let city = candidate.city.to_lowercase();
    let mascot = candidate.mascot.as_deref().map(str::to_lowercase);
    let abbreviation = candidate.abbreviation.as_deref().map(str::to_lowercase);

    if gram == name {
        Some(98)
    } else if mascot.as_deref() == Some(gram) {
        Some(95)
    } else if abbreviation.as_deref() == Some(gram) {
        Some(92)
    } else if gram == city {
        Some(75)
    } else if name.contains(gram)
        || city.contains(gram)
        || mascot.as_deref().is_some_and(|m| m.contains(gram))
    {
        let words = u8::try_from(gram_words(gram).len()).unwrap_or(u8::MAX);
        Some(50u8.saturating_add(words.saturating_mul(8)).min(100))
    } else {
        None
    }
}

/// Partial score scaled by how much of `name` the n-gram covers.
fn coverage_score(base: u8, span: u8, gram: &str, name: &str) -> u8 {
    let covered = gram.chars().count();
    let total = name.chars().count().max(1);
    let scaled = usize::from(span) * covered.min(total) / total;
    base.saturating_add(u8::try_from(scaled).unwrap_or(span))
}

#[must_use]
pub fn score_set(candidate: &SeriesCandidate, gram: &str, years: &[Token<YearToken>]) -> Option<u8> {
    if candidate.is_insert {
        return None;
    }
    let series = candidate.name.to_lowercase();
    let set = candidate.set_name.to_lowercase();
    let manufacturer = candidate.manufacturer_name.to_lowercase();

    let base = if gram == series {
        98
    } else if gram == set {
        95
    } else if gram == manufacturer {
        70
    } else if series.contains(gram) {
        coverage_score(60, 30, gram, &series)
    } else if set.contains(gram) {
        coverage_score(60, 30, gram, &set)
    } else {
        return None;
    };

    let year_match = candidate
        .year
        .is_some_and(|y| years.iter().any(|t| t.value.year == y));
    let bonus = if year_match { SET_YEAR_BONUS } else { 0 };
    Some(base.saturating_add(bonus).min(100))
}

#[must_use]
pub fn score_insert(candidate: &SeriesCandidate, gram: &str) -> Option<u8> {
    if !candidate.is_insert {
        return None;
    }
    let series = candidate.name.to_lowercase();
    if gram == series {
        Some(95)
    } else if series.contains(gram) {
        Some(coverage_score(60, 30, gram, &series))
    } else {
        None
    }
}

#[must_use]
pub fn player_token(candidate: &PlayerCandidate) -> PlayerToken {
    PlayerToken {
        player_id: candidate.id,
        full_name: candidate.full_name.clone(),
        first_name: candidate.first_name.clone(),
        last_name: candidate.last_name.clone(),
        nickname: candidate.nickname.clone(),
        total_card_count: candidate.total_card_count,
        is_hall_of_fame: candidate.is_hall_of_fame,
    }
}

#[must_use]
pub fn team_token(candidate: &TeamCandidate) -> TeamToken {
    TeamToken {
        team_id: candidate.id,
        name: candidate.name.clone(),
        city: candidate.city.clone(),
        mascot: candidate.mascot.clone(),
        abbreviation: candidate.abbreviation.clone(),
    }
}

#[must_use]
pub fn set_token(candidate: &SeriesCandidate) -> SetToken {
    SetToken {
        series_id: candidate.id,
        series_name: candidate.name.clone(),
        set_name: candidate.set_name.clone(),
        manufacturer_name: candidate.manufacturer_name.clone(),
        year: candidate.year,
    }
}

#[must_use]
pub fn insert_token(candidate: &SeriesCandidate) -> InsertToken {
    InsertToken {
        series_id: candidate.id,
        series_name: candidate.name.clone(),
    }
}

/// Reduce raw n-gram matches to the final candidate list.
///
/// Per identity only the match from the longest n-gram survives. A candidate
/// is then kept when it is within `window` points of the best, strong on its
/// own, or matched by at least as many words as the best. Output is ordered
/// by confidence, then id.
#[must_use]
pub fn select_candidates<T: Identity<Key = i64>>(
    matches: Vec<Token<T>>,
    config: &SearchConfig,
) -> Vec<Token<T>> {
    let mut by_identity: HashMap<i64, Token<T>> = HashMap::new();
    for token in matches {
        match by_identity.entry(token.value.identity()) {
            Entry::Vacant(slot) => {
                slot.insert(token);
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get();
                if (token.span_words(), token.confidence)
                    > (current.span_words(), current.confidence)
                {
                    slot.insert(token);
                }
            }
        }
    }

    let mut kept: Vec<Token<T>> = by_identity.into_values().collect();
    kept.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| a.value.identity().cmp(&b.value.identity()))
    });

    let Some(best_confidence) = kept.first().map(|t| t.confidence) else {
        return kept;
    };
    let best_words = kept
        .iter()
        .filter(|t| t.confidence == best_confidence)
        .map(Token::span_words)
        .max()
        .unwrap_or(0);

    kept.retain(|t| {
        t.confidence >= config.min_name_confidence
            && (t.confidence.saturating_add(config.candidate_window) >= best_confidence
                || t.confidence >= config.strong_match_confidence
                || t.span_words() >= best_words)
    });
    kept
}

/// Look every n-gram up concurrently and score the candidates it returns.
pub async fn match_names<V, T, S>(
    repo: &dyn EntityRepository,
    cache: &dyn LookupCache<V>,
    grams: &[String],
    score: S,
) -> anyhow::Result<Vec<Token<T>>>
where
    V: NameLookup,
    S: Fn(&V, &str) -> Option<(T, u8)>,
{
    let lookups = try_join_all(grams.iter().map(|gram| async move {
        let candidates = cached_lookup(repo, cache, gram).await?;
        anyhow::Ok((gram, candidates))
    }))
    .await?;

    let mut matches = Vec::new();
    for (gram, candidates) in lookups {
        for candidate in candidates.iter() {
            if let Some((value, confidence)) = score(candidate, gram.as_str()) {
                matches.push(Token::new(value, confidence, gram.as_str()));
            }
        }
    }
    Ok(matches)
}
