//! Colour/finish parallels and design keywords.

use cardex_core::util::contains_phrase;
use cardex_core::{
    ColorCandidate, EntityRepository, KeywordToken, LookupCache, ParallelToken, Token,
    push_unique,
};
use futures::future::try_join_all;
use std::sync::Arc;

use super::lookup::cached_lookup;
use super::vocabulary;

const EXACT_PARALLEL_CONFIDENCE: u8 = 95;
const PARTIAL_PARALLEL_CONFIDENCE: u8 = 85;
const KEYWORD_CONFIDENCE: u8 = 70;
const KEYWORD_PARALLEL_CONFIDENCE: u8 = 75;

fn parallel_token(candidate: &ColorCandidate) -> ParallelToken {
    ParallelToken {
        color_id: candidate.id,
        color_name: candidate.name.clone(),
        hex_value: candidate.hex_value.clone(),
    }
}

/// One lookup per matched colour keyword. Candidates covering the most
/// matched keywords win, so "pink refractor" resolves to that parallel
/// rather than to every pink and every refractor.
pub async fn extract_parallels(
    repo: &dyn EntityRepository,
    cache: &dyn LookupCache<ColorCandidate>,
    query: &str,
) -> anyhow::Result<Vec<Token<ParallelToken>>> {
    let keywords = vocabulary::matched_colors(query);
    if keywords.is_empty() {
        return Ok(Vec::new());
    }

    let results: Vec<Arc<Vec<ColorCandidate>>> = try_join_all(
        keywords
            .iter()
            .map(|keyword| cached_lookup(repo, cache, keyword)),
    )
    .await?;

    let mut scored: Vec<(usize, &ColorCandidate, Vec<&str>)> = Vec::new();
    for candidate in results.iter().flat_map(|r| r.iter()) {
        if scored.iter().any(|(_, c, _)| c.id == candidate.id) {
            continue;
        }
        let name = candidate.name.to_lowercase();
        let covered: Vec<&str> = keywords
            .iter()
            .copied()
            .filter(|k| contains_phrase(&name, k))
            .collect();
        if !covered.is_empty() {
            scored.push((covered.len(), candidate, covered));
        }
    }

    let best = scored.iter().map(|(n, _, _)| *n).max().unwrap_or(0);
    let mut tokens = Vec::new();
    for (coverage, candidate, covered) in scored {
        if coverage < best {
            continue;
        }
        let span = covered.join(" ");
        let confidence = if candidate.name.eq_ignore_ascii_case(&span) {
            EXACT_PARALLEL_CONFIDENCE
        } else {
            PARTIAL_PARALLEL_CONFIDENCE
        };
        push_unique(
            &mut tokens,
            Token::new(parallel_token(candidate), confidence, span),
        );
    }
    tokens.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| a.value.color_id.cmp(&b.value.color_id))
    });
    Ok(tokens)
}

/// Design keywords found in the query.
#[must_use]
pub fn extract_keywords(query: &str) -> Vec<Token<KeywordToken>> {
    vocabulary::matched_keywords(query)
        .into_iter()
        .map(|keyword| {
            Token::new(
                KeywordToken {
                    keyword: keyword.to_string(),
                },
                KEYWORD_CONFIDENCE,
                keyword,
            )
        })
        .collect()
}

/// Keywords that are also the exact name of a colour become parallels.
pub async fn keyword_parallels(
    repo: &dyn EntityRepository,
    cache: &dyn LookupCache<ColorCandidate>,
    keywords: &[Token<KeywordToken>],
) -> anyhow::Result<Vec<Token<ParallelToken>>> {
    let results = try_join_all(keywords.iter().map(|k| async move {
        let candidates = cached_lookup(repo, cache, &k.value.keyword).await?;
        anyhow::Ok((k, candidates))
    }))
    .await?;

    let mut tokens = Vec::new();
    for (keyword, candidates) in results {
        for candidate in candidates
            .iter()
            .filter(|c| c.name.eq_ignore_ascii_case(&keyword.value.keyword))
        {
            push_unique(
                &mut tokens,
                Token::new(
                    parallel_token(candidate),
                    KEYWORD_PARALLEL_CONFIDENCE,
                    keyword.matched_span.as_str(),
                ),
            );
        }
    }
    Ok(tokens)
}
