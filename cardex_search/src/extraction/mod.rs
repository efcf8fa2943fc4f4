//! Query decomposition into typed, confidence-scored tokens.
//!
//! Extraction runs in two phases. Pattern extractors (card numbers, years,
//! serials, production codes, card types) are pure and run first. Their
//! tokens are then frozen and handed to the name, parallel and keyword
//! extractors, which run concurrently against the repository and never see
//! each other's output.

pub mod cleanup;
pub mod lookup;
pub mod names;
pub mod parallels;
pub mod rules;
pub mod vocabulary;

use cardex_core::util::max_card_year;
use cardex_core::{EntityRepository, SearchConfig, Token, TokenSet, push_unique};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::CatalogCaches;
use names::NameContext;
pub use rules::QueryRules;

/// Decomposes raw queries into [`TokenSet`]s.
pub struct TokenExtractor {
    repo: Arc<dyn EntityRepository>,
    caches: CatalogCaches,
    rules: QueryRules,
    config: SearchConfig,
}

impl TokenExtractor {
    /// Create an extractor with compiled pattern rules.
    ///
    /// # Errors
    /// Returns an error if a built-in rule fails to compile.
    pub fn new(
        repo: Arc<dyn EntityRepository>,
        caches: CatalogCaches,
        config: SearchConfig,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            repo,
            caches,
            rules: QueryRules::compile()?,
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub const fn caches(&self) -> &CatalogCaches {
        &self.caches
    }

    #[must_use]
    pub fn repository(&self) -> &dyn EntityRepository {
        self.repo.as_ref()
    }

    /// Pattern tokens only: no repository access.
    #[must_use]
    pub fn pattern_tokens(&self, query: &str) -> TokenSet {
        let max_year = max_card_year();
        let (card_types, _) = vocabulary::detect_card_types(query);
        TokenSet {
            card_numbers: self.rules.extract_card_numbers(query),
            years: self.rules.extract_years(query, max_year),
            serials: self.rules.extract_serials(query, max_year),
            production_codes: self.rules.extract_production_codes(query),
            card_types,
            ..TokenSet::default()
        }
    }

    /// Full extraction followed by collision cleanup.
    pub async fn extract(&self, query: &str) -> TokenSet {
        let mut tokens = self.extract_raw(query).await;
        cleanup::resolve_collisions(&mut tokens, &self.config);
        tokens
    }

    /// Full extraction without collision cleanup.
    ///
    /// A failing repository-backed extractor is logged and contributes no
    /// tokens; its siblings are unaffected.
    pub async fn extract_raw(&self, query: &str) -> TokenSet {
        let mut tokens = self.pattern_tokens(query);
        let context = NameContext::build(query, &tokens);
        let keywords = parallels::extract_keywords(query);

        let repo = self.repo.as_ref();
        let ngram = &self.config.ngram;
        let player_grams = context.ngrams(ngram, ngram.player_min_chars);
        let team_grams = context.ngrams(ngram, ngram.team_min_chars);
        let series_grams = context.ngrams(ngram, ngram.set_min_chars);
        let years = tokens.years.clone();

        let (players, teams, sets, inserts, colors, keyword_colors) = tokio::join!(
            names::match_names(
                repo,
                self.caches.players.as_ref(),
                &player_grams,
                |c, gram| names::score_player(c, gram).map(|s| (names::player_token(c), s)),
            ),
            names::match_names(
                repo,
                self.caches.teams.as_ref(),
                &team_grams,
                |c, gram| names::score_team(c, gram).map(|s| (names::team_token(c), s)),
            ),
            names::match_names(
                repo,
                self.caches.series.as_ref(),
                &series_grams,
                |c, gram| names::score_set(c, gram, &years).map(|s| (names::set_token(c), s)),
            ),
            names::match_names(
                repo,
                self.caches.series.as_ref(),
                &series_grams,
                |c, gram| names::score_insert(c, gram).map(|s| (names::insert_token(c), s)),
            ),
            parallels::extract_parallels(repo, self.caches.colors.as_ref(), query),
            parallels::keyword_parallels(repo, self.caches.colors.as_ref(), &keywords),
        );

        tokens.players = names::select_candidates(settle("player", players), &self.config);
        tokens.teams = names::select_candidates(settle("team", teams), &self.config);
        tokens.sets = names::select_candidates(settle("set", sets), &self.config);
        tokens.inserts = names::select_candidates(settle("insert", inserts), &self.config);
        tokens.parallels = settle("parallel", colors);
        for token in settle("keyword parallel", keyword_colors) {
            push_unique(&mut tokens.parallels, token);
        }
        tokens.keywords = keywords;

        debug!(
            "Extracted {} facet(s) from '{}': {:?}",
            tokens.active_type_count(),
            query,
            tokens.active_facets()
        );
        tokens
    }
}

/// Unwrap a sub-extractor result, treating failure as "no tokens".
fn settle<T>(extractor: &str, result: anyhow::Result<Vec<Token<T>>>) -> Vec<Token<T>> {
    result.unwrap_or_else(|e| {
        warn!("{} extraction failed, continuing without it: {:#}", extractor, e);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardex_core::{CardNumberClass, Facet};

    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn rules_only(query: &str) -> TokenSet {
        let rules = QueryRules::compile().expect("built-in rules should compile");
        let max_year = max_card_year();
        TokenSet {
            card_numbers: rules.extract_card_numbers(query),
            years: rules.extract_years(query, max_year),
            serials: rules.extract_serials(query, max_year),
            ..TokenSet::default()
        }
    }

    #[test]
    fn pattern_tokens_are_position_independent() {
        let a = rules_only("/25 2020 bcp-50");
        let b = rules_only("bcp-50 /25 2020");
        assert_eq!(a, b);
        assert_eq!(a.active_facets(), vec![Facet::CardNumber, Facet::Year, Facet::Serial]);
        assert_eq!(
            a.card_numbers[0].value.pattern_class,
            CardNumberClass::StandardHyphenated
        );
    }
}
