//! Strategy execution against the catalog repository.

use cardex_core::{
    CardFilters, CardRow, Category, EntityRepository, EntityType, Facet, Pattern, SearchResult,
    SeriesCandidate, Strategy, Token, TokenSet, strongest,
};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::pattern::CARD_TYPE_CONFIDENCE;

/// Turns a [`Pattern`] into repository calls and scored results.
pub struct QueryExecutor {
    repo: Arc<dyn EntityRepository>,
}

impl QueryExecutor {
    #[must_use]
    pub fn new(repo: Arc<dyn EntityRepository>) -> Self {
        Self { repo }
    }

    /// Run the pattern's strategy and keep only results the category admits.
    ///
    /// # Arguments
    /// * `pattern` - Classification of `tokens`
    /// * `tokens` - Facets to constrain the retrieval with
    /// * `category` - Entity types the caller accepts
    /// * `limit` - Repository fetch bound
    ///
    /// # Errors
    /// Returns the repository error; nothing is retried here.
    pub async fn execute(
        &self,
        pattern: &Pattern,
        tokens: &TokenSet,
        category: Category,
        limit: usize,
    ) -> anyhow::Result<Vec<SearchResult>> {
        let mut results = self.run_strategy(pattern.strategy, tokens, limit).await?;
        results.retain(|r| category.admits(r.entity_type));
        debug!(
            "Strategy {} produced {} result(s) for category {}",
            pattern.strategy,
            results.len(),
            category.as_str()
        );
        Ok(results)
    }

    async fn run_strategy(
        &self,
        strategy: Strategy,
        tokens: &TokenSet,
        limit: usize,
    ) -> anyhow::Result<Vec<SearchResult>> {
        match strategy {
            Strategy::NoResults => Ok(Vec::new()),
            Strategy::SeriesByCode => {
                let mut results = Vec::new();
                for code in &tokens.production_codes {
                    let series = self.repo.find_series_by_code(&code.value.code).await?;
                    results.extend(series.iter().map(|s| series_result(s, code.confidence)));
                }
                Ok(results)
            }
            Strategy::PlayerListing => Ok(player_results(tokens)),
            Strategy::TeamBrowse => Ok(team_results(tokens)),
            Strategy::SetBrowse => Ok(set_results(tokens)),
            Strategy::YearBrowse => {
                let mut results = Vec::new();
                for year in &tokens.years {
                    let series = self.repo.list_series_by_year(year.value.year, limit).await?;
                    results.extend(series.iter().map(|s| series_result(s, year.confidence)));
                }
                Ok(results)
            }
            Strategy::KeywordBrowse => {
                let mut results = Vec::new();
                for keyword in &tokens.keywords {
                    let series = self.repo.search_series(&keyword.value.keyword).await?;
                    results.extend(series.iter().map(|s| series_result(s, keyword.confidence)));
                }
                Ok(results)
            }
            Strategy::MultiFilter if lists_entities(tokens) => {
                let mut results = player_results(tokens);
                results.extend(team_results(tokens));
                results.extend(set_results(tokens));
                Ok(results)
            }
            Strategy::CardNumberSearch
            | Strategy::CardTypeBrowse
            | Strategy::ParallelBrowse
            | Strategy::SerialBrowse
            | Strategy::InsertBrowse
            | Strategy::PlayerCardNumber
            | Strategy::SetYearBrowse
            | Strategy::MultiFilter => self.search_cards(tokens, limit).await,
        }
    }

    async fn search_cards(
        &self,
        tokens: &TokenSet,
        limit: usize,
    ) -> anyhow::Result<Vec<SearchResult>> {
        let filters = card_filters(tokens, limit);
        let rows = self.repo.search_cards(&filters).await?;
        Ok(rows.par_iter().map(|row| card_result(row, tokens)).collect())
    }
}

/// Entity names without anything that narrows them to cards.
fn lists_entities(tokens: &TokenSet) -> bool {
    let facets = tokens.active_facets();
    facets.iter().any(Facet::is_entity_name) && !facets.iter().any(Facet::is_narrowing)
}

/// AND-combination of every active facet.
#[must_use]
pub fn card_filters(tokens: &TokenSet, limit: usize) -> CardFilters {
    fn ids<T>(tokens: &[Token<T>], id: impl Fn(&T) -> i64) -> Vec<i64> {
        tokens.iter().map(|t| id(&t.value)).collect()
    }

    CardFilters {
        player_ids: ids(&tokens.players, |p| p.player_id),
        team_ids: ids(&tokens.teams, |t| t.team_id),
        series_ids: ids(&tokens.sets, |s| s.series_id),
        insert_series_ids: ids(&tokens.inserts, |s| s.series_id),
        color_ids: ids(&tokens.parallels, |p| p.color_id),
        card_number: strongest(&tokens.card_numbers).map(|t| t.value.pattern.clone()),
        year: strongest(&tokens.years).map(|t| t.value.year),
        print_run: strongest(&tokens.serials).map(|t| t.value.print_run),
        production_code: strongest(&tokens.production_codes).map(|t| t.value.code.clone()),
        rookie: tokens.card_types.rookie,
        autograph: tokens.card_types.autograph,
        short_print: tokens.card_types.short_print,
        relic: tokens.card_types.relic,
        limit,
    }
}

/// Confidence of the token a row matched, or the facet's best when the row
/// cannot be tied to one token.
fn matched<T>(tokens: &[Token<T>], hit: impl Fn(&T) -> bool) -> Option<u32> {
    tokens
        .iter()
        .filter(|t| hit(&t.value))
        .map(|t| t.confidence)
        .max()
        .or_else(|| tokens.iter().map(|t| t.confidence).max())
        .map(u32::from)
}

/// Average confidence of the facets that selected this row.
fn card_relevance(row: &CardRow, tokens: &TokenSet) -> u8 {
    let mut parts: Vec<u32> = [
        matched(&tokens.players, |p| p.player_id == row.player_id),
        matched(&tokens.teams, |t| Some(t.team_id) == row.team_id),
        matched(&tokens.sets, |s| s.series_id == row.series_id),
        matched(&tokens.inserts, |s| s.series_id == row.series_id),
        matched(&tokens.parallels, |p| Some(p.color_id) == row.color_id),
        strongest(&tokens.card_numbers).map(|t| u32::from(t.confidence)),
        strongest(&tokens.years).map(|t| u32::from(t.confidence)),
        strongest(&tokens.serials).map(|t| u32::from(t.confidence)),
        strongest(&tokens.production_codes).map(|t| u32::from(t.confidence)),
    ]
    .into_iter()
    .flatten()
    .collect();
    parts.extend(std::iter::repeat_n(
        u32::from(CARD_TYPE_CONFIDENCE),
        tokens.card_types.count(),
    ));

    if parts.is_empty() {
        return 0;
    }
    let n = u32::try_from(parts.len()).unwrap_or(u32::MAX);
    let average = (parts.iter().sum::<u32>() + n / 2) / n;
    u8::try_from(average.min(100)).unwrap_or(100)
}

fn card_result(row: &CardRow, tokens: &TokenSet) -> SearchResult {
    let mut result = SearchResult::new(EntityType::Card, row.id, card_relevance(row, tokens))
        .with_field("card_number", row.card_number.as_str())
        .with_field("player", row.player_name.as_str())
        .with_field("series", row.series_name.as_str())
        .with_field("year", row.year.to_string());
    if let Some(team) = &row.team_name {
        result = result.with_field("team", team.as_str());
    }
    if let Some(color) = &row.color_name {
        result = result.with_field("parallel", color.as_str());
    }
    if let Some(print_run) = row.print_run {
        result = result.with_field("print_run", print_run.to_string());
    }
    let flags: Vec<&str> = [
        (row.is_rookie, "rookie"),
        (row.is_autograph, "autograph"),
        (row.is_short_print, "short_print"),
        (row.is_relic, "relic"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();
    if !flags.is_empty() {
        result = result.with_field("attributes", flags.join(","));
    }
    result
}

fn player_results(tokens: &TokenSet) -> Vec<SearchResult> {
    tokens
        .players
        .iter()
        .map(|t| {
            let mut result = SearchResult::new(EntityType::Player, t.value.player_id, t.confidence)
                .with_field("name", t.value.full_name.as_str())
                .with_field("card_count", t.value.total_card_count.to_string());
            if t.value.is_hall_of_fame {
                result = result.with_field("hall_of_fame", "true");
            }
            result
        })
        .collect()
}

fn team_results(tokens: &TokenSet) -> Vec<SearchResult> {
    tokens
        .teams
        .iter()
        .map(|t| {
            let mut result = SearchResult::new(EntityType::Team, t.value.team_id, t.confidence)
                .with_field("name", t.value.name.as_str())
                .with_field("city", t.value.city.as_str());
            if let Some(abbreviation) = &t.value.abbreviation {
                result = result.with_field("abbreviation", abbreviation.as_str());
            }
            result
        })
        .collect()
}

fn set_results(tokens: &TokenSet) -> Vec<SearchResult> {
    tokens
        .sets
        .iter()
        .map(|t| {
            let mut result = SearchResult::new(EntityType::Series, t.value.series_id, t.confidence)
                .with_field("name", t.value.series_name.as_str())
                .with_field("set", t.value.set_name.as_str())
                .with_field("manufacturer", t.value.manufacturer_name.as_str());
            if let Some(year) = t.value.year {
                result = result.with_field("year", year.to_string());
            }
            result
        })
        .collect()
}

fn series_result(series: &SeriesCandidate, relevance: u8) -> SearchResult {
    let mut result = SearchResult::new(EntityType::Series, series.id, relevance)
        .with_field("name", series.name.as_str())
        .with_field("set", series.set_name.as_str())
        .with_field("manufacturer", series.manufacturer_name.as_str());
    if let Some(year) = series.year {
        result = result.with_field("year", year.to_string());
    }
    if let Some(code) = &series.production_code {
        result = result.with_field("production_code", code.as_str());
    }
    if series.is_insert {
        result = result.with_field("insert", "true");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardex_core::{
        CardNumberClass, CardNumberToken, PlayerToken, ProductionCodeToken, YearToken,
    };

    fn trout_token() -> Token<PlayerToken> {
        Token::new(
            PlayerToken {
                player_id: 1,
                full_name: "Mike Trout".to_string(),
                first_name: "Mike".to_string(),
                last_name: "Trout".to_string(),
                nickname: None,
                total_card_count: 0,
                is_hall_of_fame: false,
            },
            95,
            "trout",
        )
    }

    fn row() -> CardRow {
        CardRow {
            id: 77,
            card_number: "108".to_string(),
            player_id: 1,
            player_name: "Mike Trout".to_string(),
            team_id: None,
            team_name: None,
            series_id: 5,
            series_name: "Topps Update".to_string(),
            year: 2011,
            color_id: None,
            color_name: None,
            print_run: None,
            is_rookie: true,
            is_autograph: false,
            is_short_print: false,
            is_relic: false,
        }
    }

    #[test]
    fn filters_and_every_facet() {
        let mut tokens = TokenSet {
            players: vec![trout_token()],
            card_numbers: vec![Token::new(
                CardNumberToken {
                    pattern: "108".to_string(),
                    pattern_class: CardNumberClass::PureNumeric,
                },
                70,
                "108",
            )],
            years: vec![Token::new(YearToken { year: 2011 }, 90, "2011")],
            ..TokenSet::default()
        };
        tokens.card_types.rookie = true;

        let filters = card_filters(&tokens, 20);
        assert_eq!(filters.player_ids, vec![1]);
        assert_eq!(filters.card_number.as_deref(), Some("108"));
        assert_eq!(filters.year, Some(2011));
        assert!(filters.rookie);
        assert!(filters.matches(&row()));
    }

    #[test]
    fn relevance_averages_contributing_facets() {
        let mut tokens = TokenSet {
            players: vec![trout_token()],
            card_numbers: vec![Token::new(
                CardNumberToken {
                    pattern: "108".to_string(),
                    pattern_class: CardNumberClass::PureNumeric,
                },
                70,
                "108",
            )],
            ..TokenSet::default()
        };
        assert_eq!(card_relevance(&row(), &tokens), 83);

        tokens.card_types.rookie = true;
        // (95 + 70 + 90) / 3 rounded
        assert_eq!(card_relevance(&row(), &tokens), 85);
    }

    #[test]
    fn entity_listing_only_without_narrowing_facets() {
        let mut tokens = TokenSet {
            players: vec![trout_token()],
            ..TokenSet::default()
        };
        assert!(lists_entities(&tokens));
        tokens.card_types.autograph = true;
        assert!(!lists_entities(&tokens));
    }

    #[test]
    fn production_code_narrows_to_cards() {
        let tokens = TokenSet {
            players: vec![trout_token()],
            production_codes: vec![Token::new(
                ProductionCodeToken {
                    code: "CMP123456".to_string(),
                },
                98,
                "cmp123456",
            )],
            ..TokenSet::default()
        };
        assert!(!lists_entities(&tokens));
        assert_eq!(
            card_filters(&tokens, 20).production_code.as_deref(),
            Some("CMP123456")
        );
    }
}
