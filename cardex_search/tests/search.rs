//! End-to-end tests for the search pipeline over an in-memory catalog.
//!
//! These tests cover:
//! - Query understanding (tokens, shape, strategy)
//! - Retrieval, ranking and limits
//! - Relaxation of zero-result queries
//! - Failure handling of the repository

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use cardex_core::{Category, EntityType, SearchError, Shape, Strategy};
use common::{FailingRepository, Operation};

fn ids(response: &cardex_core::SearchResponse) -> Vec<(EntityType, i64)> {
    response.results.iter().map(|r| r.key()).collect()
}

/// A bare number next to a player name finds that player's card.
#[tokio::test]
async fn test_player_and_card_number() {
    let service = common::service();
    let response = service
        .search("108 trout", 20, Category::All)
        .await
        .expect("search should succeed");

    assert_eq!(response.pattern.strategy, Strategy::PlayerCardNumber);
    assert_eq!(response.pattern.shape, Shape::Two);
    assert_eq!(ids(&response), vec![(EntityType::Card, 101)]);
    assert!(response.relaxed.is_none());

    let analysis = service.analyze("108 trout").await;
    assert_eq!(analysis.tokens.players.len(), 1);
    assert_eq!(analysis.tokens.players[0].value.player_id, 1);
    assert!(analysis.tokens.players[0].confidence >= 95);
    assert_eq!(analysis.tokens.card_numbers[0].value.pattern, "108");
}

/// Word order does not change what is extracted.
#[tokio::test]
async fn test_extraction_is_position_independent() {
    let service = common::service();
    let before = service.analyze("pink steven kwan").await;
    let after = service.analyze("steven kwan pink").await;

    assert_eq!(before.tokens, after.tokens);
    assert_eq!(before.pattern, after.pattern);
    assert_eq!(before.tokens.players[0].value.player_id, 2);
    let colors: Vec<i64> = before
        .tokens
        .parallels
        .iter()
        .map(|p| p.value.color_id)
        .collect();
    assert_eq!(colors, vec![1, 2]);

    let response = service
        .search("steven kwan pink", 20, Category::All)
        .await
        .expect("search should succeed");
    assert_eq!(ids(&response), vec![(EntityType::Card, 102)]);
}

/// A colour word that belongs to a matched player name is not a parallel.
#[tokio::test]
async fn test_player_surname_is_not_a_parallel() {
    let service = common::service();
    let analysis = service.analyze("evan white").await;

    assert_eq!(analysis.tokens.players.len(), 1);
    assert_eq!(analysis.tokens.players[0].value.player_id, 3);
    assert!(analysis.tokens.parallels.is_empty());
    assert_eq!(analysis.pattern.strategy, Strategy::PlayerListing);
}

/// Team names claim their colour words too.
#[tokio::test]
async fn test_team_name_is_not_a_parallel() {
    let service = common::service();
    let analysis = service.analyze("chicago white sox").await;

    assert_eq!(analysis.tokens.teams[0].value.team_id, 3);
    assert_eq!(analysis.tokens.teams[0].confidence, 98);
    assert!(analysis.tokens.parallels.is_empty());
    assert_eq!(analysis.pattern.strategy, Strategy::TeamBrowse);
}

/// Year plus set name browses the set's cards for that year.
#[tokio::test]
async fn test_set_year_browse() {
    let service = common::service();
    let analysis = service.analyze("2020 bowman chrome").await;

    assert_eq!(analysis.pattern.shape, Shape::Two);
    assert_eq!(analysis.pattern.strategy, Strategy::SetYearBrowse);
    assert_eq!(analysis.tokens.sets.len(), 1);
    assert_eq!(analysis.tokens.sets[0].value.series_id, 11);
    assert!(analysis.tokens.players.is_empty());

    let response = service
        .search("2020 bowman chrome", 20, Category::All)
        .await
        .expect("search should succeed");
    assert_eq!(ids(&response), vec![(EntityType::Card, 104)]);
}

/// Four-digit numbers outside the card era are not years.
#[tokio::test]
async fn test_implausible_years_are_ignored() {
    let service = common::service();
    for query in ["1776 topps", "2999 topps"] {
        let analysis = service.analyze(query).await;
        assert!(analysis.tokens.years.is_empty(), "{query}");
        assert!(analysis.tokens.card_numbers.is_empty(), "{query}");
    }
}

/// Slash and phrase serials become print runs, not card numbers.
#[tokio::test]
async fn test_serial_numbering() {
    let service = common::service();

    let analysis = service.analyze("ohtani /50").await;
    assert_eq!(analysis.tokens.serials.len(), 1);
    assert_eq!(analysis.tokens.serials[0].value.print_run, 50);
    assert_eq!(analysis.tokens.serials[0].confidence, 95);
    assert!(analysis.tokens.card_numbers.is_empty());

    let analysis = service.analyze("ohtani numbered to 99").await;
    assert_eq!(analysis.tokens.serials[0].value.print_run, 99);
    assert_eq!(analysis.tokens.serials[0].confidence, 85);
    assert!(analysis.tokens.card_numbers.is_empty());

    let response = service
        .search("ohtani /50", 20, Category::All)
        .await
        .expect("search should succeed");
    assert_eq!(ids(&response), vec![(EntityType::Card, 105)]);
}

/// A year-like print run is a serial only, so relaxing it leaves no year.
#[tokio::test]
async fn test_slash_print_run_is_not_a_year() {
    let service = common::service();
    let analysis = service.analyze("trout /2020").await;

    assert!(analysis.tokens.years.is_empty());
    assert_eq!(analysis.tokens.serials.len(), 1);
    assert_eq!(analysis.tokens.serials[0].value.print_run, 2020);

    let response = service
        .search("trout /2020", 20, Category::All)
        .await
        .expect("search should succeed");
    assert_eq!(
        response.relaxed.clone().map(|r| r.filters_removed),
        Some(vec!["serial".to_string()])
    );
    assert_eq!(ids(&response), vec![(EntityType::Player, 1)]);
}

/// Shorthands are expanded and the stronger expanded match wins.
#[tokio::test]
async fn test_abbreviation_expansion() {
    let service = common::service();
    let analysis = service.analyze("kwan cle").await;

    assert_eq!(analysis.tokens.players[0].value.player_id, 2);
    assert_eq!(analysis.tokens.teams.len(), 1);
    assert_eq!(analysis.tokens.teams[0].value.team_id, 1);
    assert_eq!(analysis.tokens.teams[0].confidence, 98);
}

/// A misspelt surname falls back to fuzzy matching. A lone weak match has
/// no alternates to suggest.
#[tokio::test]
async fn test_misspelling_gets_fuzzy_match() {
    let service = common::service();
    let response = service
        .search("trot", 20, Category::All)
        .await
        .expect("search should succeed");

    assert_eq!(response.pattern.strategy, Strategy::PlayerListing);
    assert_eq!(ids(&response), vec![(EntityType::Player, 1)]);
    assert_eq!(response.results[0].relevance_score, 64);
    assert!(response.suggestions.is_empty());
}

/// Weak fuzzy matches with alternates suggest the alternates only.
#[tokio::test]
async fn test_weak_match_suggests_alternates() {
    let service = common::service();
    let analysis = service.analyze("whitte").await;

    let players: Vec<(i64, u8)> = analysis
        .tokens
        .players
        .iter()
        .map(|t| (t.value.player_id, t.confidence))
        .collect();
    assert_eq!(players, vec![(3, 67), (4, 67)]);
    assert_eq!(analysis.suggestions, vec!["Did you mean Devon White?"]);
}

/// A zero limit returns nothing, for plain and relaxed queries alike.
#[tokio::test]
async fn test_zero_limit_returns_nothing() {
    let service = common::service();
    for query in ["trout", "trout pink /25 2011"] {
        let response = service
            .search(query, 0, Category::All)
            .await
            .expect("search should succeed");
        assert!(response.results.is_empty(), "{query}");
        assert!(response.relaxed.is_none(), "{query}");
    }
}

/// Limit bounds the result count; results never repeat.
#[tokio::test]
async fn test_limit_and_uniqueness() {
    let service = common::service();

    let all = service
        .search("steven kwan 45", 20, Category::All)
        .await
        .expect("search should succeed");
    assert_eq!(ids(&all), vec![(EntityType::Card, 103), (EntityType::Card, 102)]);
    let unique: HashSet<_> = ids(&all).into_iter().collect();
    assert_eq!(unique.len(), all.results.len());

    let one = service
        .search("steven kwan 45", 1, Category::All)
        .await
        .expect("search should succeed");
    assert_eq!(one.results.len(), 1);
    assert_eq!(one.results[0].key(), (EntityType::Card, 103));
}

/// Searching twice gives the same results in the same order.
#[tokio::test]
async fn test_search_is_repeatable() {
    let service = common::service();
    let first = service
        .search("trout pink /25 2011", 20, Category::All)
        .await
        .expect("search should succeed");
    let second = service
        .search("trout pink /25 2011", 20, Category::All)
        .await
        .expect("search should succeed");

    assert_eq!(first.results, second.results);
    assert_eq!(first.pattern, second.pattern);
    assert_eq!(first.relaxed, second.relaxed);
    assert_ne!(first.search_id, second.search_id);
}

/// Extraction gives the same tokens cold, warm from the caches, and on a
/// fresh service.
#[tokio::test]
async fn test_extraction_is_idempotent() {
    let service = common::service();
    for query in [
        "steven kwan pink 2020 bowman chrome auto /25",
        "kwan cle",
        "trot",
        "chicago white sox",
    ] {
        let cold = service.analyze(query).await;
        let warm = service.analyze(query).await;
        let fresh = common::service().analyze(query).await;

        assert_eq!(cold.tokens, warm.tokens, "{query}");
        assert_eq!(cold.pattern, warm.pattern, "{query}");
        assert_eq!(cold.suggestions, warm.suggestions, "{query}");
        assert_eq!(cold.tokens, fresh.tokens, "{query}");
    }

    let players = service
        .caches()
        .stats()
        .into_iter()
        .find(|(name, _)| *name == "players")
        .map(|(_, stats)| stats)
        .expect("LRU caches should report player stats");
    assert!(players.hits > 0);
}

/// Filters are dropped least important first until something matches.
#[tokio::test]
async fn test_relaxation_recovers_results() {
    let service = common::service();
    let response = service
        .search("trout pink /25 2011", 20, Category::All)
        .await
        .expect("search should succeed");

    assert_eq!(ids(&response), vec![(EntityType::Card, 100)]);
    let relaxed = response.relaxed.expect("filters should have been relaxed");
    assert_eq!(relaxed.filters_removed, vec!["serial", "parallel"]);
    assert_eq!(response.pattern.strategy, Strategy::MultiFilter);
    assert!(response.message.is_none());
}

/// A colour the player never had is dropped after the serial.
#[tokio::test]
async fn test_relaxation_drops_serial_then_parallel() {
    let service = common::service();
    let response = service
        .search("kwan gold /99", 20, Category::All)
        .await
        .expect("search should succeed");

    assert_eq!(ids(&response), vec![(EntityType::Player, 2)]);
    assert_eq!(
        response.relaxed.map(|r| r.filters_removed),
        Some(vec!["serial".to_string(), "parallel".to_string()])
    );
}

/// When relaxation runs out the response explains why it is empty.
#[tokio::test]
async fn test_relaxation_exhausted() {
    let service = common::service();

    let response = service
        .search("2019", 20, Category::All)
        .await
        .expect("search should succeed");
    assert!(response.results.is_empty());
    assert_eq!(
        response.relaxed.map(|r| r.filters_removed),
        Some(vec!["year".to_string()])
    );
    assert_eq!(
        response.message.as_deref(),
        Some("No matches found even after relaxing filters: year")
    );

    let response = service
        .search("cmp999999", 20, Category::All)
        .await
        .expect("search should succeed");
    assert_eq!(response.pattern.strategy, Strategy::SeriesByCode);
    assert!(response.results.is_empty());
    assert!(response.relaxed.is_none());
    assert_eq!(
        response.message.as_deref(),
        Some("No matches found and no filters could be relaxed")
    );
}

/// A production code resolves straight to its series.
#[tokio::test]
async fn test_production_code_lookup() {
    let service = common::service();
    let response = service
        .search("CMP123456", 20, Category::All)
        .await
        .expect("search should succeed");

    assert_eq!(response.pattern.strategy, Strategy::SeriesByCode);
    assert_eq!(response.pattern.confidence, 98);
    assert_eq!(ids(&response), vec![(EntityType::Series, 12)]);
}

/// A production code next to a player narrows to that player's cards in the
/// coded series.
#[tokio::test]
async fn test_production_code_narrows_player_cards() {
    let service = common::service();
    let response = service
        .search("trout cmp123456", 20, Category::All)
        .await
        .expect("search should succeed");

    assert_eq!(ids(&response), vec![(EntityType::Card, 101)]);
    assert!(response.relaxed.is_none());
}

/// The category filter applies before relaxation decides anything.
#[tokio::test]
async fn test_category_filter() {
    let service = common::service();

    let response = service
        .search("steven kwan 45", 20, Category::Players)
        .await
        .expect("search should succeed");
    assert_eq!(ids(&response), vec![(EntityType::Player, 2)]);
    assert_eq!(
        response.relaxed.map(|r| r.filters_removed),
        Some(vec!["card_number".to_string()])
    );

    let response = service
        .search_by_category_name("steven kwan 45", 20, "cards")
        .await
        .expect("search should succeed");
    assert!(response.results.iter().all(|r| r.entity_type == EntityType::Card));
    assert_eq!(response.results.len(), 2);
}

/// Unknown category names produce an empty response, not an error.
#[tokio::test]
async fn test_unknown_category_is_empty() {
    let service = common::service();
    let response = service
        .search_by_category_name("steven kwan", 20, "widgets")
        .await
        .expect("unknown category should not be an error");

    assert!(response.results.is_empty());
    assert_eq!(response.pattern.shape, Shape::Empty);
}

/// Queries below the minimum length skip the pipeline.
#[tokio::test]
async fn test_short_query_fast_path() {
    let service = common::service();
    for query in ["", " ", "a"] {
        let response = service
            .search(query, 20, Category::All)
            .await
            .expect("search should succeed");
        assert!(response.results.is_empty());
        assert_eq!(response.pattern.strategy, Strategy::NoResults);
        assert!(response.message.is_none());
    }
    assert!(service.caches().stats().iter().all(|(_, s)| s.misses == 0));
}

/// One failing name extractor does not take the others down.
#[tokio::test]
async fn test_extractor_failure_is_tolerated() {
    let service = common::service_over(Arc::new(FailingRepository::new(&[Operation::Teams])));
    let response = service
        .search("108 trout", 20, Category::All)
        .await
        .expect("team lookup failure should not fail the search");
    assert_eq!(ids(&response), vec![(EntityType::Card, 101)]);

    let service = common::service_over(Arc::new(FailingRepository::new(&[Operation::Colors])));
    let analysis = service.analyze("pink steven kwan").await;
    assert_eq!(analysis.tokens.players[0].value.player_id, 2);
    assert!(analysis.tokens.parallels.is_empty());
    assert_eq!(analysis.pattern.strategy, Strategy::PlayerListing);
}

/// Retrieval failures surface as a generic search error.
#[tokio::test]
async fn test_retrieval_failure_is_reported() {
    let service = common::service_over(Arc::new(FailingRepository::new(&[Operation::Cards])));
    let err = service
        .search("108 trout", 20, Category::All)
        .await
        .expect_err("card retrieval failure should fail the search");

    assert!(matches!(err, SearchError::Repository(_)));
    assert_eq!(err.to_string(), "search failed");
}

/// Repeated lookups are served from the shared caches.
#[tokio::test]
async fn test_lookups_are_cached_across_searches() {
    let service = common::service();
    service
        .search("steven kwan 45", 20, Category::All)
        .await
        .expect("search should succeed");
    let players = |service: &cardex_search::SearchService| {
        service
            .caches()
            .stats()
            .into_iter()
            .find(|(name, _)| *name == "players")
            .map(|(_, stats)| stats)
            .expect("LRU caches should report player stats")
    };
    let first = players(&service);
    assert!(first.entries > 0);

    service
        .search("steven kwan 45", 20, Category::All)
        .await
        .expect("search should succeed");
    let second = players(&service);
    assert_eq!(second.misses, first.misses);
    assert!(second.hits > first.hits);
}
