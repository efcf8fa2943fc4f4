//! Final ordering of search results.

use cardex_core::SearchResult;
use std::collections::HashSet;

/// Orders and bounds the executor's output.
pub trait Ranker: Send + Sync {
    /// Rank results and keep at most `limit`.
    ///
    /// # Arguments
    /// * `results` - Executor output, possibly with duplicates
    /// * `limit` - Maximum number of results to return
    fn rank(&self, results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult>;
}

/// Deduplicates by `(entity type, id)` keeping the first occurrence, then
/// sorts by relevance with entity-type priority breaking ties
/// (card, player, team, series). The sort is stable, so repository order
/// survives among equal keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultRanker;

impl ResultRanker {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Ranker for ResultRanker {
    fn rank(&self, results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
        let mut seen = HashSet::new();
        let mut ranked: Vec<SearchResult> = results
            .into_iter()
            .filter(|r| seen.insert(r.key()))
            .collect();
        ranked.sort_by(|a, b| {
            b.relevance_score
                .cmp(&a.relevance_score)
                .then_with(|| a.entity_type.priority().cmp(&b.entity_type.priority()))
        });
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardex_core::EntityType;

    fn hit(entity_type: EntityType, id: i64, score: u8) -> SearchResult {
        SearchResult::new(entity_type, id, score)
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let ranked = ResultRanker::new().rank(
            vec![
                hit(EntityType::Card, 1, 60),
                hit(EntityType::Card, 1, 99),
                hit(EntityType::Player, 1, 70),
            ],
            10,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].key(), (EntityType::Player, 1));
        assert_eq!(ranked[1].relevance_score, 60);
    }

    #[test]
    fn ties_break_by_entity_priority() {
        let ranked = ResultRanker::new().rank(
            vec![
                hit(EntityType::Series, 4, 80),
                hit(EntityType::Team, 3, 80),
                hit(EntityType::Card, 9, 80),
                hit(EntityType::Player, 2, 80),
            ],
            10,
        );
        let types: Vec<EntityType> = ranked.iter().map(|r| r.entity_type).collect();
        assert_eq!(
            types,
            vec![EntityType::Card, EntityType::Player, EntityType::Team, EntityType::Series]
        );
    }

    #[test]
    fn limit_bounds_output_and_stable_order_survives() {
        let ranked = ResultRanker::new().rank(
            (1..=5).map(|id| hit(EntityType::Card, id, 90)).collect(),
            3,
        );
        let ids: Vec<i64> = ranked.iter().map(|r| r.entity_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
