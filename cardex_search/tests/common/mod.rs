//! Shared fixtures for the search integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cardex_core::{
    CardFilters, CardRow, ColorCandidate, EntityRepository, PlayerCandidate, SearchConfig,
    SeriesCandidate, TeamCandidate,
};
use cardex_search::{InMemoryCatalog, SearchService};
use std::sync::Arc;

const CATALOG: &str = r##"{
    "players": [
        {"id": 1, "full_name": "Mike Trout", "first_name": "Mike", "last_name": "Trout", "total_card_count": 900},
        {"id": 2, "full_name": "Steven Kwan", "first_name": "Steven", "last_name": "Kwan", "total_card_count": 150},
        {"id": 3, "full_name": "Evan White", "first_name": "Evan", "last_name": "White", "total_card_count": 80},
        {"id": 4, "full_name": "Devon White", "first_name": "Devon", "last_name": "White", "total_card_count": 60},
        {"id": 5, "full_name": "Shohei Ohtani", "first_name": "Shohei", "last_name": "Ohtani", "nickname": "Shotime", "total_card_count": 700},
        {"id": 6, "full_name": "Mike Piazza", "first_name": "Mike", "last_name": "Piazza", "total_card_count": 400, "is_hall_of_fame": true}
    ],
    "teams": [
        {"id": 1, "name": "Cleveland Guardians", "city": "Cleveland", "mascot": "Guardians", "abbreviation": "CLE"},
        {"id": 2, "name": "Los Angeles Angels", "city": "Los Angeles", "mascot": "Angels", "abbreviation": "LAA"},
        {"id": 3, "name": "Chicago White Sox", "city": "Chicago", "mascot": "White Sox", "abbreviation": "CWS"}
    ],
    "series": [
        {"id": 10, "name": "Topps Update", "set_name": "Topps Update", "manufacturer_name": "Topps", "year": 2011},
        {"id": 11, "name": "Bowman Chrome", "set_name": "Bowman Chrome", "manufacturer_name": "Bowman", "year": 2020},
        {"id": 12, "name": "Topps Chrome", "set_name": "Topps Chrome", "manufacturer_name": "Topps", "year": 2022, "production_code": "CMP123456"},
        {"id": 13, "name": "Future Stars", "set_name": "Topps Chrome", "manufacturer_name": "Topps", "year": 2022, "is_insert": true}
    ],
    "colors": [
        {"id": 1, "name": "Pink", "hex_value": "#FFC0CB"},
        {"id": 2, "name": "Pink Refractor"},
        {"id": 3, "name": "White"},
        {"id": 4, "name": "Gold", "hex_value": "#FFD700"},
        {"id": 5, "name": "Refractor"}
    ],
    "cards": [
        {"id": 100, "card_number": "US175", "player_id": 1, "team_id": 2, "series_id": 10, "year": 2011, "is_rookie": true},
        {"id": 101, "card_number": "108", "player_id": 1, "team_id": 2, "series_id": 12, "year": 2022},
        {"id": 102, "card_number": "45", "player_id": 2, "team_id": 1, "series_id": 12, "color_id": 1, "year": 2022, "print_run": 99},
        {"id": 103, "card_number": "45", "player_id": 2, "team_id": 1, "series_id": 12, "year": 2022},
        {"id": 104, "card_number": "BDC-10", "player_id": 3, "series_id": 11, "year": 2020},
        {"id": 105, "card_number": "17", "player_id": 5, "team_id": 2, "series_id": 12, "color_id": 4, "year": 2022, "print_run": 50, "is_autograph": true}
    ]
}"##;

pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_json(CATALOG).expect("fixture catalog should parse")
}

pub fn service_over(repo: Arc<dyn EntityRepository>) -> SearchService {
    SearchService::new(repo, SearchConfig::default()).expect("service should build")
}

pub fn service() -> SearchService {
    service_over(Arc::new(catalog()))
}

/// Repository operations a [`FailingRepository`] can be told to break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Players,
    Teams,
    Series,
    Colors,
    Cards,
}

/// Delegates to the fixture catalog except for the operations it fails.
pub struct FailingRepository {
    inner: InMemoryCatalog,
    failing: Vec<Operation>,
}

impl FailingRepository {
    pub fn new(failing: &[Operation]) -> Self {
        Self {
            inner: catalog(),
            failing: failing.to_vec(),
        }
    }

    fn check(&self, op: Operation) -> anyhow::Result<()> {
        if self.failing.contains(&op) {
            anyhow::bail!("{op:?} lookup unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl EntityRepository for FailingRepository {
    async fn search_players(&self, fragment: &str) -> anyhow::Result<Vec<PlayerCandidate>> {
        self.check(Operation::Players)?;
        self.inner.search_players(fragment).await
    }

    async fn search_teams(&self, fragment: &str) -> anyhow::Result<Vec<TeamCandidate>> {
        self.check(Operation::Teams)?;
        self.inner.search_teams(fragment).await
    }

    async fn search_series(&self, fragment: &str) -> anyhow::Result<Vec<SeriesCandidate>> {
        self.check(Operation::Series)?;
        self.inner.search_series(fragment).await
    }

    async fn search_colors(&self, fragment: &str) -> anyhow::Result<Vec<ColorCandidate>> {
        self.check(Operation::Colors)?;
        self.inner.search_colors(fragment).await
    }

    async fn find_series_by_code(&self, code: &str) -> anyhow::Result<Vec<SeriesCandidate>> {
        self.check(Operation::Series)?;
        self.inner.find_series_by_code(code).await
    }

    async fn list_series_by_year(
        &self,
        year: i32,
        limit: usize,
    ) -> anyhow::Result<Vec<SeriesCandidate>> {
        self.check(Operation::Series)?;
        self.inner.list_series_by_year(year, limit).await
    }

    async fn search_cards(&self, filters: &CardFilters) -> anyhow::Result<Vec<CardRow>> {
        self.check(Operation::Cards)?;
        self.inner.search_cards(filters).await
    }
}
