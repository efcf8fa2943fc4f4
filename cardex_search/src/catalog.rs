//! JSON-backed catalog held entirely in memory.

use anyhow::Context;
use async_trait::async_trait;
use cardex_core::{
    CardFilters, CardRow, ColorCandidate, EntityRepository, PlayerCandidate, SeriesCandidate,
    TeamCandidate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A card as stored, with foreign keys instead of display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCard {
    pub id: i64,
    pub card_number: String,
    pub player_id: i64,
    #[serde(default)]
    pub team_id: Option<i64>,
    pub series_id: i64,
    #[serde(default)]
    pub color_id: Option<i64>,
    pub year: i32,
    #[serde(default)]
    pub print_run: Option<u32>,
    #[serde(default)]
    pub is_rookie: bool,
    #[serde(default)]
    pub is_autograph: bool,
    #[serde(default)]
    pub is_short_print: bool,
    #[serde(default)]
    pub is_relic: bool,
}

/// The catalog document: `{players, teams, series, colors, cards}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub players: Vec<PlayerCandidate>,
    #[serde(default)]
    pub teams: Vec<TeamCandidate>,
    #[serde(default)]
    pub series: Vec<SeriesCandidate>,
    #[serde(default)]
    pub colors: Vec<ColorCandidate>,
    #[serde(default)]
    pub cards: Vec<CatalogCard>,
}

/// [`EntityRepository`] over a [`CatalogData`] document.
///
/// Name lookups are case-insensitive substring matches. Players are ordered
/// by card count, series by year (newest first), cards by descending id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    data: CatalogData,
}

impl InMemoryCatalog {
    #[must_use]
    pub const fn new(data: CatalogData) -> Self {
        Self { data }
    }

    /// Parse a catalog document.
    ///
    /// # Errors
    /// Returns an error if the JSON does not match the catalog layout.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let data = serde_json::from_str(json).context("Failed to parse catalog JSON")?;
        Ok(Self::new(data))
    }

    /// Read a catalog document from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_json(&json)
    }

    #[must_use]
    pub const fn data(&self) -> &CatalogData {
        &self.data
    }

    fn resolve(&self, card: &CatalogCard) -> CardRow {
        let player_name = self
            .data
            .players
            .iter()
            .find(|p| p.id == card.player_id)
            .map(|p| p.full_name.clone())
            .unwrap_or_default();
        let team_name = card
            .team_id
            .and_then(|id| self.data.teams.iter().find(|t| t.id == id))
            .map(|t| t.name.clone());
        let series_name = self
            .data
            .series
            .iter()
            .find(|s| s.id == card.series_id)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let color_name = card
            .color_id
            .and_then(|id| self.data.colors.iter().find(|c| c.id == id))
            .map(|c| c.name.clone());

        CardRow {
            id: card.id,
            card_number: card.card_number.clone(),
            player_id: card.player_id,
            player_name,
            team_id: card.team_id,
            team_name,
            series_id: card.series_id,
            series_name,
            year: card.year,
            color_id: card.color_id,
            color_name,
            print_run: card.print_run,
            is_rookie: card.is_rookie,
            is_autograph: card.is_autograph,
            is_short_print: card.is_short_print,
            is_relic: card.is_relic,
        }
    }

    fn series_has_code(&self, series_id: i64, code: &str) -> bool {
        self.data.series.iter().any(|s| {
            s.id == series_id
                && s.production_code
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(code))
        })
    }
}

fn any_contains<'a>(fields: impl IntoIterator<Item = &'a str>, fragment: &str) -> bool {
    fields
        .into_iter()
        .any(|f| f.to_lowercase().contains(fragment))
}

fn sort_series(series: &mut [SeriesCandidate]) {
    series.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.id.cmp(&b.id)));
}

#[async_trait]
impl EntityRepository for InMemoryCatalog {
    async fn search_players(&self, fragment: &str) -> anyhow::Result<Vec<PlayerCandidate>> {
        let fragment = fragment.to_lowercase();
        let mut players: Vec<PlayerCandidate> = self
            .data
            .players
            .iter()
            .filter(|p| {
                any_contains(
                    [
                        p.full_name.as_str(),
                        p.first_name.as_str(),
                        p.last_name.as_str(),
                    ]
                    .into_iter()
                    .chain(p.nickname.as_deref()),
                    &fragment,
                )
            })
            .cloned()
            .collect();
        players.sort_by(|a, b| {
            b.total_card_count
                .cmp(&a.total_card_count)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(players)
    }

    async fn search_teams(&self, fragment: &str) -> anyhow::Result<Vec<TeamCandidate>> {
        let fragment = fragment.to_lowercase();
        Ok(self
            .data
            .teams
            .iter()
            .filter(|t| {
                any_contains(
                    [t.name.as_str(), t.city.as_str()]
                        .into_iter()
                        .chain(t.mascot.as_deref())
                        .chain(t.abbreviation.as_deref()),
                    &fragment,
                )
            })
            .cloned()
            .collect())
    }

    async fn search_series(&self, fragment: &str) -> anyhow::Result<Vec<SeriesCandidate>> {
        let fragment = fragment.to_lowercase();
        let mut series: Vec<SeriesCandidate> = self
            .data
            .series
            .iter()
            .filter(|s| {
                any_contains(
                    [
                        s.name.as_str(),
                        s.set_name.as_str(),
                        s.manufacturer_name.as_str(),
                    ],
                    &fragment,
                )
            })
            .cloned()
            .collect();
        sort_series(&mut series);
        Ok(series)
    }

    async fn search_colors(&self, fragment: &str) -> anyhow::Result<Vec<ColorCandidate>> {
        let fragment = fragment.to_lowercase();
        Ok(self
            .data
            .colors
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&fragment))
            .cloned()
            .collect())
    }

    async fn find_series_by_code(&self, code: &str) -> anyhow::Result<Vec<SeriesCandidate>> {
        Ok(self
            .data
            .series
            .iter()
            .filter(|s| {
                s.production_code
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(code))
            })
            .cloned()
            .collect())
    }

    async fn list_series_by_year(
        &self,
        year: i32,
        limit: usize,
    ) -> anyhow::Result<Vec<SeriesCandidate>> {
        let mut series: Vec<SeriesCandidate> = self
            .data
            .series
            .iter()
            .filter(|s| s.year == Some(year))
            .cloned()
            .collect();
        sort_series(&mut series);
        if limit > 0 {
            series.truncate(limit);
        }
        Ok(series)
    }

    async fn search_cards(&self, filters: &CardFilters) -> anyhow::Result<Vec<CardRow>> {
        let mut rows: Vec<CardRow> = self
            .data
            .cards
            .iter()
            .filter(|card| {
                filters
                    .production_code
                    .as_deref()
                    .is_none_or(|code| self.series_has_code(card.series_id, code))
            })
            .map(|card| self.resolve(card))
            .filter(|row| filters.matches(row))
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        if filters.limit > 0 {
            rows.truncate(filters.limit);
        }
        Ok(rows)
    }
}
