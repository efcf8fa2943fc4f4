//! Catalog repository over the relational store.

use async_trait::async_trait;
use cardex_core::{
    CardFilters, CardRow, ColorCandidate, EntityRepository, PlayerCandidate, SeriesCandidate,
    TeamCandidate,
};
use cardex_entities::{cards, colors, players, series, teams};
use sea_orm::{
    ColumnTrait, Condition, Database, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::collections::HashMap;
use tracing::info;

/// Upper bound on candidates returned per name lookup.
const NAME_LOOKUP_LIMIT: u64 = 50;

/// [`EntityRepository`] backed by the `cardex_entities` tables.
///
/// Name lookups match the lowercased `search_text` column; cards are
/// returned newest first.
pub struct DatabaseCatalogRepository {
    db: DatabaseConnection,
}

impl DatabaseCatalogRepository {
    /// Connect to the catalog database.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to catalog database");
        let db = Database::connect(database_url).await?;
        info!("Catalog repository initialized");
        Ok(Self { db })
    }

    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn series_ids_with_code(&self, code: &str) -> anyhow::Result<Vec<i64>> {
        let models = series::Entity::find()
            .filter(series::Column::ProductionCode.eq(code.to_uppercase()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(|m| m.id).collect())
    }

    /// Display names for the ids referenced by a page of cards.
    async fn names_for(&self, models: &[cards::Model]) -> anyhow::Result<NameIndex> {
        let player_ids: Vec<i64> = models.iter().map(|c| c.player_id).collect();
        let team_ids: Vec<i64> = models.iter().filter_map(|c| c.team_id).collect();
        let series_ids: Vec<i64> = models.iter().map(|c| c.series_id).collect();
        let color_ids: Vec<i64> = models.iter().filter_map(|c| c.color_id).collect();

        let players = players::Entity::find()
            .filter(players::Column::Id.is_in(player_ids))
            .all(&self.db)
            .await?;
        let teams = teams::Entity::find()
            .filter(teams::Column::Id.is_in(team_ids))
            .all(&self.db)
            .await?;
        let series = series::Entity::find()
            .filter(series::Column::Id.is_in(series_ids))
            .all(&self.db)
            .await?;
        let colors = colors::Entity::find()
            .filter(colors::Column::Id.is_in(color_ids))
            .all(&self.db)
            .await?;

        Ok(NameIndex {
            players: players.into_iter().map(|m| (m.id, m.full_name)).collect(),
            teams: teams.into_iter().map(|m| (m.id, m.name)).collect(),
            series: series.into_iter().map(|m| (m.id, m.name)).collect(),
            colors: colors.into_iter().map(|m| (m.id, m.name)).collect(),
        })
    }
}

#[derive(Default)]
struct NameIndex {
    players: HashMap<i64, String>,
    teams: HashMap<i64, String>,
    series: HashMap<i64, String>,
    colors: HashMap<i64, String>,
}

impl NameIndex {
    fn row(&self, model: cards::Model) -> CardRow {
        CardRow {
            id: model.id,
            card_number: model.card_number,
            player_id: model.player_id,
            player_name: self
                .players
                .get(&model.player_id)
                .cloned()
                .unwrap_or_default(),
            team_id: model.team_id,
            team_name: model.team_id.and_then(|id| self.teams.get(&id).cloned()),
            series_id: model.series_id,
            series_name: self
                .series
                .get(&model.series_id)
                .cloned()
                .unwrap_or_default(),
            year: model.year,
            color_id: model.color_id,
            color_name: model.color_id.and_then(|id| self.colors.get(&id).cloned()),
            print_run: model.print_run.and_then(|p| u32::try_from(p).ok()),
            is_rookie: model.is_rookie,
            is_autograph: model.is_autograph,
            is_short_print: model.is_short_print,
            is_relic: model.is_relic,
        }
    }
}

fn player_candidate(model: players::Model) -> PlayerCandidate {
    PlayerCandidate {
        id: model.id,
        full_name: model.full_name,
        first_name: model.first_name,
        last_name: model.last_name,
        nickname: model.nickname,
        total_card_count: u32::try_from(model.total_card_count).unwrap_or(0),
        is_hall_of_fame: model.is_hall_of_fame,
    }
}

fn team_candidate(model: teams::Model) -> TeamCandidate {
    TeamCandidate {
        id: model.id,
        name: model.name,
        city: model.city,
        mascot: model.mascot,
        abbreviation: model.abbreviation,
    }
}

fn series_candidate(model: series::Model) -> SeriesCandidate {
    SeriesCandidate {
        id: model.id,
        name: model.name,
        set_name: model.set_name,
        manufacturer_name: model.manufacturer_name,
        year: model.year,
        is_insert: model.is_insert,
        production_code: model.production_code,
    }
}

fn color_candidate(model: colors::Model) -> ColorCandidate {
    ColorCandidate {
        id: model.id,
        name: model.name,
        hex_value: model.hex_value,
    }
}

#[async_trait]
impl EntityRepository for DatabaseCatalogRepository {
    async fn search_players(&self, fragment: &str) -> anyhow::Result<Vec<PlayerCandidate>> {
        let models = players::Entity::find()
            .filter(players::Column::SearchText.contains(fragment.to_lowercase()))
            .order_by_desc(players::Column::TotalCardCount)
            .order_by_asc(players::Column::Id)
            .limit(NAME_LOOKUP_LIMIT)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(player_candidate).collect())
    }

    async fn search_teams(&self, fragment: &str) -> anyhow::Result<Vec<TeamCandidate>> {
        let models = teams::Entity::find()
            .filter(teams::Column::SearchText.contains(fragment.to_lowercase()))
            .order_by_asc(teams::Column::Id)
            .limit(NAME_LOOKUP_LIMIT)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(team_candidate).collect())
    }

    async fn search_series(&self, fragment: &str) -> anyhow::Result<Vec<SeriesCandidate>> {
        let models = series::Entity::find()
            .filter(series::Column::SearchText.contains(fragment.to_lowercase()))
            .order_by_desc(series::Column::Year)
            .order_by_asc(series::Column::Id)
            .limit(NAME_LOOKUP_LIMIT)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(series_candidate).collect())
    }

    async fn search_colors(&self, fragment: &str) -> anyhow::Result<Vec<ColorCandidate>> {
        let models = colors::Entity::find()
            .filter(colors::Column::SearchText.contains(fragment.to_lowercase()))
            .order_by_asc(colors::Column::Id)
            .limit(NAME_LOOKUP_LIMIT)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(color_candidate).collect())
    }

    async fn find_series_by_code(&self, code: &str) -> anyhow::Result<Vec<SeriesCandidate>> {
        let models = series::Entity::find()
            .filter(series::Column::ProductionCode.eq(code.to_uppercase()))
            .order_by_asc(series::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(series_candidate).collect())
    }

    async fn list_series_by_year(
        &self,
        year: i32,
        limit: usize,
    ) -> anyhow::Result<Vec<SeriesCandidate>> {
        let mut query = series::Entity::find()
            .filter(series::Column::Year.eq(year))
            .order_by_asc(series::Column::Id);
        if limit > 0 {
            query = query.limit(u64::try_from(limit).unwrap_or(u64::MAX));
        }
        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(series_candidate).collect())
    }

    async fn search_cards(&self, filters: &CardFilters) -> anyhow::Result<Vec<CardRow>> {
        let mut condition = Condition::all();
        if !filters.player_ids.is_empty() {
            condition = condition.add(cards::Column::PlayerId.is_in(filters.player_ids.clone()));
        }
        if !filters.team_ids.is_empty() {
            condition = condition.add(cards::Column::TeamId.is_in(filters.team_ids.clone()));
        }
        if !filters.series_ids.is_empty() {
            condition = condition.add(cards::Column::SeriesId.is_in(filters.series_ids.clone()));
        }
        if !filters.insert_series_ids.is_empty() {
            condition =
                condition.add(cards::Column::SeriesId.is_in(filters.insert_series_ids.clone()));
        }
        if !filters.color_ids.is_empty() {
            condition = condition.add(cards::Column::ColorId.is_in(filters.color_ids.clone()));
        }
        if let Some(number) = &filters.card_number {
            condition = condition.add(card_number_condition(number));
        }
        if let Some(year) = filters.year {
            condition = condition.add(cards::Column::Year.eq(year));
        }
        if let Some(print_run) = filters.print_run {
            let print_run = i32::try_from(print_run)?;
            condition = condition.add(cards::Column::PrintRun.eq(print_run));
        }
        if let Some(code) = &filters.production_code {
            let ids = self.series_ids_with_code(code).await?;
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            condition = condition.add(cards::Column::SeriesId.is_in(ids));
        }
        for (wanted, column) in [
            (filters.rookie, cards::Column::IsRookie),
            (filters.autograph, cards::Column::IsAutograph),
            (filters.short_print, cards::Column::IsShortPrint),
            (filters.relic, cards::Column::IsRelic),
        ] {
            if wanted {
                condition = condition.add(column.eq(true));
            }
        }

        let mut query = cards::Entity::find()
            .filter(condition)
            .order_by_desc(cards::Column::Id);
        if filters.limit > 0 {
            query = query.limit(u64::try_from(filters.limit).unwrap_or(u64::MAX));
        }
        let models = query.all(&self.db).await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let names = self.names_for(&models).await?;
        Ok(models.into_iter().map(|m| names.row(m)).collect())
    }
}

/// Case-insensitive substring match on the card number.
fn card_number_condition(number: &str) -> Condition {
    Condition::all().add(cards::Column::CardNumberSearch.contains(number.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn card_number_matches_lowercased_column() {
        let sql = cards::Entity::find()
            .filter(card_number_condition("BCP-50"))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""card_number_search" LIKE '%bcp-50%'"#), "{sql}");
        assert!(!sql.contains("BCP"), "{sql}");
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        let candidate = player_candidate(players::Model {
            id: 1,
            full_name: "Mike Trout".to_string(),
            first_name: "Mike".to_string(),
            last_name: "Trout".to_string(),
            nickname: None,
            total_card_count: -4,
            is_hall_of_fame: false,
            search_text: "mike trout".to_string(),
        });
        assert_eq!(candidate.total_card_count, 0);
    }

    #[test]
    fn card_rows_resolve_names_from_index() {
        let index = NameIndex {
            players: HashMap::from([(1, "Mike Trout".to_string())]),
            colors: HashMap::from([(9, "Gold".to_string())]),
            ..NameIndex::default()
        };
        let row = index.row(cards::Model {
            id: 5,
            card_number: "US175".to_string(),
            card_number_search: "us175".to_string(),
            player_id: 1,
            team_id: Some(2),
            series_id: 3,
            color_id: Some(9),
            year: 2011,
            print_run: Some(50),
            is_rookie: true,
            is_autograph: false,
            is_short_print: false,
            is_relic: false,
        });
        assert_eq!(row.player_name, "Mike Trout");
        assert_eq!(row.team_name, None);
        assert_eq!(row.color_name.as_deref(), Some("Gold"));
        assert_eq!(row.print_run, Some(50));
    }
}
