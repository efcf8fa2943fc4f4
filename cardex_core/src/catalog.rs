use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Catalog record types a search can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Card,
    Player,
    Team,
    Series,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Card => "card",
            Self::Player => "player",
            Self::Team => "team",
            Self::Series => "series",
        }
    }

    /// Tie-break priority when entity types are mixed; lower ranks first.
    #[must_use]
    pub const fn priority(&self) -> u8 {
        match self {
            Self::Card => 0,
            Self::Player => 1,
            Self::Team => 2,
            Self::Series => 3,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCandidate {
    pub id: i64,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub total_card_count: u32,
    #[serde(default)]
    pub is_hall_of_fame: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCandidate {
    pub id: i64,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub mascot: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesCandidate {
    pub id: i64,
    pub name: String,
    pub set_name: String,
    pub manufacturer_name: String,
    #[serde(default)]
    pub year: Option<i32>,
    /// Insert series are extracted as insert tokens, not set tokens.
    #[serde(default)]
    pub is_insert: bool,
    #[serde(default)]
    pub production_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCandidate {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub hex_value: Option<String>,
}

/// One physical card with its display names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRow {
    pub id: i64,
    pub card_number: String,
    pub player_id: i64,
    pub player_name: String,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub team_name: Option<String>,
    pub series_id: i64,
    pub series_name: String,
    pub year: i32,
    #[serde(default)]
    pub color_id: Option<i64>,
    #[serde(default)]
    pub color_name: Option<String>,
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

/// AND-combined card constraints. Empty id lists and `None` values do not
/// constrain; `false` booleans do not constrain either.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilters {
    pub player_ids: Vec<i64>,
    pub team_ids: Vec<i64>,
    pub series_ids: Vec<i64>,
    pub insert_series_ids: Vec<i64>,
    pub color_ids: Vec<i64>,
    /// Case-insensitive substring of the card number.
    pub card_number: Option<String>,
    pub year: Option<i32>,
    pub print_run: Option<u32>,
    pub production_code: Option<String>,
    pub rookie: bool,
    pub autograph: bool,
    pub short_print: bool,
    pub relic: bool,
    pub limit: usize,
}

impl CardFilters {
    /// Whether a row satisfies every active constraint.
    #[must_use]
    pub fn matches(&self, row: &CardRow) -> bool {
        fn within(ids: &[i64], id: Option<i64>) -> bool {
            ids.is_empty() || id.is_some_and(|id| ids.contains(&id))
        }

        within(&self.player_ids, Some(row.player_id))
            && within(&self.team_ids, row.team_id)
            && within(&self.series_ids, Some(row.series_id))
            && within(&self.insert_series_ids, Some(row.series_id))
            && within(&self.color_ids, row.color_id)
            && self.card_number.as_ref().is_none_or(|n| {
                row.card_number
                    .to_lowercase()
                    .contains(&n.to_lowercase())
            })
            && self.year.is_none_or(|y| row.year == y)
            && self.print_run.is_none_or(|p| row.print_run == Some(p))
            && (!self.rookie || row.is_rookie)
            && (!self.autograph || row.is_autograph)
            && (!self.short_print || row.is_short_print)
            && (!self.relic || row.is_relic)
    }
}

/// Narrow read interface to the catalog store.
///
/// Name lookups are case-insensitive substring searches over every name
/// component of the entity. Ordering is the store's own (popularity or
/// recency) and only needs to be stable.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn search_players(&self, fragment: &str) -> anyhow::Result<Vec<PlayerCandidate>>;

    async fn search_teams(&self, fragment: &str) -> anyhow::Result<Vec<TeamCandidate>>;

    /// Base sets and insert series alike.
    async fn search_series(&self, fragment: &str) -> anyhow::Result<Vec<SeriesCandidate>>;

    async fn search_colors(&self, fragment: &str) -> anyhow::Result<Vec<ColorCandidate>>;

    async fn find_series_by_code(&self, code: &str) -> anyhow::Result<Vec<SeriesCandidate>>;

    async fn list_series_by_year(
        &self,
        year: i32,
        limit: usize,
    ) -> anyhow::Result<Vec<SeriesCandidate>>;

    async fn search_cards(&self, filters: &CardFilters) -> anyhow::Result<Vec<CardRow>>;
}

#[async_trait]
impl<R: EntityRepository + ?Sized> EntityRepository for Arc<R> {
    async fn search_players(&self, fragment: &str) -> anyhow::Result<Vec<PlayerCandidate>> {
        (**self).search_players(fragment).await
    }

    async fn search_teams(&self, fragment: &str) -> anyhow::Result<Vec<TeamCandidate>> {
        (**self).search_teams(fragment).await
    }

    async fn search_series(&self, fragment: &str) -> anyhow::Result<Vec<SeriesCandidate>> {
        (**self).search_series(fragment).await
    }

    async fn search_colors(&self, fragment: &str) -> anyhow::Result<Vec<ColorCandidate>> {
        (**self).search_colors(fragment).await
    }

    async fn find_series_by_code(&self, code: &str) -> anyhow::Result<Vec<SeriesCandidate>> {
        (**self).find_series_by_code(code).await
    }

    async fn list_series_by_year(
        &self,
        year: i32,
        limit: usize,
    ) -> anyhow::Result<Vec<SeriesCandidate>> {
        (**self).list_series_by_year(year, limit).await
    }

    async fn search_cards(&self, filters: &CardFilters) -> anyhow::Result<Vec<CardRow>> {
        (**self).search_cards(filters).await
    }
}

/// Bounded lookup cache for one entity type.
///
/// Entries are immutable once inserted; `put` on an existing key replaces
/// the whole entry. Callers must tolerate misses.
pub trait LookupCache<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<Vec<V>>>;

    fn put(&self, key: String, candidates: Arc<Vec<V>>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
