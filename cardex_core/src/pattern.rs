//! Query classification types.

use serde::{Deserialize, Serialize};

/// Shape of a token set, by number of active token variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shape {
    Empty,
    Single,
    Two,
    Three,
    FourRich,
    Complex,
}

impl Shape {
    #[must_use]
    pub const fn from_count(count: usize) -> Self {
        match count {
            0 => Self::Empty,
            1 => Self::Single,
            2 => Self::Two,
            3 => Self::Three,
            4 => Self::FourRich,
            _ => Self::Complex,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::Empty => "EMPTY",
            Self::Single => "SINGLE",
            Self::Two => "TWO",
            Self::Three => "THREE",
            Self::FourRich => "FOUR_RICH",
            Self::Complex => "COMPLEX",
        }
    }
}

/// Retrieval strategy chosen for a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    NoResults,
    SeriesByCode,
    PlayerListing,
    CardNumberSearch,
    YearBrowse,
    SetBrowse,
    TeamBrowse,
    CardTypeBrowse,
    ParallelBrowse,
    SerialBrowse,
    InsertBrowse,
    KeywordBrowse,
    PlayerCardNumber,
    SetYearBrowse,
    MultiFilter,
}

impl Strategy {
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NoResults => "no_results",
            Self::SeriesByCode => "series_by_code",
            Self::PlayerListing => "player_listing",
            Self::CardNumberSearch => "card_number_search",
            Self::YearBrowse => "year_browse",
            Self::SetBrowse => "set_browse",
            Self::TeamBrowse => "team_browse",
            Self::CardTypeBrowse => "card_type_browse",
            Self::ParallelBrowse => "parallel_browse",
            Self::SerialBrowse => "serial_browse",
            Self::InsertBrowse => "insert_browse",
            Self::KeywordBrowse => "keyword_browse",
            Self::PlayerCardNumber => "player_card_number",
            Self::SetYearBrowse => "set_year_browse",
            Self::MultiFilter => "multi_filter",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub shape: Shape,
    pub strategy: Strategy,
    /// 0..=100
    pub confidence: u8,
    pub active_type_count: usize,
}

impl Pattern {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            shape: Shape::Empty,
            strategy: Strategy::NoResults,
            confidence: 0,
            active_type_count: 0,
        }
    }
}
