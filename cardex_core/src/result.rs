use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::catalog::EntityType;
use crate::pattern::{Pattern, Shape, Strategy};

/// One ranked hit. Built by the executor, consumed once by the ranker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub display_fields: BTreeMap<String, String>,
    /// 0..=100
    pub relevance_score: u8,
}

impl SearchResult {
    #[must_use]
    pub fn new(entity_type: EntityType, entity_id: i64, relevance_score: u8) -> Self {
        Self {
            entity_type,
            entity_id,
            display_fields: BTreeMap::new(),
            relevance_score: relevance_score.min(100),
        }
    }

    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.display_fields.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn key(&self) -> (EntityType, i64) {
        (self.entity_type, self.entity_id)
    }
}

/// Restricts which entity types a search may return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Cards,
    Players,
    Teams,
    Series,
}

impl Category {
    /// Parse a category name; unknown names yield `None`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "" | "all" => Some(Self::All),
            "cards" | "card" => Some(Self::Cards),
            "players" | "player" => Some(Self::Players),
            "teams" | "team" => Some(Self::Teams),
            "series" | "sets" | "set" => Some(Self::Series),
            _ => None,
        }
    }

    #[must_use]
    pub const fn admits(&self, entity_type: EntityType) -> bool {
        matches!(
            (self, entity_type),
            (Self::All, _)
                | (Self::Cards, EntityType::Card)
                | (Self::Players, EntityType::Player)
                | (Self::Teams, EntityType::Team)
                | (Self::Series, EntityType::Series)
        )
    }

    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Cards => "cards",
            Self::Players => "players",
            Self::Teams => "teams",
            Self::Series => "series",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| anyhow::anyhow!("unknown category: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub shape: Shape,
    pub strategy: Strategy,
    pub confidence: u8,
}

impl From<Pattern> for PatternSummary {
    fn from(pattern: Pattern) -> Self {
        Self {
            shape: pattern.shape,
            strategy: pattern.strategy,
            confidence: pattern.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaxationInfo {
    /// Facet names in the order they were dropped.
    pub filters_removed: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub search_id: Uuid,
    pub query: String,
    pub results: Vec<SearchResult>,
    pub pattern: PatternSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relaxed: Option<RelaxationInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SearchResponse {
    /// Response for queries that never reach the pipeline.
    #[must_use]
    pub fn empty(query: &str) -> Self {
        Self {
            search_id: Uuid::now_v7(),
            query: query.to_string(),
            results: Vec::new(),
            pattern: Pattern::empty().into(),
            relaxed: None,
            suggestions: Vec::new(),
            message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_accepts_aliases() {
        assert_eq!(Category::parse("Players"), Some(Category::Players));
        assert_eq!(Category::parse("sets"), Some(Category::Series));
        assert_eq!(Category::parse(""), Some(Category::All));
        assert_eq!(Category::parse("stadiums"), None);
    }

    #[test]
    fn category_admits() {
        assert!(Category::All.admits(EntityType::Team));
        assert!(Category::Cards.admits(EntityType::Card));
        assert!(!Category::Cards.admits(EntityType::Player));
    }

    #[test]
    fn empty_response_has_no_results() {
        let response = SearchResponse::empty("a");
        assert!(response.results.is_empty());
        assert_eq!(response.pattern.strategy, Strategy::NoResults);
        assert!(response.relaxed.is_none());
    }
}
