//! Progressive filter removal for zero-result queries.

use cardex_core::{Category, Facet, Pattern, SearchResult, Shape, TokenSet};
use tracing::info;

use crate::pattern::PatternRecognizer;
use crate::planner::QueryExecutor;

/// Facets in the order they are dropped, least important first. Player and
/// production code are never dropped.
pub const RELAXATION_ORDER: [Facet; 9] = [
    Facet::Serial,
    Facet::Parallel,
    Facet::CardType,
    Facet::Insert,
    Facet::Keyword,
    Facet::CardNumber,
    Facet::Year,
    Facet::Set,
    Facet::Team,
];

#[derive(Debug, Clone)]
pub enum RelaxationOutcome {
    /// A relaxed query produced results.
    Recovered {
        results: Vec<SearchResult>,
        pattern: Pattern,
        filters_removed: Vec<String>,
    },
    /// Every droppable facet was removed without results.
    Exhausted { filters_removed: Vec<String> },
}

impl RelaxationOutcome {
    #[must_use]
    pub fn filters_removed(&self) -> &[String] {
        match self {
            Self::Recovered {
                filters_removed, ..
            }
            | Self::Exhausted { filters_removed } => filters_removed,
        }
    }

    /// User-facing explanation for an exhausted relaxation.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Recovered { .. } => None,
            Self::Exhausted { filters_removed } if filters_removed.is_empty() => {
                Some("No matches found and no filters could be relaxed".to_string())
            }
            Self::Exhausted { filters_removed } => Some(format!(
                "No matches found even after relaxing filters: {}",
                filters_removed.join(", ")
            )),
        }
    }
}

/// Drops facets one at a time and re-runs classification and retrieval
/// until something comes back.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelaxationController;

impl RelaxationController {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Relax a token set whose original execution returned nothing.
    ///
    /// Retries are sequential; each one works on a copy of the token set
    /// with one more facet removed.
    ///
    /// # Errors
    /// Returns the first repository error; relaxation stops there.
    pub async fn relax(
        &self,
        recognizer: &PatternRecognizer,
        executor: &QueryExecutor,
        tokens: &TokenSet,
        category: Category,
        limit: usize,
    ) -> anyhow::Result<RelaxationOutcome> {
        let mut working = tokens.clone();
        let mut filters_removed = Vec::new();

        for facet in RELAXATION_ORDER {
            if !working.has(facet) {
                continue;
            }
            working.clear(facet);
            filters_removed.push(facet.as_str().to_string());

            let pattern = recognizer.recognize(&working);
            if pattern.shape == Shape::Empty {
                break;
            }
            let results = executor
                .execute(&pattern, &working, category, limit)
                .await?;
            if !results.is_empty() {
                info!(
                    "Relaxed query recovered {} result(s) after dropping: {}",
                    results.len(),
                    filters_removed.join(", ")
                );
                return Ok(RelaxationOutcome::Recovered {
                    results,
                    pattern,
                    filters_removed,
                });
            }
        }

        info!(
            "Relaxation exhausted after dropping: {}",
            filters_removed.join(", ")
        );
        Ok(RelaxationOutcome::Exhausted { filters_removed })
    }
}
