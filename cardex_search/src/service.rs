//! The search entry point: extraction, classification, retrieval,
//! relaxation and ranking for one query.

use cardex_core::{
    Category, EntityRepository, Pattern, RelaxationInfo, SearchConfig, SearchError,
    SearchResponse, Shape, TokenSet,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::cache::CatalogCaches;
use crate::extraction::{TokenExtractor, cleanup};
use crate::fuzzy::FuzzyEnhancer;
use crate::pattern::PatternRecognizer;
use crate::planner::QueryExecutor;
use crate::rank::{Ranker, ResultRanker};
use crate::relaxation::{RelaxationController, RelaxationOutcome};

/// How a query was understood, without retrieval.
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnalysis {
    pub query: String,
    pub tokens: TokenSet,
    pub pattern: Pattern,
    pub suggestions: Vec<String>,
}

pub struct SearchService {
    extractor: TokenExtractor,
    enhancer: FuzzyEnhancer,
    recognizer: PatternRecognizer,
    executor: QueryExecutor,
    relaxation: RelaxationController,
    ranker: Box<dyn Ranker>,
    config: SearchConfig,
}

impl SearchService {
    /// Create a service with LRU caches sized from `config`.
    ///
    /// # Errors
    /// Returns an error if the extraction rules fail to compile.
    pub fn new(repo: Arc<dyn EntityRepository>, config: SearchConfig) -> anyhow::Result<Self> {
        let caches = CatalogCaches::from_config(&config.cache);
        Self::with_caches(repo, config, caches)
    }

    /// Create a service with caller-supplied caches.
    ///
    /// # Errors
    /// Returns an error if the extraction rules fail to compile.
    pub fn with_caches(
        repo: Arc<dyn EntityRepository>,
        config: SearchConfig,
        caches: CatalogCaches,
    ) -> anyhow::Result<Self> {
        let extractor = TokenExtractor::new(Arc::clone(&repo), caches, config.clone())?;
        info!("SearchService initialized");
        Ok(Self {
            extractor,
            enhancer: FuzzyEnhancer::new(config.fuzzy.clone()),
            recognizer: PatternRecognizer::new(),
            executor: QueryExecutor::new(repo),
            relaxation: RelaxationController::new(),
            ranker: Box::new(ResultRanker::new()),
            config,
        })
    }

    /// Replace the default ranker.
    #[must_use]
    pub fn with_ranker(mut self, ranker: Box<dyn Ranker>) -> Self {
        self.ranker = ranker;
        self
    }

    #[must_use]
    pub const fn caches(&self) -> &CatalogCaches {
        self.extractor.caches()
    }

    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search the catalog.
    ///
    /// # Arguments
    /// * `query` - Free text as typed by the user
    /// * `limit` - Maximum results after ranking, clamped to `max_limit`
    /// * `category` - Entity types to return
    ///
    /// # Errors
    /// Returns [`SearchError::Repository`] if the main retrieval (or a
    /// relaxation retry) fails. Extraction failures never surface here.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        category: Category,
    ) -> Result<SearchResponse, SearchError> {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.config.min_query_chars {
            return Ok(SearchResponse::empty(trimmed));
        }

        let search_id = Uuid::now_v7();
        let span = info_span!("search", %search_id, category = category.as_str());
        self.run(search_id, trimmed, limit, category)
            .instrument(span)
            .await
    }

    /// [`Self::search`] with the category given by name. Unknown names get
    /// an empty response rather than an error.
    ///
    /// # Errors
    /// Same as [`Self::search`].
    pub async fn search_by_category_name(
        &self,
        query: &str,
        limit: usize,
        category: &str,
    ) -> Result<SearchResponse, SearchError> {
        match Category::parse(category) {
            Some(category) => self.search(query, limit, category).await,
            None => {
                info!("Unknown category '{}', returning no results", category);
                Ok(SearchResponse::empty(query.trim()))
            }
        }
    }

    /// Extract, enhance and classify a query without retrieving anything.
    pub async fn analyze(&self, query: &str) -> QueryAnalysis {
        let trimmed = query.trim();
        let (tokens, pattern, suggestions) = self.understand(trimmed).await;
        QueryAnalysis {
            query: trimmed.to_string(),
            tokens,
            pattern,
            suggestions,
        }
    }

    async fn understand(&self, query: &str) -> (TokenSet, Pattern, Vec<String>) {
        let mut tokens = self.extractor.extract_raw(query).await;
        self.enhancer
            .enhance(&self.extractor, query, &mut tokens)
            .await;
        cleanup::resolve_collisions(&mut tokens, &self.config);

        let pattern = self.recognizer.recognize(&tokens);
        let suggestions = self.enhancer.suggestions(&tokens, query);
        (tokens, pattern, suggestions)
    }

    async fn run(
        &self,
        search_id: Uuid,
        query: &str,
        limit: usize,
        category: Category,
    ) -> Result<SearchResponse, SearchError> {
        let limit = self.config.effective_limit(limit);
        let (tokens, pattern, suggestions) = self.understand(query).await;
        info!(
            "Query '{}' classified as {} / {} (confidence {})",
            query,
            pattern.shape.as_str(),
            pattern.strategy,
            pattern.confidence
        );

        let mut results = if limit == 0 {
            Vec::new()
        } else {
            self.executor
                .execute(&pattern, &tokens, category, limit)
                .await
                .map_err(SearchError::repository)?
        };

        let mut relaxed = None;
        let mut message = None;
        if results.is_empty()
            && limit > 0
            && pattern.shape != Shape::Empty
            && self.config.relaxation_enabled
        {
            let outcome = self
                .relaxation
                .relax(&self.recognizer, &self.executor, &tokens, category, limit)
                .await
                .map_err(SearchError::repository)?;
            message = outcome.message();
            if !outcome.filters_removed().is_empty() {
                relaxed = Some(RelaxationInfo {
                    filters_removed: outcome.filters_removed().to_vec(),
                });
            }
            if let RelaxationOutcome::Recovered {
                results: recovered, ..
            } = outcome
            {
                results = recovered;
            }
        }

        let results = self.ranker.rank(results, limit);
        info!("Search returned {} result(s)", results.len());
        Ok(SearchResponse {
            search_id,
            query: query.to_string(),
            results,
            pattern: pattern.into(),
            relaxed,
            suggestions,
            message,
        })
    }
}
