use std::path::PathBuf;
use tracing::info;

use super::init_service;

/// Input parameters for the Search command strategy.
#[derive(Debug, Clone)]
pub struct SearchInput {
    pub query: String,
    /// 0 means the configured default
    pub limit: usize,
    pub category: String,
    pub catalog: Option<PathBuf>,
    /// Print cache hit/miss counters to stderr afterwards
    pub stats: bool,
}

/// Strategy for running one search and printing the response as JSON.
#[derive(Debug, Clone, Copy)]
pub struct SearchStrategy;

impl super::CommandStrategy for SearchStrategy {
    type Input = SearchInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let service = init_service(input.catalog).await?;
        let limit = match input.limit {
            0 => service.config().default_limit,
            n => n,
        };

        let response = service
            .search_by_category_name(&input.query, limit, &input.category)
            .await?;
        info!(
            "Search {} finished with {} result(s)",
            response.search_id,
            response.results.len()
        );

        println!("{}", serde_json::to_string_pretty(&response)?);

        if input.stats {
            for (name, stats) in service.caches().stats() {
                eprintln!(
                    "cache {name}: {}/{} entries, {} hits, {} misses",
                    stats.entries, stats.capacity, stats.hits, stats.misses
                );
            }
        }
        Ok(())
    }
}
