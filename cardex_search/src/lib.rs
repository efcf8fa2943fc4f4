#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

pub mod cache;
pub mod catalog;
pub mod extraction;
pub mod fuzzy;
pub mod pattern;
pub mod planner;
pub mod rank;
pub mod relaxation;
pub mod service;
pub mod storage;

pub use cache::{CacheStats, CatalogCaches, LruLookupCache};
pub use catalog::{CatalogCard, CatalogData, InMemoryCatalog};
pub use extraction::{QueryRules, TokenExtractor};
pub use fuzzy::FuzzyEnhancer;
pub use pattern::PatternRecognizer;
pub use planner::QueryExecutor;
pub use rank::{Ranker, ResultRanker};
pub use relaxation::{RelaxationController, RelaxationOutcome};
pub use service::{QueryAnalysis, SearchService};
pub use storage::DatabaseCatalogRepository;
