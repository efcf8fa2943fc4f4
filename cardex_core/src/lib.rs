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

pub mod catalog;
pub mod config;
pub mod error;
pub mod pattern;
pub mod result;
pub mod token;
pub mod util;

pub use catalog::{
    CardFilters, CardRow, ColorCandidate, EntityRepository, EntityType, LookupCache,
    PlayerCandidate, SeriesCandidate, TeamCandidate,
};
pub use config::{CacheConfig, FuzzyConfig, NgramConfig, SearchConfig};
pub use error::SearchError;
pub use pattern::{Pattern, Shape, Strategy};
pub use result::{Category, PatternSummary, RelaxationInfo, SearchResponse, SearchResult};
pub use token::{
    CardNumberClass, CardNumberToken, CardTypeFlags, Facet, Identity, InsertToken, KeywordToken,
    ParallelToken, PlayerToken, ProductionCodeToken, SerialToken, SetToken, TeamToken, Token,
    TokenSet, YearToken, push_unique, strongest,
};
