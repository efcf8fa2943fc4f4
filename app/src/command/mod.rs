//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use cardex_config::Config;
use cardex_core::EntityRepository;
use cardex_search::{DatabaseCatalogRepository, InMemoryCatalog, SearchService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod explain;
mod info;
mod init;
mod search;
mod version;

pub use explain::{ExplainInput, ExplainStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use search::{SearchInput, SearchStrategy};
pub use version::VersionStrategy;

/// Open the catalog: a JSON file when one is given (on the command line or
/// in the config), the database otherwise.
async fn open_repository(
    config: &Config,
    catalog: Option<PathBuf>,
) -> anyhow::Result<Arc<dyn EntityRepository>> {
    match catalog.or_else(|| config.catalog_path.clone()) {
        Some(path) => {
            info!("Using JSON catalog {}", path.display());
            Ok(Arc::new(InMemoryCatalog::load(&path)?))
        }
        None => Ok(Arc::new(
            DatabaseCatalogRepository::connect(&config.database.url).await?,
        )),
    }
}

/// Load config and build a search service over the selected catalog.
async fn init_service(catalog: Option<PathBuf>) -> anyhow::Result<SearchService> {
    let config = Config::load_or_default()?;
    let repo = open_repository(&config, catalog).await?;
    SearchService::new(repo, config.search)
}

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
