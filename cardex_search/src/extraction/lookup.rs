use async_trait::async_trait;
use cardex_core::util::normalize_key;
use cardex_core::{
    ColorCandidate, EntityRepository, LookupCache, PlayerCandidate, SeriesCandidate,
    TeamCandidate,
};
use std::sync::Arc;

/// Candidate types fetched from the repository by name fragment.
#[async_trait]
pub trait NameLookup: Clone + Send + Sync + 'static {
    async fn fetch(repo: &dyn EntityRepository, fragment: &str) -> anyhow::Result<Vec<Self>>;
}

#[async_trait]
impl NameLookup for PlayerCandidate {
    async fn fetch(repo: &dyn EntityRepository, fragment: &str) -> anyhow::Result<Vec<Self>> {
        repo.search_players(fragment).await
    }
}

#[async_trait]
impl NameLookup for TeamCandidate {
    async fn fetch(repo: &dyn EntityRepository, fragment: &str) -> anyhow::Result<Vec<Self>> {
        repo.search_teams(fragment).await
    }
}

#[async_trait]
impl NameLookup for SeriesCandidate {
    async fn fetch(repo: &dyn EntityRepository, fragment: &str) -> anyhow::Result<Vec<Self>> {
        repo.search_series(fragment).await
    }
}

#[async_trait]
impl NameLookup for ColorCandidate {
    async fn fetch(repo: &dyn EntityRepository, fragment: &str) -> anyhow::Result<Vec<Self>> {
        repo.search_colors(fragment).await
    }
}

/// Cache-first fragment lookup. Only a completed repository call is
/// written back; a dropped future leaves the cache untouched.
pub async fn cached_lookup<V: NameLookup>(
    repo: &dyn EntityRepository,
    cache: &dyn LookupCache<V>,
    fragment: &str,
) -> anyhow::Result<Arc<Vec<V>>> {
    let key = normalize_key(fragment);
    if let Some(hit) = cache.get(&key) {
        return Ok(hit);
    }
    let fetched = Arc::new(V::fetch(repo, &key).await?);
    cache.put(key, Arc::clone(&fetched));
    Ok(fetched)
}
