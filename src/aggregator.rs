//! One aggregation pass over all configured providers.
//!
//! 1. **Fan-out**: every provider is fetched concurrently and every outcome is
//!    collected, success or failure. One slow or failing provider never aborts
//!    the others.
//! 2. **Merge**: successful results are concatenated in provider priority
//!    order, regardless of which request finished first.
//! 3. **Dedup**: exact title match, first occurrence wins.
//! 4. **Sort**: newest first; the sort is stable so equal timestamps keep
//!    provider priority order.
//! 5. **Truncate** to the configured maximum.
//!
//! An empty result is a normal outcome, not an error.

use crate::config::DEFAULT_MAX_ARTICLES;
use crate::models::Article;
use crate::providers::ProviderClient;
use futures::future::join_all;
use itertools::Itertools;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Stateless merge/dedup/sort/truncate pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    max_articles: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ARTICLES)
    }
}

impl Aggregator {
    pub fn new(max_articles: usize) -> Self {
        Self { max_articles }
    }

    pub fn max_articles(&self) -> usize {
        self.max_articles
    }

    /// Run every provider and return the merged feed. Never fails.
    #[instrument(level = "info", skip_all, fields(providers = providers.len()))]
    pub async fn aggregate(&self, providers: &[Arc<dyn ProviderClient>]) -> Vec<Article> {
        let t0 = Instant::now();
        let outcomes = join_all(providers.iter().map(|provider| provider.fetch())).await;

        let mut failed = 0usize;
        let batches = providers
            .iter()
            .zip(outcomes)
            .filter_map(|(provider, outcome)| match outcome {
                Ok(articles) => {
                    debug!(provider = provider.name(), count = articles.len(), "Provider settled");
                    Some(articles)
                }
                Err(e) => {
                    failed += 1;
                    warn!(provider = provider.name(), error = %e, "Provider failed; contributing nothing");
                    None
                }
            })
            .collect::<Vec<_>>();

        let merged = self.merge(batches);
        info!(
            count = merged.len(),
            failed,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Aggregation complete"
        );
        merged
    }

    /// Merge per-provider batches that are already in priority order.
    pub fn merge(&self, batches: Vec<Vec<Article>>) -> Vec<Article> {
        let mut articles = batches
            .into_iter()
            .flatten()
            .unique_by(|article| article.title.clone())
            .collect::<Vec<Article>>();

        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles.truncate(self.max_articles);
        articles
    }
}
