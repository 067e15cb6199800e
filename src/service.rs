//! The read path consumers call.
//!
//! [`FeedService::get_feed`] serves the cached aggregation result while it is
//! fresh, refreshes it through the [`Aggregator`] when it is not, and
//! substitutes the built-in fallback set whenever the result is empty. It
//! never fails and never returns an empty list.

use crate::aggregator::Aggregator;
use crate::cache::FreshnessCache;
use crate::config::FeedConfig;
use crate::error::Result;
use crate::fallback::fallback_articles;
use crate::models::{Article, FeedPage};
use crate::providers::{ProviderClient, build_providers, http_client};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct FeedService {
    providers: Vec<Arc<dyn ProviderClient>>,
    aggregator: Aggregator,
    cache: FreshnessCache,
}

impl FeedService {
    /// `providers` must already be in priority order.
    pub fn new(
        providers: Vec<Arc<dyn ProviderClient>>,
        aggregator: Aggregator,
        cache: FreshnessCache,
    ) -> Self {
        Self {
            providers,
            aggregator,
            cache,
        }
    }

    /// Build the HTTP client, providers and cache described by `config`.
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let client = http_client(config.request_timeout)?;
        let providers = build_providers(config, &client);
        info!(
            providers = %config.providers.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(","),
            ttl_secs = config.cache_ttl.as_secs(),
            max_articles = config.max_articles,
            "Feed service configured"
        );

        Ok(Self::new(
            providers,
            Aggregator::new(config.max_articles),
            FreshnessCache::new(config.cache_ttl),
        ))
    }

    pub fn providers(&self) -> &[Arc<dyn ProviderClient>] {
        &self.providers
    }

    /// The current feed, newest first.
    #[instrument(level = "debug", skip_all)]
    pub async fn get_feed(&self) -> Arc<[Article]> {
        let articles = self
            .cache
            .get(|| self.aggregator.aggregate(&self.providers))
            .await;

        if articles.is_empty() {
            info!("No live articles available; serving fallback set");
            return fallback_articles();
        }
        debug!(count = articles.len(), "Serving feed");
        articles
    }

    /// One page of [`get_feed`](Self::get_feed).
    pub async fn get_page(&self, page: usize, per_page: usize) -> FeedPage {
        FeedPage::slice(&self.get_feed().await, page, per_page)
    }

    /// The feed article with this slug, if any.
    pub async fn find_by_slug(&self, slug: &str) -> Option<Article> {
        self.get_feed()
            .await
            .iter()
            .find(|article| article.slug == slug)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Clock, ManualClock};
    use crate::providers::mock::{MockProvider, article};
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use reqwest::StatusCode;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(15 * 60);

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn service_with(providers: Vec<Arc<dyn ProviderClient>>) -> (FeedService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = FreshnessCache::with_clock(TTL, clock.clone() as Arc<dyn Clock>);
        (FeedService::new(providers, Aggregator::default(), cache), clock)
    }

    fn stories(source: &str, count: usize) -> Vec<Article> {
        (0..count)
            .map(|i| {
                article(
                    source,
                    &format!("{source}_{i}"),
                    &format!("{source} story {i}"),
                    start() - ChronoDuration::minutes(i as i64),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_repeat_calls_within_ttl_hit_no_provider() {
        let a = MockProvider::returning("A", stories("A", 3));
        let b = MockProvider::returning("B", stories("B", 2));
        let (a_calls, b_calls) = (a.calls(), b.calls());
        let (service, clock) = service_with(vec![a.shared(), b.shared()]);

        let first = service.get_feed().await;
        clock.advance(Duration::from_secs(10 * 60));
        let second = service.get_feed().await;

        assert_eq!(first.len(), 5);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_cache_triggers_exactly_one_new_pass() {
        let a = MockProvider::returning("A", stories("A", 2));
        let a_calls = a.calls();
        let (service, clock) = service_with(vec![a.shared()]);

        service.get_feed().await;
        clock.advance(TTL + Duration::from_secs(1));
        service.get_feed().await;
        service.get_feed().await;

        assert_eq!(a_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_all_providers_failing_serves_fallback() {
        let (service, _clock) = service_with(vec![
            MockProvider::failing("A", StatusCode::SERVICE_UNAVAILABLE).shared(),
            MockProvider::failing("B", StatusCode::UNAUTHORIZED).shared(),
        ]);

        let feed = service.get_feed().await;
        assert!(!feed.is_empty());
        assert!(Arc::ptr_eq(&feed, &fallback_articles()));
    }

    #[tokio::test]
    async fn test_empty_result_is_cached_and_fallback_served() {
        let empty = MockProvider::returning("Quiet", Vec::new());
        let calls = empty.calls();
        let (service, _clock) = service_with(vec![empty.shared()]);

        assert_eq!(service.get_feed().await.len(), fallback_articles().len());
        assert_eq!(service.get_feed().await.len(), fallback_articles().len());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_providers_serves_fallback() {
        let (service, _clock) = service_with(Vec::new());
        assert_eq!(service.get_feed().await.len(), 6);
    }

    #[tokio::test]
    async fn test_pages_come_from_cached_feed() {
        let a = MockProvider::returning("A", stories("A", 14));
        let calls = a.calls();
        let (service, _clock) = service_with(vec![a.shared()]);

        let first = service.get_page(1, 6).await;
        let last = service.get_page(3, 6).await;
        let beyond = service.get_page(4, 6).await;

        assert_eq!(first.items.len(), 6);
        assert_eq!(first.items[0].id, "A_0");
        assert_eq!(first.total_pages, 3);
        assert_eq!(last.items.len(), 2);
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_items, 14);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_find_by_slug() {
        let (service, _clock) = service_with(vec![MockProvider::returning("A", stories("A", 3)).shared()]);

        let found = service.find_by_slug("a-story-1").await.unwrap();
        assert_eq!(found.id, "A_1");
        assert!(service.find_by_slug("no-such-story").await.is_none());
    }

    #[test]
    fn test_from_config_builds_configured_providers() {
        let service = FeedService::from_config(&FeedConfig::default()).unwrap();
        let names: Vec<&str> = service.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["NewsAPI", "CryptoCompare", "CoinGecko"]);
    }
}
