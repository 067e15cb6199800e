//! Scriptable providers for exercising the aggregator, cache and service.

use super::ProviderClient;
use crate::error::{FeedError, Result};
use crate::models::Article;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Article with fixed derived fields, attributed to `source`.
pub fn article(source: &str, id: &str, title: &str, published_at: DateTime<Utc>) -> Article {
    Article::new(id, title, published_at, source, "Crypto")
        .with_author(source, "Tester")
        .with_comment_count(0)
}

pub struct MockProvider {
    name: String,
    outcome: std::result::Result<Vec<Article>, StatusCode>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn returning(name: &str, articles: Vec<Article>) -> Self {
        Self {
            name: name.to_string(),
            outcome: Ok(articles),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(name: &str, status: StatusCode) -> Self {
        Self {
            name: name.to_string(),
            outcome: Err(status),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared counter of `fetch` calls, readable after the provider is moved.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn shared(self) -> Arc<dyn ProviderClient> {
        Arc::new(self)
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<Article>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.outcome {
            Ok(articles) => Ok(articles.clone()),
            Err(status) => Err(FeedError::ProviderUnavailable {
                provider: self.name.clone(),
                status: *status,
            }),
        }
    }
}
