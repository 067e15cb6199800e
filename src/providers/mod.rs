//! News provider clients.
//!
//! Each submodule talks to one external news API and maps its records into
//! [`Article`]s. Every client follows the same pattern:
//!
//! 1. **Soft disable**: a provider that needs a credential and has none returns
//!    an empty list without touching the network.
//! 2. **One request**: a single GET, bounded by the shared client timeout.
//! 3. **Per-record mapping**: records are decoded one at a time; a record that
//!    cannot be mapped (no title, not an object) is dropped, never fatal.
//!    Optional fields decode through the `lenient` helpers, so a mistyped
//!    optional value falls back to its default instead of dropping the record.
//!
//! # Supported Providers
//!
//! | Provider | Module | Credential | Id prefix |
//! |----------|--------|------------|-----------|
//! | NewsAPI | [`newsapi`] | required (`apiKey` query param) | `news_` |
//! | CryptoCompare | [`cryptocompare`] | optional (`authorization` header) | `crypto_` |
//! | CoinGecko | [`coingecko`] | none | `gecko_` |

use crate::config::{FeedConfig, ProviderKind};
use crate::error::{FeedError, Result};
use crate::models::Article;
use crate::utils::{strip_html, truncate_for_log, truncate_preview};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub mod coingecko;
pub mod cryptocompare;
mod lenient;
pub mod newsapi;

#[cfg(test)]
pub(crate) mod mock;

pub use coingecko::CoinGeckoClient;
pub use cryptocompare::CryptoCompareClient;
pub use newsapi::NewsApiClient;

/// Image shown for articles whose provider supplied none.
pub const DEFAULT_IMAGE: &str = "/images/blogs/blog_post_image_1.webp";

/// Description used when a provider supplied no usable body.
pub const DEFAULT_DESCRIPTION: &str = "No description available.";

/// A client for one external news source.
///
/// Implementations are stateless between calls.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Human-readable provider name, used in logs and errors.
    fn name(&self) -> &str;

    /// Fetch and normalize the provider's current articles.
    async fn fetch(&self) -> Result<Vec<Article>>;
}

/// Build the shared HTTP client every provider issues requests with.
pub fn http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Instantiate the configured providers, in priority order.
pub fn build_providers(config: &FeedConfig, client: &Client) -> Vec<Arc<dyn ProviderClient>> {
    config
        .providers
        .iter()
        .map(|kind| -> Arc<dyn ProviderClient> {
            match kind {
                ProviderKind::NewsApi => Arc::new(NewsApiClient::new(
                    client.clone(),
                    config.newsapi.clone(),
                    config.preview_chars,
                )),
                ProviderKind::CryptoCompare => Arc::new(CryptoCompareClient::new(
                    client.clone(),
                    config.cryptocompare.clone(),
                    config.preview_chars,
                )),
                ProviderKind::CoinGecko => Arc::new(CoinGeckoClient::new(
                    client.clone(),
                    config.coingecko.clone(),
                    config.preview_chars,
                )),
            }
        })
        .collect()
}

/// Send `request` and return the body of a successful response.
///
/// Non-2xx statuses become [`FeedError::ProviderUnavailable`]; anything that
/// stops a response from arriving becomes [`FeedError::Transport`].
pub(crate) async fn fetch_body(provider: &str, request: RequestBuilder) -> Result<String> {
    let transport = |source| FeedError::Transport {
        provider: provider.to_string(),
        source,
    };

    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(provider, %status, body = %truncate_for_log(&body, 300), "Provider error body");
        return Err(FeedError::ProviderUnavailable {
            provider: provider.to_string(),
            status,
        });
    }

    response.text().await.map_err(transport)
}

/// Decode the response envelope.
pub(crate) fn decode_envelope<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| FeedError::Decode {
        provider: provider.to_string(),
        source,
    })
}

/// Map raw records one by one, dropping any that fail.
///
/// `map` receives the 1-based position of the record in the response.
pub(crate) fn map_records<T, F>(provider: &str, records: Vec<serde_json::Value>, mut map: F) -> Vec<Article>
where
    T: DeserializeOwned,
    F: FnMut(usize, T) -> Result<Article>,
{
    let total = records.len();
    let articles: Vec<Article> = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| {
            let mapped = serde_json::from_value::<T>(value)
                .map_err(|e| FeedError::MalformedRecord {
                    provider: provider.to_string(),
                    reason: e.to_string(),
                })
                .and_then(|record| map(i + 1, record));

            match mapped {
                Ok(article) => Some(article),
                Err(e) => {
                    debug!(provider, index = i + 1, error = %e, "Dropping record");
                    None
                }
            }
        })
        .collect();

    if articles.len() < total {
        warn!(
            provider,
            total,
            kept = articles.len(),
            "Some records could not be mapped"
        );
    }
    articles
}

/// The record's title, or a [`FeedError::MalformedRecord`] when it has none.
pub(crate) fn required_title(provider: &str, title: Option<String>) -> Result<String> {
    match title.map(|t| collapse(&t)) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(FeedError::MalformedRecord {
            provider: provider.to_string(),
            reason: "missing title".to_string(),
        }),
    }
}

/// Plain-text preview bounded to `max_chars`, or the default description.
pub(crate) fn preview(body: Option<&str>, max_chars: usize) -> String {
    let plain = body.map(strip_html).unwrap_or_default();
    if plain.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        truncate_preview(&plain, max_chars)
    }
}

/// `Some` only for non-blank strings.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn image_or_default(image: Option<String>) -> Option<String> {
    Some(non_blank(image).unwrap_or_else(|| DEFAULT_IMAGE.to_string()))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
