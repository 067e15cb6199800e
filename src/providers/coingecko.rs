//! [CoinGecko](https://www.coingecko.com) news client.
//!
//! The endpoint has answered both with a bare array and with a `{"data": [...]}`
//! envelope over time, and timestamps show up as RFC 3339 strings, unix
//! seconds or fractional unix seconds; all of these are accepted.

use super::{
    ProviderClient, decode_envelope, fetch_body, image_or_default, lenient, map_records,
    non_blank, preview, required_title,
};
use crate::config::ProviderSettings;
use crate::error::Result;
use crate::models::Article;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

const NAME: &str = "CoinGecko";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    Bare(Vec<serde_json::Value>),
    Wrapped {
        #[serde(default)]
        data: Vec<serde_json::Value>,
    },
}

impl Envelope {
    fn into_records(self) -> Vec<serde_json::Value> {
        match self {
            Envelope::Bare(records) => records,
            Envelope::Wrapped { data } => data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default, deserialize_with = "lenient::string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    author: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    thumb_2x: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    published_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: Client,
    settings: ProviderSettings,
    preview_chars: usize,
}

impl CoinGeckoClient {
    pub fn new(client: Client, settings: ProviderSettings, preview_chars: usize) -> Self {
        Self {
            client,
            settings,
            preview_chars,
        }
    }

    fn normalize(&self, index: usize, record: Record) -> Result<Article> {
        let title = required_title(NAME, record.title)?;

        Ok(Article::new(
            format!("gecko_{index}"),
            title,
            record
                .published_at
                .or(record.updated_at)
                .unwrap_or_else(Utc::now),
            NAME,
            "Market Analysis",
        )
        .with_description(preview(record.description.as_deref(), self.preview_chars))
        .with_author(
            non_blank(record.author).unwrap_or_else(|| NAME.to_string()),
            "Crypto Researcher",
        )
        .with_url(non_blank(record.url))
        .with_image_url(image_or_default(record.thumb_2x)))
    }
}

#[async_trait]
impl ProviderClient for CoinGeckoClient {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(level = "info", skip_all, fields(provider = NAME))]
    async fn fetch(&self) -> Result<Vec<Article>> {
        let request = self.client.get(format!("{}/news", self.settings.base_url));

        let body = fetch_body(NAME, request).await?;
        let envelope: Envelope = decode_envelope(NAME, &body)?;
        let articles = map_records(NAME, envelope.into_records(), |i, record: Record| {
            self.normalize(i, record)
        });

        info!(count = articles.len(), "Fetched CoinGecko articles");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::providers::{DEFAULT_DESCRIPTION, http_client};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CoinGeckoClient {
        CoinGeckoClient::new(
            http_client(Duration::from_secs(5)).unwrap(),
            ProviderSettings::new(format!("{}/api/v3", server.uri()), None),
            150,
        )
    }

    #[tokio::test]
    async fn test_fetch_bare_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "title": "Market wrap: alts rebound",
                    "description": "Altcoins recovered losses.",
                    "author": "Analyst One",
                    "url": "https://example.com/wrap",
                    "thumb_2x": "https://example.com/wrap.png",
                    "published_at": "2026-10-18T06:30:00Z"
                },
                {
                    "title": "Unix dated",
                    "published_at": 1_760_000_000
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let articles = client_for(&server).fetch().await.unwrap();
        assert_eq!(articles.len(), 2);

        assert_eq!(articles[0].id, "gecko_1");
        assert_eq!(articles[0].author, "Analyst One");
        assert_eq!(articles[0].author_title, "Crypto Researcher");
        assert_eq!(articles[0].category, "Market Analysis");
        assert_eq!(articles[0].source, "CoinGecko");
        assert_eq!(articles[0].published_at.to_rfc3339(), "2026-10-18T06:30:00+00:00");

        assert_eq!(articles[1].author, "CoinGecko");
        assert_eq!(articles[1].description, DEFAULT_DESCRIPTION);
        assert_eq!(articles[1].published_at.timestamp(), 1_760_000_000);
    }

    #[tokio::test]
    async fn test_fetch_wrapped_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"title": "Wrapped story", "updated_at": 1_700_000_000},
                    {"description": "title missing"}
                ],
                "count": 2
            })))
            .mount(&server)
            .await;

        let articles = client_for(&server).fetch().await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Wrapped story");
        assert_eq!(articles[0].published_at.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_fractional_and_mistyped_fields_keep_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"title": "Fractional time", "published_at": 1_760_000_000.5, "thumb_2x": 3},
                {"title": "Bad time falls back", "published_at": [], "updated_at": "1700000000"}
            ])))
            .mount(&server)
            .await;

        let articles = client_for(&server).fetch().await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].published_at.timestamp(), 1_760_000_000);
        assert_eq!(articles[0].image_url.as_deref(), Some(crate::providers::DEFAULT_IMAGE));
        assert_eq!(articles[1].published_at.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_not_found_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch().await.unwrap_err();
        assert!(matches!(
            err,
            FeedError::ProviderUnavailable { ref provider, .. } if provider == "CoinGecko"
        ));
    }
}
