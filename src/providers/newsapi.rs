//! [NewsAPI](https://newsapi.org) client.
//!
//! Queries the `everything` endpoint for crypto coverage, newest first. The
//! provider requires an API key; without one the client is disabled and
//! returns no articles.

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
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{info, instrument};

const NAME: &str = "NewsAPI";
const QUERY: &str = "cryptocurrency OR bitcoin OR ethereum";
const PAGE_SIZE: &str = "20";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    articles: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Record {
    #[serde(default, deserialize_with = "source_name")]
    source: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    author: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    content: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    url_to_image: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    published_at: Option<DateTime<Utc>>,
}

/// `source` is normally `{"id": .., "name": ..}`; a bare string is taken as
/// the name.
fn source_name<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) => Some(name),
        Value::Object(mut fields) => match fields.remove("name") {
            Some(Value::String(name)) => Some(name),
            _ => None,
        },
        _ => None,
    })
}

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    settings: ProviderSettings,
    preview_chars: usize,
}

impl NewsApiClient {
    pub fn new(client: Client, settings: ProviderSettings, preview_chars: usize) -> Self {
        Self {
            client,
            settings,
            preview_chars,
        }
    }

    fn normalize(&self, index: usize, record: Record) -> Result<Article> {
        let title = required_title(NAME, record.title)?;
        let source = non_blank(record.source).unwrap_or_else(|| NAME.to_string());
        let body = non_blank(record.description).or_else(|| non_blank(record.content));

        Ok(Article::new(
            format!("news_{index}"),
            title,
            record.published_at.unwrap_or_else(Utc::now),
            source,
            "Crypto",
        )
        .with_description(preview(body.as_deref(), self.preview_chars))
        .with_author(
            non_blank(record.author).unwrap_or_else(|| NAME.to_string()),
            "Journalist",
        )
        .with_url(non_blank(record.url))
        .with_image_url(image_or_default(record.url_to_image)))
    }
}

#[async_trait]
impl ProviderClient for NewsApiClient {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(level = "info", skip_all, fields(provider = NAME))]
    async fn fetch(&self) -> Result<Vec<Article>> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            info!("No valid API key configured; skipping");
            return Ok(Vec::new());
        };

        let request = self
            .client
            .get(format!("{}/everything", self.settings.base_url))
            .query(&[
                ("q", QUERY),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", PAGE_SIZE),
                ("apiKey", api_key),
            ]);

        let body = fetch_body(NAME, request).await?;
        let envelope: Envelope = decode_envelope(NAME, &body)?;
        let articles = map_records(NAME, envelope.articles, |i, record: Record| self.normalize(i, record));

        info!(count = articles.len(), "Fetched NewsAPI articles");
        Ok(articles)
    }
}
