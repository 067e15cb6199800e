//! [CryptoCompare](https://min-api.cryptocompare.com) news client.
//!
//! The news endpoint is public. When a key is configured it is sent as
//! `authorization: Apikey <key>` for the higher rate limit.

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
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::{info, instrument, warn};

const NAME: &str = "CryptoCompare";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Data", default)]
    data: Vec<serde_json::Value>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default, deserialize_with = "lenient::string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    body: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    source: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    categories: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    imageurl: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    published_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CryptoCompareClient {
    client: Client,
    settings: ProviderSettings,
    preview_chars: usize,
}

impl CryptoCompareClient {
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
            format!("crypto_{index}"),
            title,
            record.published_on.unwrap_or_else(Utc::now),
            NAME,
            non_blank(record.categories).unwrap_or_else(|| "Crypto".to_string()),
        )
        .with_description(preview(record.body.as_deref(), self.preview_chars))
        .with_author(
            non_blank(record.source).unwrap_or_else(|| NAME.to_string()),
            "Crypto Analyst",
        )
        .with_url(non_blank(record.url))
        .with_image_url(image_or_default(record.imageurl)))
    }
}

#[async_trait]
impl ProviderClient for CryptoCompareClient {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(level = "info", skip_all, fields(provider = NAME))]
    async fn fetch(&self) -> Result<Vec<Article>> {
        let mut request = self
            .client
            .get(format!("{}/data/v2/news/", self.settings.base_url))
            .query(&[("lang", "EN")]);
        if let Some(api_key) = self.settings.api_key.as_deref() {
            request = request.header(AUTHORIZATION, format!("Apikey {api_key}"));
        }

        let body = fetch_body(NAME, request).await?;
        let envelope: Envelope = decode_envelope(NAME, &body)?;
        if envelope.data.is_empty() {
            if let Some(message) = envelope.message.as_deref().filter(|m| !m.is_empty()) {
                warn!(%message, "CryptoCompare returned no data");
            }
        }

        let articles = map_records(NAME, envelope.data, |i, record: Record| self.normalize(i, record));
        info!(count = articles.len(), "Fetched CryptoCompare articles");
        Ok(articles)
    }
}
