//! Typed configuration for the feed pipeline.
//!
//! [`FeedConfig::from_settings`] reads every knob from a [`Settings`] source
//! and falls back to the built-in defaults for anything missing or unusable.

use crate::error::{FeedError, Result};
use crate::settings::Settings;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use url::Url;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_MAX_ARTICLES: usize = 20;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PREVIEW_CHARS: usize = 150;
pub const DEFAULT_PROVIDERS: &str = "newsapi,cryptocompare,coingecko";

pub const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";
pub const CRYPTOCOMPARE_BASE_URL: &str = "https://min-api.cryptocompare.com";
pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Values shipped in sample `.env` files; treated as "no key configured".
const PLACEHOLDER_CREDENTIALS: &[&str] = &[
    "your_news_api_key_here",
    "your_cryptocompare_api_key_here",
];

/// The news providers this crate knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    NewsApi,
    CryptoCompare,
    CoinGecko,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::NewsApi => "newsapi",
            ProviderKind::CryptoCompare => "cryptocompare",
            ProviderKind::CoinGecko => "coingecko",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newsapi" => Ok(ProviderKind::NewsApi),
            "cryptocompare" => Ok(ProviderKind::CryptoCompare),
            "coingecko" => Ok(ProviderKind::CoinGecko),
            other => Err(FeedError::UnknownProvider(other.to_string())),
        }
    }
}

/// Endpoint and credential for one provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.and_then(valid_credential),
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Keep a credential only if it is something other than blank or a sample
/// placeholder.
pub fn valid_credential(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || PLACEHOLDER_CREDENTIALS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Everything the pipeline needs to be built.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// Provider priority order: first wins on duplicate titles and timestamp ties.
    pub providers: Vec<ProviderKind>,
    pub cache_ttl: Duration,
    pub max_articles: usize,
    pub request_timeout: Duration,
    pub preview_chars: usize,
    pub newsapi: ProviderSettings,
    pub cryptocompare: ProviderSettings,
    pub coingecko: ProviderSettings,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            providers: parse_providers(DEFAULT_PROVIDERS),
            cache_ttl: DEFAULT_CACHE_TTL,
            max_articles: DEFAULT_MAX_ARTICLES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            newsapi: ProviderSettings::new(NEWSAPI_BASE_URL, None),
            cryptocompare: ProviderSettings::new(CRYPTOCOMPARE_BASE_URL, None),
            coingecko: ProviderSettings::new(COINGECKO_BASE_URL, None),
        }
    }
}

impl FeedConfig {
    pub fn from_settings(settings: &dyn Settings) -> Self {
        let optional = |key: &str| settings.lookup(key);

        Self {
            providers: parse_providers(&settings.get("NEWS_PROVIDERS", DEFAULT_PROVIDERS)),
            cache_ttl: Duration::from_secs(number_setting(
                settings,
                "NEWS_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL.as_secs(),
            )),
            max_articles: nonzero_setting(settings, "NEWS_MAX_ARTICLES", DEFAULT_MAX_ARTICLES),
            request_timeout: Duration::from_secs(nonzero_setting(
                settings,
                "NEWS_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT.as_secs(),
            )),
            preview_chars: number_setting(settings, "NEWS_PREVIEW_CHARS", DEFAULT_PREVIEW_CHARS),
            newsapi: ProviderSettings::new(
                base_url_setting(settings, "NEWSAPI_BASE_URL", NEWSAPI_BASE_URL),
                optional("NEWS_API_KEY"),
            ),
            cryptocompare: ProviderSettings::new(
                base_url_setting(settings, "CRYPTOCOMPARE_BASE_URL", CRYPTOCOMPARE_BASE_URL),
                optional("CRYPTO_COMPARE_API_KEY"),
            ),
            coingecko: ProviderSettings::new(
                base_url_setting(settings, "COINGECKO_BASE_URL", COINGECKO_BASE_URL),
                None,
            ),
        }
    }
}

/// Parse a comma-separated provider list, skipping unknown names and repeats.
pub fn parse_providers(raw: &str) -> Vec<ProviderKind> {
    let mut providers = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name.parse::<ProviderKind>() {
            Ok(kind) if !providers.contains(&kind) => providers.push(kind),
            Ok(kind) => warn!(provider = %kind, "Provider listed twice; keeping first position"),
            Err(e) => warn!(error = %e, "Ignoring provider entry"),
        }
    }
    providers
}

/// An absolute http(s) URL, or `default` when the setting is absent or not one.
fn base_url_setting(settings: &dyn Settings, key: &str, default: &str) -> String {
    let Some(raw) = settings.lookup(key) else {
        return default.to_string();
    };
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => raw.trim().to_string(),
        Ok(url) => {
            warn!(%key, scheme = url.scheme(), "Unsupported base URL scheme; using default");
            default.to_string()
        }
        Err(e) => {
            warn!(%key, value = %raw, error = %e, "Invalid base URL; using default");
            default.to_string()
        }
    }
}

fn number_setting<T>(settings: &dyn Settings, key: &str, default: T) -> T
where
    T: FromStr + fmt::Display + Copy,
{
    let Some(raw) = settings.lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(%key, value = %raw, %default, "Unparseable numeric setting; using default");
            default
        }
    }
}

/// Like [`number_setting`], but zero counts as unusable: a zero article cap
/// or request timeout would leave every read on the fallback set.
fn nonzero_setting<T>(settings: &dyn Settings, key: &str, default: T) -> T
where
    T: FromStr + fmt::Display + Copy + Default + PartialEq,
{
    let value = number_setting(settings, key, default);
    if value == T::default() {
        warn!(%key, %default, "Zero is not allowed for this setting; using default");
        default
    } else {
        value
    }
}
