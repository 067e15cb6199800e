//! Error taxonomy for the feed pipeline.
//!
//! Only a handful of these ever leave the module that raises them:
//!
//! | Variant | Raised by | Recovered by |
//! |---------|-----------|--------------|
//! | [`FeedError::ProviderUnavailable`] / [`FeedError::Transport`] | provider clients | the aggregator (provider contributes nothing) |
//! | [`FeedError::Decode`] | provider clients | the aggregator |
//! | [`FeedError::MalformedRecord`] | record normalization | the provider client (record dropped) |
//! | [`FeedError::HttpClient`], [`FeedError::UnknownProvider`], [`FeedError::Settings`] | startup | surfaced to `main` |
//!
//! Nothing below [`crate::service::FeedService`] reaches the serving boundary
//! as an error.

use reqwest::StatusCode;

/// Errors produced while configuring or running the feed pipeline.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The provider answered with a non-success status.
    #[error("{provider} unavailable: HTTP {status}")]
    ProviderUnavailable { provider: String, status: StatusCode },

    /// The request never produced a usable response (connect, timeout, body read).
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not match the provider's envelope.
    #[error("{provider} returned an unreadable payload: {source}")]
    Decode {
        provider: String,
        #[source]
        source: serde_json::Error,
    },

    /// A single record could not be mapped to an article.
    #[error("{provider} record dropped: {reason}")]
    MalformedRecord { provider: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("settings file {path}: {reason}")]
    Settings { path: String, reason: String },
}

impl FeedError {
    /// `true` for failures that mean "this provider could not be reached",
    /// whether it answered with an error status or not at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            FeedError::ProviderUnavailable { .. } | FeedError::Transport { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
