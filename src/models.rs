//! Data models for the aggregated feed.
//!
//! - [`Article`]: the common shape every provider record is normalized into
//! - [`FeedPage`]: one page of the feed as handed to a paginating caller
//!
//! Field names serialize as camelCase to match what the UI layer consumes.

use crate::utils::{comment_count, display_date, slugify_title};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized news article.
///
/// Built through [`Article::new`] so that `slug` and `display_date` are always
/// derived from `title` and `published_at`. Once an article is part of a feed
/// it is shared behind an `Arc` and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Provider-prefixed identifier, e.g. `crypto_3`.
    pub id: String,
    pub title: String,
    /// Dedup and routing key derived from `title`.
    pub slug: String,
    /// Preview text, already bounded by the provider mapping.
    pub description: String,
    pub author: String,
    pub author_title: String,
    /// Instant used for ordering.
    pub published_at: DateTime<Utc>,
    /// Calendar date shown to readers, e.g. `October 19, 2026`.
    pub display_date: String,
    /// Display only.
    pub comment_count: u32,
    pub source: String,
    pub category: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

impl Article {
    /// Create an article with derived fields filled in.
    ///
    /// `description`, `author` and `author_title` start empty and the comment
    /// count is cosmetic filler; use the `with_*` methods to set them.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        published_at: DateTime<Utc>,
        source: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let title = title.into();
        Self {
            id: id.into(),
            slug: slugify_title(&title),
            title,
            description: String::new(),
            author: String::new(),
            author_title: String::new(),
            display_date: display_date(&published_at),
            published_at,
            comment_count: comment_count(),
            source: source.into(),
            category: category.into(),
            url: None,
            image_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>, author_title: impl Into<String>) -> Self {
        self.author = author.into();
        self.author_title = author_title.into();
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn with_comment_count(mut self, comment_count: u32) -> Self {
        self.comment_count = comment_count;
        self
    }
}

/// One page of the feed.
///
/// Pages are 1-based. A page past the end has no items but still reports the
/// totals so the caller can render its pager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub items: Vec<Article>,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl FeedPage {
    /// Slice `articles` the way the feed UI pages through it.
    ///
    /// `page` and `per_page` of zero are treated as one.
    pub fn slice(articles: &[Article], page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total_items = articles.len();
        let items = articles
            .iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .cloned()
            .collect();

        Self {
            items,
            page,
            per_page,
            total_pages: total_items.div_ceil(per_page),
            total_items,
        }
    }
}
