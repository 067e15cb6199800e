//! # News Feed
//!
//! Aggregates crypto and financial news from several external providers into
//! one deduplicated, newest-first feed, and memoizes the result for a freshness
//! window so many readers share one aggregation pass.
//!
//! ## Architecture
//!
//! 1. **Providers** ([`providers`]): one client per external API, each mapping
//!    its records into [`Article`]s. Failures stay inside the provider's slot.
//! 2. **Aggregation** ([`aggregator`]): all providers run concurrently; results
//!    are merged in priority order, deduplicated by title, sorted and capped.
//! 3. **Caching** ([`cache`]): the last result is served until it ages past the
//!    TTL; concurrent misses share a single refresh.
//! 4. **Serving** ([`service`]): the facade readers call. It never fails and
//!    substitutes the built-in [`fallback`] set for an empty result.
//!
//! ```no_run
//! use news_feed::{FeedConfig, FeedService, settings::EnvSettings};
//!
//! # async fn run() -> news_feed::Result<()> {
//! let service = FeedService::from_config(&FeedConfig::from_settings(&EnvSettings))?;
//! let page = service.get_page(1, 6).await;
//! println!("{} of {} articles", page.items.len(), page.total_items);
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fallback;
pub mod models;
pub mod outputs;
pub mod providers;
pub mod service;
pub mod settings;
pub mod utils;

pub use aggregator::Aggregator;
pub use cache::{CacheEntry, Clock, FreshnessCache, ManualClock, SystemClock};
pub use config::{FeedConfig, ProviderKind};
pub use error::{FeedError, Result};
pub use models::{Article, FeedPage};
pub use providers::ProviderClient;
pub use service::FeedService;
