//! Normalization helpers shared by every provider.
//!
//! - Slug derivation for dedup/routing keys
//! - Preview truncation and HTML stripping for descriptions
//! - Display-date formatting
//! - Cosmetic comment-count filler
//! - Log-safe truncation and output directory checks

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rand::{Rng, rng};
use regex::Regex;
use scraper::Html;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static slug pattern"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

/// Slug used when a non-empty title contains no ASCII letters or digits.
pub const UNTITLED_SLUG: &str = "untitled";

/// Marker appended to descriptions cut down to the preview length.
pub const ELLIPSIS: &str = "...";

/// Convert a title to a URL-friendly slug.
///
/// Lowercases the title, collapses every run of characters outside `a-z0-9`
/// into a single `-`, and strips separators from both ends. Accented and
/// non-Latin letters are separators too, so slugs stay plain ASCII.
///
/// # Examples
///
/// ```
/// use news_feed::utils::slugify_title;
/// assert_eq!(slugify_title("Bitcoin Hits $50K!"), "bitcoin-hits-50k");
/// ```
pub fn slugify_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = NON_ALPHANUMERIC
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string();

    if slug.is_empty() && !title.trim().is_empty() {
        UNTITLED_SLUG.to_string()
    } else {
        slug
    }
}

/// Bound `text` to `max_chars` characters, appending [`ELLIPSIS`] only when
/// something was actually cut.
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => format!("{}{}", text[..byte_idx].trim_end(), ELLIPSIS),
    }
}

/// Drop markup from a provider-supplied body and collapse whitespace.
pub fn strip_html(text: &str) -> String {
    if !text.contains('<') {
        return collapse_whitespace(text);
    }
    let fragment = Html::parse_fragment(text);
    let plain = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&plain)
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Calendar date shown next to an article, e.g. `October 19, 2026`.
pub fn display_date(at: &DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

/// Cosmetic comment count for providers that do not report one.
pub fn comment_count() -> u32 {
    rng().random_range(20..120)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with the number of dropped bytes
/// appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((byte_idx, _)) => format!("{}…(+{} bytes)", &s[..byte_idx], s.len() - byte_idx),
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    fs::write(&probe_path, b"").await?;
    let _ = fs::remove_file(&probe_path).await;
    info!("Output directory is writable");
    Ok(())
}
