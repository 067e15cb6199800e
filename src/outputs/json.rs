//! JSON output for the feed.
//!
//! Whatever the binary prints (the whole feed or one [`FeedPage`]) is
//! rendered here, and the same document is what lands in `feed.json`.
//!
//! [`FeedPage`]: crate::models::FeedPage

use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// File name written inside the JSON output directory.
pub const FEED_FILE: &str = "feed.json";

/// Pretty-printed JSON for a feed or a page.
pub fn render<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Write `value` to `{json_output_dir}/feed.json`.
///
/// The document is written to a sibling temp file first and then renamed
/// over the previous one, so readers never see a half-written feed.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_feed<T: Serialize + ?Sized>(
    value: &T,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = render(value)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = Path::new(json_output_dir).join(FEED_FILE);
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, json).await?;
    fs::rename(&staging, &path).await?;

    info!(path = %path.display(), "Wrote feed JSON");
    Ok(path)
}
