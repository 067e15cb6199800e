//! # News Feed
//!
//! Prints the aggregated crypto news feed as JSON, optionally keeping a
//! `feed.json` file current.
//!
//! ## Usage
//!
//! ```sh
//! news_feed --page 1 -j ./json
//! news_feed -j ./json --watch-secs 60
//! ```
//!
//! Settings are resolved as command-line flags, then the `--config` YAML file,
//! then the process environment.

use news_feed::cli::Cli;
use news_feed::outputs::json;
use news_feed::settings::{EnvSettings, Layered, MapSettings};
use news_feed::utils::ensure_writable_dir;
use news_feed::{FeedConfig, FeedService};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_feed starting up");

    let (args, overrides) = Cli::parse_with_overrides();
    debug!(?args.json_output_dir, ?args.page, ?args.watch_secs, "Parsed CLI arguments");

    // --- Settings: CLI > YAML file > environment ---
    let file_settings = match &args.config {
        Some(path) => MapSettings::from_yaml_file(path)?,
        None => MapSettings::new(),
    };
    info!(cli = overrides.len(), file = file_settings.len(), "Settings loaded");
    let settings = Layered::new(overrides, Layered::new(file_settings, EnvSettings));

    let config = FeedConfig::from_settings(&settings);
    let service = FeedService::from_config(&config)?;

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    match args.watch_secs {
        None => {
            let rendered = emit(&service, &args).await?;
            println!("{rendered}");
        }
        Some(secs) => watch(&service, &args, Duration::from_secs(secs.max(1))).await?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Read the feed once, write it to the output directory if one was given,
/// and return the rendered JSON.
async fn emit(service: &FeedService, args: &Cli) -> Result<String, Box<dyn Error>> {
    let rendered = match args.page {
        Some(page) => {
            let page = service.get_page(page, args.per_page).await;
            info!(page = page.page, items = page.items.len(), total = page.total_items, "Feed page ready");
            if let Some(dir) = &args.json_output_dir {
                json::write_feed(&page, dir).await?;
            }
            json::render(&page)?
        }
        None => {
            let feed = service.get_feed().await;
            info!(count = feed.len(), "Feed ready");
            if let Some(dir) = &args.json_output_dir {
                json::write_feed(&*feed, dir).await?;
            }
            json::render(&*feed)?
        }
    };
    Ok(rendered)
}

/// Re-read the feed every `every` until Ctrl-C. Without an output directory
/// each tick prints to stdout. A failed write is logged and retried on the
/// next tick.
async fn watch(service: &FeedService, args: &Cli, every: Duration) -> Result<(), Box<dyn Error>> {
    info!(every_secs = every.as_secs(), "Watching feed; press Ctrl-C to stop");
    let mut ticker = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match emit(service, args).await {
                    Ok(rendered) if args.json_output_dir.is_none() => println!("{rendered}"),
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "Failed to refresh feed output"),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Interrupted; stopping watch");
                return Ok(());
            }
        }
    }
}
