//! Command-line interface definitions for the news feed binary.
//!
//! Credentials and the provider list can also come from the environment. A
//! value typed on the command line overrides the settings file; a value clap
//! only picked up from the environment does not.

use crate::settings::MapSettings;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

/// Command-line arguments for the news feed binary.
///
/// # Examples
///
/// ```sh
/// # Print the whole feed
/// news_feed
///
/// # Second page of six, also written to ./json/feed.json
/// news_feed --page 2 -j ./json
///
/// # Keep ./json/feed.json current, checking every minute
/// news_feed -j ./json --watch-secs 60
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a flat YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// CryptoCompare key
    #[arg(long, env = "CRYPTO_COMPARE_API_KEY", hide_env_values = true)]
    pub crypto_compare_api_key: Option<String>,

    /// Comma-separated provider priority order
    #[arg(long, env = "NEWS_PROVIDERS")]
    pub providers: Option<String>,

    /// Directory to write feed.json into
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Print only this 1-based page instead of the whole feed
    #[arg(short, long)]
    pub page: Option<usize>,

    /// Page size used with --page
    #[arg(long, default_value_t = 6)]
    pub per_page: usize,

    /// Re-read the feed every N seconds until interrupted
    #[arg(long)]
    pub watch_secs: Option<u64>,
}

impl Cli {
    /// Parse the process arguments, returning the command-line overrides
    /// alongside the parsed flags.
    pub fn parse_with_overrides() -> (Self, MapSettings) {
        let matches = Self::command().get_matches();
        match Self::from_arg_matches(&matches) {
            Ok(cli) => {
                let overrides = cli.overrides(&matches);
                (cli, overrides)
            }
            Err(e) => e.exit(),
        }
    }

    /// Settings for the keys given explicitly on the command line.
    pub fn overrides(&self, matches: &ArgMatches) -> MapSettings {
        let mut settings = MapSettings::new();
        let flags = [
            ("news_api_key", "NEWS_API_KEY", &self.news_api_key),
            ("crypto_compare_api_key", "CRYPTO_COMPARE_API_KEY", &self.crypto_compare_api_key),
            ("providers", "NEWS_PROVIDERS", &self.providers),
        ];
        for (id, key, value) in flags {
            if matches.value_source(id) != Some(ValueSource::CommandLine) {
                continue;
            }
            if let Some(value) = value {
                settings.set(key, value.clone());
            }
        }
        settings
    }
}
