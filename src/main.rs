//! Tumblr-Harvest main entry point
//!
//! This is the command-line interface for the incremental blog downloader.

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tumblr_harvest::config::{load_config_or_default, resolve_output_root, Credentials};
use tumblr_harvest::harvest::HarvestProgress;
use tumblr_harvest::{
    FsPostStore, HarvestDefaults, HarvestOptions, Harvester, Scraper, TumblrClient,
};
use tracing_subscriber::EnvFilter;

/// Tumblr-Harvest: incremental blog downloader
///
/// Downloads every post of a blog as one JSON file per post. Re-running
/// only fetches posts newer than the ones already on disk.
///
/// Credentials come from CONSUMER_KEY, CONSUMER_SECRET, OAUTH_TOKEN and
/// OAUTH_TOKEN_SECRET (a .env file is honoured); OUTPUT_DIRECTORY selects
/// the output root.
#[derive(Parser, Debug)]
#[command(name = "tumblr-harvest")]
#[command(version)]
#[command(about = "Incremental Tumblr blog downloader", long_about = None)]
struct Cli {
    /// Blog to download (short name, custom domain, or UUID)
    #[arg(value_name = "BLOG")]
    blog: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Rewrite posts that were already downloaded
    #[arg(long)]
    overwrite: bool,

    /// Pause between page requests, in milliseconds
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Start below this post id instead of at the newest post
    #[arg(long, value_name = "ID")]
    before_id: Option<String>,

    /// Posts requested per page (1-20)
    #[arg(long, value_name = "N")]
    page_size: Option<u32>,

    /// Do not request reblog information
    #[arg(long)]
    no_reblog_info: bool,

    /// Extra query parameter passed to the posts endpoint (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    params: Vec<(String, String)>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let bar = progress_bar(cli.quiet);
    setup_logging(cli.verbose, cli.quiet, bar.clone());

    let Some(blog) = cli.blog.clone().filter(|b| !b.is_empty()) else {
        tracing::debug!("No blog given, nothing to do");
        return Ok(());
    };

    let config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        format!(
            "Failed to load configuration{}",
            cli.config
                .as_ref()
                .map(|p| format!(" from {}", p.display()))
                .unwrap_or_default()
        )
    })?;

    let credentials = Credentials::from_env()?;
    let output_root = resolve_output_root(&config.output)?;
    let blog_dir = output_root.join(&blog);

    let client = TumblrClient::new(&config.api, credentials)?;
    let mut harvester = Harvester::new(
        client,
        FsPostStore::new(),
        HarvestDefaults::from(&config.harvest),
    );
    if !cli.quiet {
        let bar = bar.clone();
        harvester = harvester.with_progress(move |progress| report_progress(&bar, progress));
    }

    let options = build_options(&cli);
    let scraper = Scraper::new(harvester);

    let result = scraper.scrape(&blog, &blog_dir, &options).await;
    bar.finish_and_clear();

    match result {
        Ok(info) => {
            tracing::info!(
                "Scrape of {} complete: {} new posts ({} total) in {}",
                info.blog.name,
                info.posts_fetched.unwrap_or(0),
                info.total_posts.unwrap_or(0),
                blog_dir.display()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape of {} failed: {}", blog, e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Log lines are written around `bar` so they never share a line with it.
fn setup_logging(verbose: u8, quiet: bool, bar: ProgressBar) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tumblr_harvest=info,warn"),
            1 => EnvFilter::new("tumblr_harvest=debug,info"),
            2 => EnvFilter::new("tumblr_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(move || BarWriter { bar: bar.clone() })
        .init();
}

/// Stderr writer that hides the progress bar while a log line is printed
struct BarWriter {
    bar: ProgressBar,
}

impl Write for BarWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bar.suspend(|| std::io::stderr().write(buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.bar.suspend(|| std::io::stderr().flush())
    }
}

/// Progress bar for the harvest, hidden when output is suppressed
fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar
}

/// Maps command-line overrides onto per-run harvest options
fn build_options(cli: &Cli) -> HarvestOptions {
    let mut options = HarvestOptions::new();
    if cli.overwrite {
        options = options.with_overwrite(true);
    }
    if let Some(ms) = cli.interval_ms {
        options = options.with_interval(Duration::from_millis(ms));
    }
    if let Some(before_id) = cli.before_id.as_deref() {
        options = options.with_before_id(before_id);
    }
    if let Some(page_size) = cli.page_size {
        options = options.with_page_size(page_size);
    }
    if cli.no_reblog_info {
        options = options.with_reblog_info(false);
    }
    for (key, value) in &cli.params {
        options = options.with_param(key.clone(), value.clone());
    }
    options
}

/// Moves the progress bar to the latest harvest position
fn report_progress(bar: &ProgressBar, progress: &HarvestProgress) {
    let percent = progress
        .percent()
        .map(|p| format!("~{p:.2}%"))
        .unwrap_or_else(|| "~?%".to_string());
    let cursor = progress
        .cursor
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string());

    bar.set_length(progress.total);
    bar.set_position(progress.seen);
    bar.set_message(format!("{percent} before_id: {cursor}"));
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
