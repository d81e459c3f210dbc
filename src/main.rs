use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use poswatch::data::{delay, rank};
use poswatch::{FallbackResolver, Feed, FileFeed, HttpFeed, Monitor, Settings};

#[derive(Parser, Debug)]
#[command(name = "poswatch")]
#[command(about = "Headless monitor for POS transaction-health feeds")]
struct Args {
    /// Path to a settings file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Primary feed URL (the all-POS summary endpoint)
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Fallback feed URL, queried only when the primary yields no records
    #[arg(long, conflicts_with = "file")]
    fallback_url: Option<String>,

    /// Read the envelope from a local JSON snapshot file instead
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Error-rate fraction that triggers a warning (e.g., "0.05")
    #[arg(long)]
    error_warn: Option<f64>,

    /// Error-rate fraction that triggers critical status (e.g., "0.2")
    #[arg(long)]
    error_crit: Option<f64>,

    /// Run a single refresh cycle and exit
    #[arg(long)]
    once: bool,

    /// Export current state to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if args.url.is_some() {
        settings.primary_url = args.url.clone();
    }
    if args.fallback_url.is_some() {
        settings.fallback_url = args.fallback_url.clone();
    }
    if let Some(refresh) = args.refresh {
        settings.refresh_secs = refresh;
    }

    let mut thresholds = settings.thresholds();
    if let Some(warn) = args.error_warn {
        thresholds.error_warning = warn;
    }
    if let Some(crit) = args.error_crit {
        thresholds.error_critical = crit;
    }

    let resolver = build_resolver(&args, &settings)?;
    let mut monitor = Monitor::new(resolver, thresholds);

    info!(source = monitor.source_description(), "starting");

    // Handle export mode (single cycle, then write)
    if let Some(export_path) = args.export {
        monitor.refresh().await;
        if let Some(err) = &monitor.load_error {
            anyhow::bail!("Fetch failed: {}", err);
        }
        monitor.export_state(&export_path)?;
        println!("Exported state to: {}", export_path.display());
        return Ok(());
    }

    if args.once {
        monitor.refresh().await;
        print_cycle(&monitor, &settings);
        return Ok(());
    }

    run_watch(monitor, settings).await
}

/// Build the feed resolver from CLI arguments and settings.
fn build_resolver(args: &Args, settings: &Settings) -> Result<FallbackResolver> {
    let primary: Box<dyn Feed> = if let Some(path) = &args.file {
        Box::new(FileFeed::new(path))
    } else if let Some(url) = &settings.primary_url {
        Box::new(HttpFeed::builder().endpoint(url).build())
    } else {
        anyhow::bail!("No feed configured: pass --url or --file, or set primary_url");
    };

    let mut resolver = FallbackResolver::new(primary);
    if args.file.is_none() {
        if let Some(url) = &settings.fallback_url {
            resolver = resolver.with_fallback(Box::new(HttpFeed::builder().endpoint(url).build()));
        }
    }

    Ok(resolver)
}

/// Poll the feeds at the configured interval until interrupted.
async fn run_watch(mut monitor: Monitor, settings: Settings) -> Result<()> {
    let mut interval = tokio::time::interval(Duration::from_secs(settings.refresh_secs.max(1)));

    loop {
        interval.tick().await;
        monitor.refresh().await;
        print_cycle(&monitor, &settings);
    }
}

/// Print one refresh cycle as a plain-text table.
fn print_cycle(monitor: &Monitor, settings: &Settings) {
    if let Some(err) = &monitor.load_error {
        println!("[{}] ERROR {}", monitor.source_description(), err);
        return;
    }

    let Some(data) = &monitor.data else {
        println!("[{}] no data yet", monitor.source_description());
        return;
    };

    let selected = rank::prioritize(&data.pos, &settings.priority_names());
    if selected.is_empty() {
        println!("[{}] no data", monitor.source_description());
        return;
    }

    println!(
        "{:<8} {:<20} {:<6} {:>7} {:>7} {:>9} {:>8} {:>9}",
        "ID", "NAME", "HEALTH", "ERR%", "SUCC%", "VOLUME", "DELAY", "TX/S"
    );
    for metric in selected {
        let rate = monitor
            .history
            .volume_rate(&metric.id)
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<8} {:<20} {:<6} {:>6.1}% {:>6.1}% {:>9} {:>8} {:>9}",
            metric.id,
            metric.name,
            metric.health.symbol(),
            metric.error_rate * 100.0,
            metric.success_rate * 100.0,
            metric.volume,
            delay::format_hours(metric.avg_delay_hours),
            rate,
        );
    }
    println!();
}
