use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spotlight_core::config::Settings;
use spotlight_core::domain::contract::{validate_and_into_items, EligibleItemInput, FeedResponse};
use spotlight_core::ranking::{rank, ListingSchedule};

#[derive(Debug, Parser)]
#[command(name = "spotlight_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank a catalog export (JSON array of eligible listings, newest first).
    Rank {
        #[arg(long)]
        input: PathBuf,

        /// Ranking instant (RFC 3339). Defaults to now.
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Feed size. Defaults to FEED_SIZE.
        #[arg(long)]
        k: Option<usize>,

        /// Write the feed here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Include the per-term score breakdown for each listing.
        #[arg(long)]
        explain: bool,
    },

    /// Show where a listing sits in the rotation on a UTC date.
    Schedule {
        #[arg(long)]
        id: String,

        /// YYYY-MM-DD. Defaults to today (UTC).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = match args.command {
        Command::Rank {
            input,
            now,
            k,
            output,
            explain,
        } => run_rank(&settings, input, now, k, output, explain).await,
        Command::Schedule { id, date } => run_schedule(&id, date),
    };

    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "worker run failed");
    }
    result
}

async fn run_rank(
    settings: &Settings,
    input: PathBuf,
    now: Option<DateTime<Utc>>,
    k: Option<usize>,
    output: Option<PathBuf>,
    explain: bool,
) -> anyhow::Result<()> {
    let k = settings.resolve_feed_size(k)?;

    let raw = tokio::fs::read_to_string(&input)
        .await
        .with_context(|| format!("failed to read catalog export {}", input.display()))?;
    let inputs: Vec<EligibleItemInput> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid catalog export {}", input.display()))?;
    let items = validate_and_into_items(inputs)?;

    let now = now.unwrap_or_else(Utc::now);
    let input_len = items.len();
    let mut response = FeedResponse::new(now, rank(items, now, k));
    if explain {
        response = response.with_breakdowns();
    }

    tracing::info!(
        %now,
        input_len,
        k,
        output_len = response.items.len(),
        slot_index = response.slot_index,
        day_index = response.day_index,
        "ranked catalog export"
    );

    let json = serde_json::to_string_pretty(&response)?;
    match output {
        Some(path) => tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write feed to {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}

fn run_schedule(id: &str, date: Option<NaiveDate>) -> anyhow::Result<()> {
    let id = id.trim();
    anyhow::ensure!(!id.is_empty(), "listing id must be non-empty");

    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let schedule = ListingSchedule::for_date(id, date);
    println!("{}", serde_json::to_string_pretty(&schedule)?);
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
