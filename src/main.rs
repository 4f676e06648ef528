mod classify;
mod clock;
mod db;
mod error;
mod fetch;
mod parser;
mod reconcile;
mod record;
mod rest;
mod settings;
mod slug;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use reqwest::Url;
use tracing::{info, warn};

use clock::SystemClock;
use reconcile::{plan_append_only, plan_upsert, ExistingIndex, Plan, Policy, SkipReason};
use settings::Settings;
use store::{apply, Backend, Store};

#[derive(Parser)]
#[command(
    name = "settlement_scraper",
    about = "Scrape open class action settlements into the settlements table"
)]
struct Cli {
    /// How to treat settlements that are already stored
    #[arg(long, value_enum, default_value_t = Policy::AppendOnly)]
    policy: Policy,
    /// Parse a saved HTML copy of the listing instead of fetching it
    #[arg(long)]
    input: Option<PathBuf>,
    /// Write to a local SQLite file instead of the hosted table
    #[arg(long)]
    sqlite: Option<PathBuf>,
    /// Print assembled records as JSON and stop
    #[arg(long)]
    dry_run: bool,
    /// Settings file (classifier rules, locator window)
    #[arg(long, default_value = "settlements.toml")]
    rules: PathBuf,
    /// Listing page to scrape
    #[arg(long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = run(&cli).await;

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = Settings::load(&cli.rules)
        .with_context(|| format!("Failed to load settings from {}", cli.rules.display()))?;

    let listing = cli.url.as_deref().unwrap_or(&settings.listing_url);
    let source_url =
        Url::parse(listing).with_context(|| format!("Invalid listing URL: {}", listing))?;

    // Store settings are checked before anything touches the network.
    let store = if cli.dry_run {
        None
    } else {
        Some(open_store(cli, &settings)?)
    };

    let html = match &cli.input {
        Some(path) => fetch::read_saved(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => fetch::fetch_listing(source_url.as_str())
            .await
            .context("Failed to fetch settlements listing")?,
    };

    let records = parser::process_document(
        &html,
        &source_url,
        &settings.locator,
        &settings.classifier,
        &SystemClock,
    );
    if records.is_empty() {
        warn!(url = %source_url, "no settlement cards located");
        println!("No settlements found on the page.");
        return Ok(());
    }
    println!("Assembled {} settlements.", records.len());

    let Some(store) = store else {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    };

    let plan = match cli.policy {
        Policy::AppendOnly => {
            let existing = store
                .existing()
                .await
                .context("Failed to read existing settlements")?;
            let index = ExistingIndex::new(&existing);
            info!(rows = existing.len(), keys = index.len(), "loaded existing settlements");
            let plan = plan_append_only(records, &index);
            print_skipped(&plan);
            plan
        }
        Policy::Upsert => plan_upsert(records),
    };

    if plan.is_empty() {
        println!("No new settlements. Database is up to date.");
        return Ok(());
    }

    let written = apply(&store, &plan)
        .await
        .context("Failed to write settlements")?;
    println!(
        "Saved {} settlements ({} inserted, {} upserted).",
        written,
        plan.inserts.len(),
        plan.upserts.len()
    );
    for r in &plan.inserts {
        println!("  + {}: {}", r.company_name, r.claim_url);
    }
    Ok(())
}

fn open_store(cli: &Cli, settings: &Settings) -> anyhow::Result<Backend> {
    if let Some(path) = &cli.sqlite {
        let store = db::connect(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        return Ok(Backend::Sqlite(store));
    }
    let (url, key) = settings.credentials()?;
    Ok(Backend::Rest(rest::RestStore::new(url, key)?))
}

fn print_skipped(plan: &Plan) {
    if plan.skipped.is_empty() {
        return;
    }
    let count = |reason| plan.skipped.iter().filter(|(_, r)| *r == reason).count();
    println!(
        "Skipped {} already stored (name {}, company {}, claim URL {}).",
        plan.skipped.len(),
        count(SkipReason::Name),
        count(SkipReason::Company),
        count(SkipReason::ClaimUrl),
    );
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["settlement_scraper"]);
        assert_eq!(cli.policy, Policy::AppendOnly);
        assert!(!cli.dry_run);
        assert_eq!(cli.rules, PathBuf::from("settlements.toml"));
    }

    #[test]
    fn cli_upsert_policy() {
        let cli = Cli::parse_from(["settlement_scraper", "--policy", "upsert", "--dry-run"]);
        assert_eq!(cli.policy, Policy::Upsert);
        assert!(cli.dry_run);
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(std::time::Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(std::time::Duration::from_secs(125)), "2m 5s");
    }
}
