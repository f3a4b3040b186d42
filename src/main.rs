use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;

use ticket_builder::config::BuilderConfig;
use ticket_builder::coverage::MarketCoverage;
use ticket_builder::persist::{self, TicketsFile};
use ticket_builder::report;

#[derive(Parser, Debug)]
#[command(about = "Pick daily tickets whose combined odds land in target ranges")]
struct Cli {
    /// Candidate pool: a JSON array, or an object with an `events` array.
    #[arg(long, default_value = "odds.json")]
    input: PathBuf,

    #[arg(long, default_value = "tickets.json")]
    out: PathBuf,

    /// Also write a Markdown summary here.
    #[arg(long)]
    markdown: Option<PathBuf>,

    /// Print market coverage of the raw pool.
    #[arg(long)]
    coverage: bool,

    /// Don't derive 1X / 12 / X2 from complete 1X2 triplets.
    #[arg(long)]
    no_derive_dc: bool,
}

fn main() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticket_builder=info".into()),
        )
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut cfg = BuilderConfig::from_env().context("invalid configuration")?;
    if cli.no_derive_dc {
        cfg.derive_double_chance = false;
    }

    let raw = persist::load_pool(&cli.input)?;
    let coverage = MarketCoverage::from_pool(&raw);
    info!(
        selections = coverage.total_selections,
        matches = coverage.matches,
        markets = coverage.by_market.len(),
        "pool loaded"
    );
    if cli.coverage {
        println!("=== MARKET COVERAGE ===");
        println!("{coverage}");
    }

    let (pool, batch) = ticket_builder::run_batch(raw, &cfg);
    info!(candidates = pool.len(), matches = pool.match_count(), "pool prepared");

    let now = Utc::now();
    persist::save_tickets(&cli.out, &TicketsFile::from_batch(&batch, now))?;
    if let Some(path) = cli.markdown.as_ref() {
        let md = report::render_markdown(&batch, now.date_naive());
        persist::write_atomic(path, &md)?;
    }

    for entry in &batch.entries {
        match entry.outcome.ticket.as_ref() {
            Some(ticket) => println!(
                "{}: {} selections, total {} ({})",
                entry.name,
                ticket.selections.len(),
                ticket.display_product(),
                ticket.status.as_str()
            ),
            None => println!("{}: no combination available", entry.name),
        }
    }
    println!("Wrote {}", cli.out.display());
    Ok(())
}
