// src/main.rs
use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod digest;
mod entry;
mod feed;
mod filter;
mod mweibo;
mod notify;
mod targets;

use entry::{FeedEntry, Source};
use feed::FetchError;
use filter::{AcceptRule, FilterPolicy, Verdict};
use targets::Target;

/// Polls feed sources for a list of bands and pushes a Markdown digest
/// through ServerChan. One sequential pass; meant to be run by cron.
#[derive(Debug, Parser)]
#[command(name = "band_watch", version)]
struct Cli {
    /// Band list file: one `name` or `name,uid` per line
    #[arg(long, default_value = "bands.txt")]
    bands_file: PathBuf,

    /// Feed source: rsshub | mweibo | gnews | bing
    #[arg(long, default_value = "rsshub")]
    source: Source,

    /// Freshness window in days (inclusive)
    #[arg(long, default_value_t = 2)]
    days: i64,

    /// Raw entries considered per target
    #[arg(long, default_value_t = 5)]
    limit: usize,

    /// fresh-only | keyword-only | fresh-or-keyword | fresh-and-keyword
    #[arg(long, default_value = "fresh-or-keyword")]
    accept: AcceptRule,

    /// Required title substrings (any one suffices); repeatable
    #[arg(long = "whitelist")]
    whitelist: Vec<String>,

    /// Forbidden title substrings; repeatable
    #[arg(long = "blacklist")]
    blacklist: Vec<String>,

    /// Require the band name to appear in the title
    #[arg(long)]
    require_name: bool,

    /// Treat entries without a parseable date as fresh
    #[arg(long)]
    unknown_date_fresh: bool,

    /// RSSHub instance to hit for weibo feeds
    #[arg(long, default_value = feed::DEFAULT_RSSHUB_BASE)]
    rsshub_base: String,

    /// Body text cap in characters
    #[arg(long, default_value_t = digest::DEFAULT_BODY_CAP)]
    body_cap: usize,

    /// Per-request total timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Print the digest instead of pushing it
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("band_watch=info")),
        )
        .init();

    let cli = Cli::parse();

    let targets = targets::load(&cli.bands_file);
    if targets.is_empty() {
        info!("no targets; nothing to do");
        return Ok(());
    }

    let policy = FilterPolicy {
        whitelist: cli.whitelist.clone(),
        blacklist: cli.blacklist.clone(),
        require_name: cli.require_name,
        fresh_days: cli.days,
        unknown_date_is_fresh: cli.unknown_date_fresh,
        accept: cli.accept,
    }
    .normalized();
    let client = feed::build_client(Duration::from_secs(5), Duration::from_secs(cli.timeout_secs))
        .context("http client setup")?;

    // One pass, one target at a time. A failed target is recorded and the
    // loop moves on.
    let now = Utc::now();
    let mut outcomes: Vec<(Target, Result<Vec<(FeedEntry, Verdict)>, FetchError>)> = Vec::new();
    for target in targets {
        info!(band = %target.name, source = cli.source.label(), "fetching");
        let outcome = feed::fetch_entries(&client, cli.source, &target, &cli.rsshub_base, cli.limit)
            .map(|entries| {
                entries
                    .into_iter()
                    .filter_map(|e| {
                        let v = policy.evaluate(&e, &target.name, now);
                        v.accepted.then_some((e, v))
                    })
                    .collect()
            });
        outcomes.push((target, outcome));
    }

    let mut accepted = 0usize;
    let mut failed = 0usize;
    for (target, outcome) in &outcomes {
        match outcome {
            Ok(kept) => accepted += kept.len(),
            Err(e) => {
                failed += 1;
                warn!(band = %target.name, error = %e, "target skipped");
            }
        }
    }
    info!(targets = outcomes.len(), accepted, failed, "pass complete");

    let body = build_digest(&outcomes, cli.body_cap);
    if body.is_empty() {
        info!("nothing found");
        return Ok(());
    }

    let title = digest::digest_title(Local::now());
    if cli.dry_run {
        println!("{title}\n\n{body}");
        return Ok(());
    }

    let key = std::env::var(notify::KEY_ENV).ok();
    notify::push(&client, key.as_deref(), &title, &body);
    Ok(())
}

/// Concatenates per-band sections; bands with no accepted entries (or a
/// failed fetch) are left out entirely.
fn build_digest(
    outcomes: &[(Target, Result<Vec<(FeedEntry, Verdict)>, FetchError>)],
    body_cap: usize,
) -> String {
    let mut out = String::new();
    for (target, outcome) in outcomes {
        if let Ok(kept) = outcome {
            if !kept.is_empty() {
                out.push_str(&digest::render_section(target, kept, body_cap));
            }
        }
    }
    out
}
