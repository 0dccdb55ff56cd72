//! Command-line front end: pass the consent gate, harvest the listing, download every item.
mod cli;
mod config;
mod logging;
mod report;

use std::sync::{mpsc, Arc};

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use crawl_core::{update, Msg};
use crawl_engine::{crawl, ChannelProgressSink};
use crawl_logging::{crawl_info, level_for_verbosity};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    logging::initialize(args.log_destination(), level_for_verbosity(args.verbose));

    let config = config::resolve(&args)?;
    crawl_info!(
        "crawl started {} listing={} dir={} concurrency={}",
        Utc::now().to_rfc3339(),
        config.listing_url,
        config.download_dir.display(),
        config.concurrency
    );

    let (tx, rx) = mpsc::channel();
    let reporter = report::Reporter::spawn(rx);
    let result = crawl(&config, Arc::new(ChannelProgressSink::new(tx))).await;
    // Every sender is gone once `crawl` returns, so the reporter drains and exits.
    let state = reporter.finish();

    result.context("crawl aborted")?;
    let (_, effects) = update(state, Msg::CrawlFinished);
    report::render(&effects);
    crawl_info!("run ended {}", Utc::now().to_rfc3339());
    Ok(())
}
