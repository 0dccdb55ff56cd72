use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(
    name = "crawl_app",
    version,
    about = "Pass an age/consent gate, harvest a listing page and download each item's media"
)]
pub struct Args {
    /// RON configuration file; command-line flags take precedence over it.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Consent gate page holding the confirmation link.
    #[arg(long)]
    pub gate_url: Option<String>,

    /// Listing page to harvest item links from.
    #[arg(long)]
    pub listing_url: Option<String>,

    /// Scheme and host for root-relative item links (defaults to the listing's origin).
    #[arg(long)]
    pub base_host: Option<String>,

    /// Directory downloads are written to.
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Maximum number of items processed at once.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Also write the log to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }
}
