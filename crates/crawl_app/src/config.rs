//! Optional RON configuration file merged with command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use crawl_engine::CrawlConfig;
use serde::Deserialize;

use crate::cli::Args;

/// On-disk configuration. Every field is optional; missing ones keep the built-in defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub gate_url: Option<String>,
    pub listing_url: Option<String>,
    pub base_host: Option<String>,
    pub item_marker: Option<String>,
    pub confirm_selector: Option<String>,
    pub media_pattern: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub user_agent: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    pub redirect_limit: Option<usize>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn apply(self, config: &mut CrawlConfig) {
        set(&mut config.gate_url, self.gate_url);
        set(&mut config.listing_url, self.listing_url);
        set(&mut config.base_host, self.base_host);
        set(&mut config.item_marker, self.item_marker);
        set(&mut config.confirm_selector, self.confirm_selector);
        set(&mut config.media_pattern, self.media_pattern);
        set(&mut config.download_dir, self.download_dir);
        set(&mut config.concurrency, self.concurrency);
        set(&mut config.fetch.user_agent, self.user_agent);
        set(&mut config.fetch.redirect_limit, self.redirect_limit);
        set(
            &mut config.fetch.connect_timeout,
            self.connect_timeout_secs.map(Duration::from_secs),
        );
        set(
            &mut config.fetch.request_timeout,
            self.request_timeout_secs.map(Duration::from_secs),
        );
        set(
            &mut config.fetch.read_timeout,
            self.read_timeout_secs.map(Duration::from_secs),
        );
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Defaults, then the config file, then command-line flags. Validated before returning.
pub fn resolve(args: &Args) -> anyhow::Result<CrawlConfig> {
    let mut config = CrawlConfig::default();
    let mut explicit_base = false;
    if let Some(path) = &args.config {
        let file = ConfigFile::load(path)?;
        explicit_base = file.base_host.is_some();
        file.apply(&mut config);
    }

    set(&mut config.gate_url, args.gate_url.clone());
    set(&mut config.download_dir, args.out_dir.clone());
    set(&mut config.concurrency, args.concurrency);
    if let Some(base) = &args.base_host {
        config.base_host = base.clone();
        explicit_base = true;
    }
    set(&mut config.listing_url, args.listing_url.clone());
    if !explicit_base {
        let listing = &config.listing_url;
        config.base_host = origin_of(listing)
            .with_context(|| format!("listing url {listing} has no usable origin"))?;
    }
    config.base_host = config.base_host.trim_end_matches('/').to_string();

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn origin_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    match parsed.origin() {
        origin @ url::Origin::Tuple(..) => Some(origin.ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}
