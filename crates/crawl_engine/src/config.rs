use std::path::PathBuf;

use crate::FetchSettings;

pub const DEFAULT_GATE_URL: &str = "https://www.sokmil.com/member/ageauth/";
pub const DEFAULT_LISTING_URL: &str = "https://www.sokmil.com/idol/";
pub const DEFAULT_BASE_HOST: &str = "https://www.sokmil.com";
pub const DEFAULT_ITEM_MARKER: &str = "/idol/_item/item";
pub const DEFAULT_CONFIRM_SELECTOR: &str = "a.btn-ageauth-yes";
pub const DEFAULT_MEDIA_PATTERN: &str = r"video_url:\s*'(https?://[^']+)'";
pub const DEFAULT_FILE_TOKEN_PATTERN: &str = r"f=([^&]+)";
pub const DEFAULT_ITEM_ID_PATTERN: &str = r"item\d+";
pub const DEFAULT_FILE_SUFFIX: &str = ".mp4";
pub const DEFAULT_DOWNLOAD_DIR: &str = "mp4";
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Everything a crawl needs; defaults target the original site.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub gate_url: String,
    pub listing_url: String,
    /// Scheme and host prepended to root-relative item links, without a trailing slash.
    pub base_host: String,
    pub item_marker: String,
    pub confirm_selector: String,
    pub media_pattern: String,
    pub file_token_pattern: String,
    pub item_id_pattern: String,
    pub file_suffix: String,
    pub download_dir: PathBuf,
    pub concurrency: usize,
    pub fetch: FetchSettings,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            gate_url: DEFAULT_GATE_URL.to_string(),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            base_host: DEFAULT_BASE_HOST.to_string(),
            item_marker: DEFAULT_ITEM_MARKER.to_string(),
            confirm_selector: DEFAULT_CONFIRM_SELECTOR.to_string(),
            media_pattern: DEFAULT_MEDIA_PATTERN.to_string(),
            file_token_pattern: DEFAULT_FILE_TOKEN_PATTERN.to_string(),
            item_id_pattern: DEFAULT_ITEM_ID_PATTERN.to_string(),
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            concurrency: DEFAULT_CONCURRENCY,
            fetch: FetchSettings::default(),
        }
    }
}

impl CrawlConfig {
    /// Default configuration pointed at another site root, e.g. a local test server.
    pub fn for_site(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        Self {
            gate_url: format!("{root}/member/ageauth/"),
            listing_url: format!("{root}/idol/"),
            base_host: root.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("invalid url for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("invalid pattern for {field}: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error(transparent)]
    InvalidSelector(#[from] crate::SelectorError),
}

impl CrawlConfig {
    /// Checks the values that would otherwise fail only after the network handshake.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        for (field, value) in [
            ("gate_url", &self.gate_url),
            ("listing_url", &self.listing_url),
            ("base_host", &self.base_host),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidUrl {
                    field,
                    value: value.clone(),
                });
            }
        }
        crate::document::parse_selector(&self.confirm_selector)?;
        crate::media::PatternMediaExtractor::new(&self.media_pattern)?;
        crate::filename::FilenameRules::from_config(self)?;
        Ok(())
    }
}
