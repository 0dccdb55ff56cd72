//! Crawl engine: consent-gated session, listing harvest, bounded media downloads.
mod config;
mod document;
mod fetch;
mod filename;
mod item;
mod links;
mod media;
mod orchestrator;
mod persist;
mod session;
mod sink;
mod types;

pub use config::{ConfigError, CrawlConfig};
pub use config::{
    DEFAULT_BASE_HOST, DEFAULT_CONCURRENCY, DEFAULT_CONFIRM_SELECTOR, DEFAULT_DOWNLOAD_DIR,
    DEFAULT_FILE_SUFFIX, DEFAULT_FILE_TOKEN_PATTERN, DEFAULT_GATE_URL, DEFAULT_ITEM_ID_PATTERN,
    DEFAULT_ITEM_MARKER, DEFAULT_LISTING_URL, DEFAULT_MEDIA_PATTERN,
};
pub use document::{parse_selector, DecodeError, Document, SelectorError};
pub use fetch::{FetchSettings, HttpTransport, MediaStream, BROWSER_USER_AGENT};
pub use filename::FilenameRules;
pub use item::{ItemError, ItemProcessor, MediaDownloader};
pub use links::{harvest_item_urls, harvest_listing, HarvestError, LinkRules};
pub use media::{MediaExtractor, PatternMediaExtractor};
pub use orchestrator::{crawl, run_items, CrawlError};
pub use persist::{ensure_output_dir, PendingFile, PersistError, StreamingFileWriter};
pub use session::{Session, SessionError};
pub use sink::{ChannelProgressSink, NullProgressSink, ProgressSink};
pub use types::{
    CrawlEvent, CrawlSummary, DownloadOutcome, DownloadTask, FailureKind, FetchError,
    ItemFailure, ItemIndex,
};
pub use crawl_core::ItemUrlSet;
