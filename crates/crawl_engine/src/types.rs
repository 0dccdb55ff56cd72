use std::fmt;
use std::path::PathBuf;

pub use crawl_core::ItemIndex;

/// One unit of dispatched work: an item page plus the referer to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub index: ItemIndex,
    pub total: usize,
    pub page_url: String,
    pub referer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub media_url: String,
    pub file_name: String,
    pub path: PathBuf,
    pub bytes_written: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    SessionEstablished {
        landing_url: String,
    },
    ListingParsed {
        items: usize,
    },
    ItemStarted {
        index: ItemIndex,
        total: usize,
        url: String,
    },
    DownloadStarted {
        index: ItemIndex,
        file_name: String,
    },
    DownloadCompleted {
        index: ItemIndex,
        file_name: String,
        bytes: u64,
    },
    ItemCompleted {
        index: ItemIndex,
        url: String,
        result: Result<DownloadOutcome, ItemFailure>,
    },
}

/// Totals returned once every dispatched item has finished.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrawlSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<(String, ItemFailure)>,
}

impl CrawlSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attempted {}, succeeded {}, failed {}",
            self.attempted,
            self.succeeded,
            self.failed()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Failure of a single item, detached from the error that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    MediaUrlNotFound,
    Storage,
    Panicked,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode => write!(f, "undecodable body"),
            FailureKind::MediaUrlNotFound => write!(f, "no media url found"),
            FailureKind::Storage => write!(f, "storage error"),
            FailureKind::Panicked => write!(f, "worker panicked"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
