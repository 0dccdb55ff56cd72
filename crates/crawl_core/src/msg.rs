#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Consent gate confirmed; the session carries the verification cookies.
    SessionEstablished { landing_url: String },
    /// Listing page harvested.
    ListingParsed { items: usize },
    /// An item was admitted past the concurrency gate.
    ItemStarted {
        index: crate::ItemIndex,
        total: usize,
        url: String,
    },
    /// Media stream opened for an item.
    DownloadStarted {
        index: crate::ItemIndex,
        file_name: String,
    },
    /// Media fully written for an item.
    DownloadCompleted {
        index: crate::ItemIndex,
        file_name: String,
        bytes: u64,
    },
    /// Final outcome of one item.
    ItemDone {
        index: crate::ItemIndex,
        result: crate::ItemResultKind,
        detail: Option<String>,
    },
    /// Every dispatched item has completed.
    CrawlFinished,
}
