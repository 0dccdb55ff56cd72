use crate::{CrawlPhase, ItemIndex, ItemResultKind, Stage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrawlViewModel {
    pub phase: CrawlPhase,
    pub landing_url: Option<String>,
    pub total: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub in_flight: usize,
    pub items: Vec<ItemRowView>,
}

impl CrawlViewModel {
    /// One-line run summary: attempted vs. succeeded.
    pub fn summary_line(&self) -> String {
        format!(
            "attempted {}, succeeded {}, failed {}",
            self.attempted, self.succeeded, self.failed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub index: ItemIndex,
    pub url: String,
    pub stage: Stage,
    pub file_name: Option<String>,
    pub bytes: Option<u64>,
    pub outcome: Option<ItemResultKind>,
    pub detail: Option<String>,
}
