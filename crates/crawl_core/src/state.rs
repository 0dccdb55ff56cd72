use std::collections::BTreeMap;

use crate::view_model::{CrawlViewModel, ItemRowView};

/// One-based position of an item within the harvested set.
pub type ItemIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlPhase {
    #[default]
    Starting,
    Authenticated,
    Dispatching,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Processing,
    Downloading,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemResultKind {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ItemRow {
    pub(crate) url: String,
    pub(crate) stage: Stage,
    pub(crate) file_name: Option<String>,
    pub(crate) bytes: Option<u64>,
    pub(crate) outcome: Option<ItemResultKind>,
    pub(crate) detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrawlState {
    phase: CrawlPhase,
    landing_url: Option<String>,
    total: usize,
    items: BTreeMap<ItemIndex, ItemRow>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn view(&self) -> CrawlViewModel {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut in_flight = 0;
        let items = self
            .items
            .iter()
            .map(|(index, row)| {
                match row.outcome {
                    Some(ItemResultKind::Success) => succeeded += 1,
                    Some(ItemResultKind::Failed) => failed += 1,
                    None => in_flight += 1,
                }
                ItemRowView {
                    index: *index,
                    url: row.url.clone(),
                    stage: row.stage,
                    file_name: row.file_name.clone(),
                    bytes: row.bytes,
                    outcome: row.outcome,
                    detail: row.detail.clone(),
                }
            })
            .collect();

        CrawlViewModel {
            phase: self.phase,
            landing_url: self.landing_url.clone(),
            total: self.total,
            attempted: self.items.len(),
            succeeded,
            failed,
            in_flight,
            items,
        }
    }

    pub(crate) fn authenticate(&mut self, landing_url: String) {
        self.phase = CrawlPhase::Authenticated;
        self.landing_url = Some(landing_url);
    }

    pub(crate) fn begin_dispatch(&mut self, total: usize) {
        self.phase = CrawlPhase::Dispatching;
        self.total = total;
    }

    pub(crate) fn finish(&mut self) {
        self.phase = CrawlPhase::Finished;
    }

    /// Registers an admitted item. Returns false for a repeated start.
    pub(crate) fn start_item(&mut self, index: ItemIndex, total: usize, url: String) -> bool {
        if self.items.contains_key(&index) {
            return false;
        }
        // A generic dispatcher may start items without a listing message.
        if self.total < total {
            self.total = total;
        }
        self.items.insert(
            index,
            ItemRow {
                url,
                stage: Stage::Processing,
                file_name: None,
                bytes: None,
                outcome: None,
                detail: None,
            },
        );
        true
    }

    pub(crate) fn mark_downloading(&mut self, index: ItemIndex, file_name: String) -> bool {
        match self.items.get_mut(&index) {
            Some(row) if row.outcome.is_none() => {
                row.stage = Stage::Downloading;
                row.file_name = Some(file_name);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn mark_written(&mut self, index: ItemIndex, file_name: String, bytes: u64) -> bool {
        match self.items.get_mut(&index) {
            Some(row) if row.outcome.is_none() => {
                row.file_name = Some(file_name);
                row.bytes = Some(bytes);
                true
            }
            _ => false,
        }
    }

    /// Records the final outcome once; later outcomes for the same item are ignored.
    pub(crate) fn complete_item(
        &mut self,
        index: ItemIndex,
        result: ItemResultKind,
        detail: Option<String>,
    ) -> Option<&ItemRow> {
        let row = self.items.get_mut(&index)?;
        if row.outcome.is_some() {
            return None;
        }
        row.stage = Stage::Done;
        row.outcome = Some(result);
        row.detail = detail;
        Some(row)
    }
}
