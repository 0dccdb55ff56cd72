use std::sync::mpsc;

use crate::CrawlEvent;

/// Receives progress notifications. Advisory only; emitting never fails the crawl.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: CrawlEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<CrawlEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<CrawlEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: CrawlEvent) {
        let _ = self.tx.send(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: CrawlEvent) {}
}
