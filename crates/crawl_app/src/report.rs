//! Drains engine events on a dedicated thread and renders them through the core state machine.

use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

use crawl_core::{update, CrawlState, Effect, ItemResultKind, Msg, ReportLevel};
use crawl_engine::CrawlEvent;
use crawl_logging::{crawl_debug, crawl_info, crawl_warn};

pub struct Reporter {
    handle: JoinHandle<CrawlState>,
}

impl Reporter {
    pub fn spawn(rx: Receiver<CrawlEvent>) -> Self {
        let handle = thread::spawn(move || {
            let mut state = CrawlState::new();
            // Ends when the last sender is dropped.
            while let Ok(event) = rx.recv() {
                let (next, effects) = update(state, to_msg(event));
                render(&effects);
                state = next;
            }
            state
        });
        Self { handle }
    }

    /// Waits for the channel to close and returns the final state.
    pub fn finish(self) -> CrawlState {
        self.handle.join().unwrap_or_else(|_| {
            crawl_warn!("progress reporter panicked; summary rebuilt from an empty state");
            CrawlState::new()
        })
    }
}

pub fn to_msg(event: CrawlEvent) -> Msg {
    match event {
        CrawlEvent::SessionEstablished { landing_url } => Msg::SessionEstablished { landing_url },
        CrawlEvent::ListingParsed { items } => Msg::ListingParsed { items },
        CrawlEvent::ItemStarted { index, total, url } => Msg::ItemStarted { index, total, url },
        CrawlEvent::DownloadStarted { index, file_name } => {
            Msg::DownloadStarted { index, file_name }
        }
        CrawlEvent::DownloadCompleted {
            index,
            file_name,
            bytes,
        } => Msg::DownloadCompleted {
            index,
            file_name,
            bytes,
        },
        CrawlEvent::ItemCompleted { index, result, .. } => match result {
            Ok(outcome) => Msg::ItemDone {
                index,
                result: ItemResultKind::Success,
                detail: Some(outcome.path.display().to_string()),
            },
            Err(failure) => Msg::ItemDone {
                index,
                result: ItemResultKind::Failed,
                detail: Some(failure.to_string()),
            },
        },
    }
}

pub fn render(effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::Report { level, line } => match level {
                ReportLevel::Debug => crawl_debug!("{}", line),
                ReportLevel::Info => crawl_info!("{}", line),
                ReportLevel::Warn => crawl_warn!("{}", line),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crawl_engine::{DownloadOutcome, FailureKind, ItemFailure};
    use std::path::PathBuf;
    use std::sync::mpsc;

    #[test]
    fn failed_item_carries_reason() {
        let msg = to_msg(CrawlEvent::ItemCompleted {
            index: 2,
            url: "https://site.example/idol/_item/item2/".into(),
            result: Err(ItemFailure {
                kind: FailureKind::MediaUrlNotFound,
                message: "no media".into(),
            }),
        });
        match msg {
            Msg::ItemDone {
                index,
                result,
                detail,
            } => {
                assert_eq!(index, 2);
                assert_eq!(result, ItemResultKind::Failed);
                assert!(detail.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reporter_folds_events_into_state() {
        let (tx, rx) = mpsc::channel();
        let reporter = Reporter::spawn(rx);
        tx.send(CrawlEvent::ListingParsed { items: 1 }).unwrap();
        tx.send(CrawlEvent::ItemStarted {
            index: 1,
            total: 1,
            url: "https://site.example/idol/_item/item1/".into(),
        })
        .unwrap();
        tx.send(CrawlEvent::ItemCompleted {
            index: 1,
            url: "https://site.example/idol/_item/item1/".into(),
            result: Ok(DownloadOutcome {
                media_url: "https://cdn.example/v.mp4?f=a".into(),
                file_name: "a.mp4".into(),
                path: PathBuf::from("mp4/a.mp4"),
                bytes_written: 4,
            }),
        })
        .unwrap();
        drop(tx);

        let state = reporter.finish();
        let (state, _) = update(state, Msg::CrawlFinished);
        assert_eq!(
            state.view().summary_line(),
            "attempted 1, succeeded 1, failed 0"
        );
    }
}
