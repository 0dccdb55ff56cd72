use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crawl_logging::{crawl_debug, crawl_error};
use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::{ConfigError, CrawlConfig};
use crate::links::{harvest_listing, HarvestError, LinkRules};
use crate::session::SessionError;
use crate::{
    CrawlEvent, CrawlSummary, DownloadOutcome, DownloadTask, FailureKind, ItemFailure,
    ItemProcessor, MediaDownloader, ProgressSink, Session,
};

/// Failures that end a crawl before any item is dispatched.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("session setup failed: {0}")]
    Session(#[from] SessionError),
    #[error("harvest failed: {0}")]
    Harvest(#[from] HarvestError),
}

/// Runs the whole pipeline: consent gate, listing harvest, bounded item fan-out.
pub async fn crawl(
    config: &CrawlConfig,
    sink: Arc<dyn ProgressSink>,
) -> Result<CrawlSummary, CrawlError> {
    config.validate()?;
    let rules =
        LinkRules::new(&config.base_host, &config.item_marker).map_err(ConfigError::from)?;

    let session = Session::establish(
        &config.gate_url,
        &config.confirm_selector,
        config.fetch.clone(),
    )
    .await?;
    sink.emit(CrawlEvent::SessionEstablished {
        landing_url: session.landing_url().to_string(),
    });

    let urls = harvest_listing(&session, &config.listing_url, &rules).await?;
    sink.emit(CrawlEvent::ListingParsed { items: urls.len() });

    let processor = Arc::new(MediaDownloader::from_config(session, config)?);
    Ok(run_items(urls.into_vec(), processor, config.concurrency, sink).await)
}

/// Dispatches every URL at once behind a semaphore of `ceiling` permits and
/// waits for all of them. Failed items are counted, never retried.
pub async fn run_items(
    urls: Vec<String>,
    processor: Arc<dyn ItemProcessor>,
    ceiling: usize,
    sink: Arc<dyn ProgressSink>,
) -> CrawlSummary {
    let total = urls.len();
    let gate = Arc::new(Semaphore::new(ceiling.max(1)));
    let mut tasks = JoinSet::new();

    for (offset, page_url) in urls.into_iter().enumerate() {
        let task = DownloadTask {
            index: offset + 1,
            total,
            page_url,
            referer: None,
        };
        let gate = gate.clone();
        let processor = processor.clone();
        let sink = sink.clone();
        tasks.spawn(async move {
            let result = match gate.acquire_owned().await {
                Ok(_permit) => run_one(&task, processor.as_ref(), sink.as_ref()).await,
                Err(closed) => Err(ItemFailure {
                    kind: FailureKind::Panicked,
                    message: closed.to_string(),
                }),
            };
            sink.emit(CrawlEvent::ItemCompleted {
                index: task.index,
                url: task.page_url.clone(),
                result: result.clone(),
            });
            (task.page_url, result)
        });
    }

    let mut summary = CrawlSummary {
        attempted: total,
        ..CrawlSummary::default()
    };
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(_))) => summary.succeeded += 1,
            Ok((url, Err(failure))) => summary.failures.push((url, failure)),
            Err(err) => {
                crawl_error!("item task aborted: {}", err);
                summary.failures.push((
                    String::new(),
                    ItemFailure {
                        kind: FailureKind::Panicked,
                        message: err.to_string(),
                    },
                ));
            }
        }
    }

    crawl_debug!("all items joined: {}", summary);
    summary
}

async fn run_one(
    task: &DownloadTask,
    processor: &dyn ItemProcessor,
    sink: &dyn ProgressSink,
) -> Result<DownloadOutcome, ItemFailure> {
    sink.emit(CrawlEvent::ItemStarted {
        index: task.index,
        total: task.total,
        url: task.page_url.clone(),
    });

    match AssertUnwindSafe(processor.process(task, sink))
        .catch_unwind()
        .await
    {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(err)) => {
            crawl_debug!("[{}/{}] {}", task.index, task.total, err);
            Err(err.failure())
        }
        Err(_) => {
            crawl_error!("[{}/{}] worker panicked on {}", task.index, task.total, task.page_url);
            Err(ItemFailure {
                kind: FailureKind::Panicked,
                message: format!("worker panicked on {}", task.page_url),
            })
        }
    }
}
