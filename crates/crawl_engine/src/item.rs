use std::pin::pin;

use crawl_logging::crawl_debug;

use crate::config::{ConfigError, CrawlConfig};
use crate::persist::{PersistError, StreamingFileWriter};
use crate::{
    CrawlEvent, DownloadOutcome, DownloadTask, FailureKind, FetchError, FilenameRules,
    ItemFailure, MediaExtractor, PatternMediaExtractor, ProgressSink, Session,
};

#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("item page request failed: {0}")]
    Page(#[source] FetchError),
    #[error("no media url found for {page_url}")]
    MediaUrlNotFound { page_url: String },
    #[error("media request failed: {0}")]
    Media(#[source] FetchError),
    #[error("could not store {file_name}: {source}")]
    Storage {
        file_name: String,
        #[source]
        source: PersistError,
    },
}

impl ItemError {
    pub fn failure(&self) -> ItemFailure {
        let kind = match self {
            ItemError::Page(err) | ItemError::Media(err) => err.kind.clone(),
            ItemError::MediaUrlNotFound { .. } => FailureKind::MediaUrlNotFound,
            ItemError::Storage { .. } => FailureKind::Storage,
        };
        ItemFailure {
            kind,
            message: self.to_string(),
        }
    }
}

/// Turns one item page into a saved file. Failures stay local to the item.
#[async_trait::async_trait]
pub trait ItemProcessor: Send + Sync {
    async fn process(
        &self,
        task: &DownloadTask,
        sink: &dyn ProgressSink,
    ) -> Result<DownloadOutcome, ItemError>;
}

/// Fetches an item page, locates its media URL and streams the media to disk.
pub struct MediaDownloader {
    session: Session,
    extractor: Box<dyn MediaExtractor>,
    filenames: FilenameRules,
    writer: StreamingFileWriter,
}

impl MediaDownloader {
    pub fn new(
        session: Session,
        extractor: Box<dyn MediaExtractor>,
        filenames: FilenameRules,
        writer: StreamingFileWriter,
    ) -> Self {
        Self {
            session,
            extractor,
            filenames,
            writer,
        }
    }

    pub fn from_config(session: Session, config: &CrawlConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            session,
            Box::new(PatternMediaExtractor::new(&config.media_pattern)?),
            FilenameRules::from_config(config)?,
            StreamingFileWriter::new(config.download_dir.clone()),
        ))
    }

    /// Fetches the item page and pulls the media URL out of its markup.
    pub async fn locate_media(
        &self,
        page_url: &str,
        referer: Option<&str>,
    ) -> Result<String, ItemError> {
        let markup = {
            let page = self
                .session
                .transport()
                .get_document(page_url, referer)
                .await
                .map_err(ItemError::Page)?;
            page.to_markup()
        };
        self.extractor
            .extract(&markup)
            .ok_or_else(|| ItemError::MediaUrlNotFound {
                page_url: page_url.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl ItemProcessor for MediaDownloader {
    async fn process(
        &self,
        task: &DownloadTask,
        sink: &dyn ProgressSink,
    ) -> Result<DownloadOutcome, ItemError> {
        let media_url = self
            .locate_media(&task.page_url, task.referer.as_deref())
            .await?;
        let file_name = self.filenames.derive(&media_url, &task.page_url);
        let storage = |source: PersistError| ItemError::Storage {
            file_name: file_name.clone(),
            source,
        };
        crawl_debug!("{} -> {} as {}", task.page_url, media_url, file_name);

        let pending = self.writer.begin(&file_name).map_err(storage)?;
        let stream = self
            .session
            .transport()
            .get_stream(&media_url, None)
            .await
            .map_err(ItemError::Media)?;

        sink.emit(CrawlEvent::DownloadStarted {
            index: task.index,
            file_name: file_name.clone(),
        });
        let mut reader = pin!(stream.into_reader());
        let (path, bytes_written) = pending.write_from(&mut reader).await.map_err(storage)?;
        sink.emit(CrawlEvent::DownloadCompleted {
            index: task.index,
            file_name: file_name.clone(),
            bytes: bytes_written,
        });

        Ok(DownloadOutcome {
            media_url,
            file_name,
            path,
            bytes_written,
        })
    }
}
