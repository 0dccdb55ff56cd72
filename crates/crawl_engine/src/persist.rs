use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("download directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the download directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Writability probe.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Streams downloads into `{dir}/{filename}` through an exclusive temp file.
#[derive(Debug, Clone)]
pub struct StreamingFileWriter {
    dir: PathBuf,
}

impl StreamingFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory if needed and opens a temp file owned by this download.
    pub fn begin(&self, filename: &str) -> Result<PendingFile, PersistError> {
        ensure_output_dir(&self.dir)?;
        let tmp = NamedTempFile::new_in(&self.dir)?;
        Ok(PendingFile {
            tmp,
            target: self.dir.join(filename),
        })
    }
}

/// A download in progress. Dropping it without [`PendingFile::write_from`]
/// succeeding removes the temp file and leaves the target untouched.
#[derive(Debug)]
pub struct PendingFile {
    tmp: NamedTempFile,
    target: PathBuf,
}

impl PendingFile {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Copies `reader` to disk chunk by chunk, syncs, then moves the file into place.
    pub async fn write_from<R>(self, reader: &mut R) -> Result<(PathBuf, u64), PersistError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut file = tokio::fs::File::from_std(self.tmp.as_file().try_clone()?);
        let written = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        // Replaces an earlier download of the same name.
        self.tmp
            .persist(&self.target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok((self.target, written))
    }
}
