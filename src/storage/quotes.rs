// src/storage/quotes.rs

//! Append-only output log.

use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Record;

/// UTF-8 text log of accepted records.
pub struct QuoteLog {
    path: PathBuf,
    file: File,
}

impl QuoteLog {
    /// Open (or create) the log for appending.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| AppError::quote_log(&path, e))?;
        Ok(Self { path, file })
    }

    /// Append records and flush them. Returns the number written.
    pub async fn append(&mut self, records: &[Record]) -> Result<usize> {
        for record in records {
            self.file
                .write_all(record.to_string().as_bytes())
                .await
                .map_err(|e| AppError::quote_log(&self.path, e))?;
        }
        self.file
            .flush()
            .await
            .map_err(|e| AppError::quote_log(&self.path, e))?;
        Ok(records.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_append_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("quotes.txt");

        let mut log = QuoteLog::open(&path).await.unwrap();
        let written = log
            .append(&[Record::new("A", "1"), Record::new("B", "2")])
            .await
            .unwrap();
        assert_eq!(written, 2);
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "A: 1\n\nB: 2\n\n");
    }

    #[tokio::test]
    async fn test_reopen_appends() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("quotes.txt");
        std::fs::write(&path, "old: entry\n\n").unwrap();

        let mut log = QuoteLog::open(&path).await.unwrap();
        log.append(&[Record::new("new", "entry")]).await.unwrap();
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "old: entry\n\nnew: entry\n\n");
    }

    #[tokio::test]
    async fn test_open_in_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("quotes.txt");

        let result = QuoteLog::open(&path).await;
        assert!(matches!(result, Err(AppError::QuoteLog { .. })));
    }
}
