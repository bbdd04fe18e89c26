// src/storage/fingerprints.rs

//! Durable fingerprint set.
//!
//! The file is a flat sequence of 16-byte fingerprints with no header. It is
//! read once at startup into memory; after that the in-memory set is the
//! authority and every new fingerprint is appended to the file.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Fingerprint;

/// In-memory fingerprint set backed by an append-only file.
pub struct FingerprintStore {
    path: PathBuf,
    known: HashSet<Fingerprint>,
    file: File,
}

impl FingerprintStore {
    /// Load the existing fingerprints and open the file for appending.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let known = Self::load(&path).await?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| AppError::fingerprints(&path, e))?;

        Ok(Self { path, known, file })
    }

    /// Read every complete fingerprint from `path`.
    ///
    /// A missing file yields an empty set. A trailing partial record is
    /// ignored. Any other read error is returned.
    pub async fn load(path: &Path) -> Result<HashSet<Fingerprint>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!(
                    "No fingerprint file at {}, creating a new store",
                    path.display()
                );
                return Ok(HashSet::new());
            }
            Err(e) => return Err(AppError::fingerprints(path, e)),
        };

        log::info!("Reading fingerprints from {}...", path.display());
        let known: HashSet<Fingerprint> = bytes
            .chunks_exact(Fingerprint::LEN)
            .filter_map(|chunk| chunk.try_into().ok())
            .map(Fingerprint::from_bytes)
            .collect();

        let trailing = bytes.len() % Fingerprint::LEN;
        if trailing > 0 {
            log::warn!(
                "Ignoring {} trailing bytes in {}",
                trailing,
                path.display()
            );
        }
        log::info!("Done. Fingerprints read: {}", known.len());
        Ok(known)
    }

    pub fn contains(&self, fp: &Fingerprint) -> bool {
        self.known.contains(fp)
    }

    /// Insert a fingerprint and append it to the file.
    ///
    /// Callers check `contains` first; this does not, so calling it twice
    /// with the same value writes it twice.
    pub async fn record(&mut self, fp: Fingerprint) -> Result<()> {
        self.known.insert(fp);
        self.file
            .write_all(fp.as_bytes())
            .await
            .map_err(|e| AppError::fingerprints(&self.path, e))?;
        self.file
            .flush()
            .await
            .map_err(|e| AppError::fingerprints(&self.path, e))
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
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
    async fn test_missing_file_is_empty_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hash.bin");

        let store = FingerprintStore::open(&path).await.unwrap();
        assert!(store.is_empty());
        // Opening creates the file for appending.
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_recorded_fingerprints_survive_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hash.bin");
        let fps: Vec<_> = ["one", "two", "three"]
            .iter()
            .map(|s| Fingerprint::of(s))
            .collect();

        {
            let mut store = FingerprintStore::open(&path).await.unwrap();
            for fp in &fps {
                store.record(*fp).await.unwrap();
                assert!(store.contains(fp));
            }
            assert_eq!(store.len(), 3);
        }

        let reloaded = FingerprintStore::open(&path).await.unwrap();
        assert_eq!(reloaded.len(), 3);
        for fp in &fps {
            assert!(reloaded.contains(fp));
        }
        assert!(!reloaded.contains(&Fingerprint::of("four")));

        let size = std::fs::metadata(&path).unwrap().len();
        assert_eq!(size, 3 * Fingerprint::LEN as u64);
    }

    #[tokio::test]
    async fn test_trailing_partial_record_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hash.bin");
        let fp = Fingerprint::of("quote");

        let mut bytes = fp.as_bytes().to_vec();
        bytes.extend_from_slice(&[0xAB; 7]);
        std::fs::write(&path, &bytes).unwrap();

        let known = FingerprintStore::load(&path).await.unwrap();
        assert_eq!(known.len(), 1);
        assert!(known.contains(&fp));
    }

    #[tokio::test]
    async fn test_duplicate_records_in_file_collapse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hash.bin");
        let fp = Fingerprint::of("same");

        let mut bytes = fp.as_bytes().to_vec();
        bytes.extend_from_slice(fp.as_bytes());
        std::fs::write(&path, &bytes).unwrap();

        let store = FingerprintStore::open(&path).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_path_is_fatal() {
        let tmp = TempDir::new().unwrap();
        // A directory exists but cannot be read as a file.
        let path = tmp.path().join("hash.bin");
        std::fs::create_dir(&path).unwrap();

        let result = FingerprintStore::open(&path).await;
        assert!(matches!(result, Err(AppError::Fingerprints { .. })));
    }
}
