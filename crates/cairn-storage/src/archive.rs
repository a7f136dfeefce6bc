//! Archive stores holding full block bundles of finalized blocks

use crate::error::StorageResult;
use crate::store::ArchiveStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Archive laid out as `{root}/{chain_id}/{block_number}.json`
#[derive(Clone, Debug)]
pub struct DirArchive {
    root: PathBuf,
}

impl DirArchive {
    /// Archive rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Path of one bundle file
    pub fn bundle_path(&self, chain_id: u64, block_number: u64) -> PathBuf {
        self.root
            .join(chain_id.to_string())
            .join(format!("{}.json", block_number))
    }
}

#[async_trait]
impl ArchiveStore for DirArchive {
    async fn get_archived_block(&self, chain_id: u64, block_number: u64) -> StorageResult<Option<Bytes>> {
        let path = self.bundle_path(chain_id, block_number);
        match tokio::fs::read(&path).await {
            Ok(data) => {
                trace!(path = %path.display(), len = data.len(), "archive bundle read");
                Ok(Some(Bytes::from(data)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Archive that never holds anything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoArchive;

#[async_trait]
impl ArchiveStore for NoArchive {
    async fn get_archived_block(&self, _chain_id: u64, _block_number: u64) -> StorageResult<Option<Bytes>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_dir_archive_read() {
        let dir = TempDir::new().unwrap();
        let archive = DirArchive::new(dir.path());
        let path = archive.bundle_path(1, 42);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, br#"{"block":{}}"#).unwrap();

        let bundle = archive.get_archived_block(1, 42).await.unwrap().unwrap();
        assert_eq!(bundle, Bytes::from_static(br#"{"block":{}}"#));
    }

    #[tokio::test]
    async fn test_dir_archive_missing_file() {
        let dir = TempDir::new().unwrap();
        let archive = DirArchive::new(dir.path());
        assert!(archive.get_archived_block(1, 43).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_archive() {
        assert!(NoArchive.get_archived_block(1, 1).await.unwrap().is_none());
    }
}
