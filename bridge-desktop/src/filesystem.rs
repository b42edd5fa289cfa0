//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{FileMetadata, FileSystemAccess},
};
use bytes::Bytes;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Reads media files from local disk using `tokio::fs`. Paths are used as
/// given; relative paths resolve against the process working directory.
#[derive(Debug, Clone, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(Self::map_io_error)
    }

    async fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let metadata = fs::metadata(path).await.map_err(Self::map_io_error)?;

        Ok(FileMetadata {
            size: metadata.len(),
            modified_at: metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64),
            is_directory: metadata.is_dir(),
        })
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn open_read_stream(
        &self,
        path: &Path,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>> {
        let file = fs::File::open(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Opened file for reading");
        Ok(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_read_and_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tick.txt");
        std::fs::write(&path, b"Hello, World!").unwrap();

        let fs = TokioFileSystem::new();
        assert!(fs.exists(&path).await.unwrap());
        assert!(fs.is_file(&path).await.unwrap());
        assert_eq!(fs.metadata(&path).await.unwrap().size, 13);
        assert_eq!(fs.read_file(&path).await.unwrap(), Bytes::from("Hello, World!"));

        let mut stream = fs.open_read_stream(&path).await.unwrap();
        let mut buffer = String::new();
        stream.read_to_string(&mut buffer).await.unwrap();
        assert_eq!(buffer, "Hello, World!");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.jpg");
        let fs = TokioFileSystem::new();

        assert!(!fs.exists(&path).await.unwrap());
        assert!(!fs.is_file(&path).await.unwrap());

        let err = fs.read_file(&path).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();

        assert!(fs.exists(dir.path()).await.unwrap());
        assert!(!fs.is_file(dir.path()).await.unwrap());
    }
}
