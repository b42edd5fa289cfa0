//! Content digests for media files.
//!
//! Files are streamed through SHA-256 in fixed-size chunks, so arbitrarily
//! large files hash in constant memory.

use crate::error::{MediaError, Result};
use bridge_traits::storage::FileSystemAccess;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::instrument;

pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Lowercase hex SHA-256 of an in-memory payload.
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[derive(Clone)]
pub struct ContentHasher {
    fs: Arc<dyn FileSystemAccess>,
}

impl ContentHasher {
    pub fn new(fs: Arc<dyn FileSystemAccess>) -> Self {
        Self { fs }
    }

    /// Lowercase hex SHA-256 of a file's bytes.
    ///
    /// Fails with [`MediaError::NotFound`] when the file does not exist.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn hash_file(&self, path: &Path) -> Result<String> {
        let mut reader = self.fs.open_read_stream(path).await.map_err(|e| {
            if e.is_not_found() {
                MediaError::NotFound(path.display().to_string())
            } else {
                MediaError::Read {
                    path: path.display().to_string(),
                    source: e,
                }
            }
        })?;

        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
        loop {
            let read = reader.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::TokioFileSystem;
    use std::io::Write;

    fn hasher() -> ContentHasher {
        ContentHasher::new(Arc::new(TokioFileSystem::new()))
    }

    #[test]
    fn test_hash_bytes() {
        let hash = hash_bytes(b"test data");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "916f0027a575074ce72a331777c3478d6513f786a591bd892da1a577bf2335f9"
        );
    }

    #[tokio::test]
    async fn test_identical_content_same_digest() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("nested-b.bin");
        std::fs::write(&a, b"same bytes").unwrap();
        std::fs::write(&b, b"same bytes").unwrap();

        let hasher = hasher();
        let digest_a = hasher.hash_file(&a).await.unwrap();
        let digest_b = hasher.hash_file(&b).await.unwrap();

        assert_eq!(digest_a, digest_b);
        assert_eq!(digest_a, hash_bytes(b"same bytes"));
    }

    #[tokio::test]
    async fn test_file_larger_than_buffer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let payload: Vec<u8> = (0..(HASH_BUFFER_SIZE * 3 + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        file.write_all(&payload).unwrap();

        let digest = hasher().hash_file(file.path()).await.unwrap();
        assert_eq!(digest, hash_bytes(&payload));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = hasher().hash_file(&dir.path().join("nope.jpg")).await;
        assert!(matches!(result, Err(MediaError::NotFound(_))));
    }
}
