//! Storage Abstractions
//!
//! Provides platform-agnostic traits for local file I/O and for the remote
//! object store that holds the published snapshot, feeds and media.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::error::Result;

/// File metadata information
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub modified_at: Option<i64>,
    pub is_directory: bool,
}

/// File system access trait
///
/// Abstracts the local reads the media pipeline needs. Desktop builds use the
/// tokio-backed implementation in `bridge-desktop`.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn size_of(fs: &dyn FileSystemAccess, path: &Path) -> Result<u64> {
///     Ok(fs.metadata(path).await?.size)
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get metadata for a file or directory
    async fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Read entire file contents into memory
    ///
    /// For large files, consider using `open_read_stream` instead.
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Open a file for streaming reads
    async fn open_read_stream(
        &self,
        path: &Path,
    ) -> Result<Box<dyn tokio::io::AsyncRead + Send + Unpin>>;

    /// Whether the path names an existing regular file
    async fn is_file(&self, path: &Path) -> Result<bool> {
        if !self.exists(path).await? {
            return Ok(false);
        }
        Ok(!self.metadata(path).await?.is_directory)
    }
}

/// Access control applied to uploaded objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectVisibility {
    /// Only the bucket owner can read the object
    Private,
    /// Anyone can read the object over its public URL
    #[default]
    PublicRead,
}

/// Upload request for a single object
#[derive(Debug, Clone)]
pub struct PutObject {
    pub key: String,
    pub body: Bytes,
    pub content_type: String,
    pub visibility: ObjectVisibility,
}

impl PutObject {
    pub fn new(key: impl Into<String>, body: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            body,
            content_type: content_type.into(),
            visibility: ObjectVisibility::PublicRead,
        }
    }

    pub fn visibility(mut self, visibility: ObjectVisibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Outcome of fetching an object
///
/// Missing objects and access-denied responses are reported as values rather
/// than errors: callers decide whether they mean "no prior data".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectFetch {
    Found(Bytes),
    NotFound,
    AccessDenied,
}

/// Remote object store trait
///
/// Implemented by cloud connectors (see `provider-s3`). Every call is a
/// single network round-trip; implementations must not cache.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object body
    async fn get_object(&self, key: &str) -> Result<ObjectFetch>;

    /// Check whether an object exists without downloading it
    async fn object_exists(&self, key: &str) -> Result<bool>;

    /// Create or replace an object
    async fn put_object(&self, object: PutObject) -> Result<()>;

    /// Public URL an object is served from once uploaded
    fn public_url(&self, key: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_object_defaults_to_public_read() {
        let put = PutObject::new(
            "ticktack/ticker.json",
            Bytes::from_static(b"{}"),
            "application/json",
        );

        assert_eq!(put.key, "ticktack/ticker.json");
        assert_eq!(put.visibility, ObjectVisibility::PublicRead);

        let private = put.visibility(ObjectVisibility::Private);
        assert_eq!(private.visibility, ObjectVisibility::Private);
    }
}
