//! Media Store - content-addressed, idempotent media uploads
//!
//! A local JPEG is stored once under `<prefix>/<sha256>.jpg` and referenced by
//! its public URL. Identical bytes always map to the same key.
//!
//! ## Deduplication
//!
//! Each digest gets a once-cell. The first caller checks whether the key
//! already exists and uploads only when it does not; every later caller for
//! the same digest (concurrent ones included) waits for that result. A store
//! instance therefore issues at most one existence check and at most one
//! upload per distinct digest.
//!
//! ## Usage
//!
//! ```ignore
//! use core_media::MediaStore;
//!
//! let store = MediaStore::new(object_store, file_system, "ticktack/media");
//! let stored = store.store(Path::new("/tmp/sunset.jpg")).await?;
//! println!("{} ({}x{})", stored.url, stored.width, stored.height);
//! ```

use crate::error::{MediaError, Result};
use crate::hasher::ContentHasher;
use crate::inspect::inspect_jpeg;
use async_trait::async_trait;
use bridge_traits::storage::{FileSystemAccess, ObjectStore, ObjectVisibility, PutObject};
use core_runtime::logging::strip_path;
use core_ticks::{Media, MediaResolver, ResolveError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, instrument};

pub const MEDIA_CONTENT_TYPE: &str = "image/jpeg";
pub const MEDIA_EXTENSION: &str = "jpg";

/// Result of storing one media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub key: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub digest: String,
    /// Whether this store instance uploaded the object
    pub uploaded: bool,
}

impl StoredMedia {
    pub fn to_media(&self) -> Media {
        Media::resolved(self.url.clone(), self.width, self.height)
    }
}

pub struct MediaStore {
    objects: Arc<dyn ObjectStore>,
    fs: Arc<dyn FileSystemAccess>,
    hasher: ContentHasher,
    prefix: String,
    digests: Mutex<HashMap<String, Arc<OnceCell<bool>>>>,
}

impl MediaStore {
    /// `prefix` is normalized: leading and trailing `/` are dropped.
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        fs: Arc<dyn FileSystemAccess>,
        prefix: impl AsRef<str>,
    ) -> Self {
        Self {
            objects,
            hasher: ContentHasher::new(fs.clone()),
            fs,
            prefix: prefix.as_ref().trim_matches('/').to_string(),
            digests: Mutex::new(HashMap::new()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Object key for a digest
    pub fn key_for(&self, digest: &str) -> String {
        if self.prefix.is_empty() {
            format!("{}.{}", digest, MEDIA_EXTENSION)
        } else {
            format!("{}/{}.{}", self.prefix, digest, MEDIA_EXTENSION)
        }
    }

    /// Validate, digest and upload (if needed) a local JPEG.
    ///
    /// # Errors
    ///
    /// - [`MediaError::NotFound`] if the path is not an existing file
    /// - [`MediaError::UnsupportedFormat`] if the file is not a JPEG
    /// - [`MediaError::Remote`] if the object store fails
    #[instrument(skip(self, path), fields(file = %strip_path(&path.to_string_lossy())))]
    pub async fn store(&self, path: &Path) -> Result<StoredMedia> {
        let is_file = self.fs.is_file(path).await.map_err(|e| MediaError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        if !is_file {
            return Err(MediaError::NotFound(path.display().to_string()));
        }

        let info = inspect_jpeg(path).await?;
        let digest = self.hasher.hash_file(path).await?;
        let key = self.key_for(&digest);

        let cell = {
            let mut digests = self.digests.lock().await;
            digests.entry(digest.clone()).or_default().clone()
        };

        let uploaded = *cell
            .get_or_try_init(|| self.upload_if_missing(&key, path))
            .await?;

        Ok(StoredMedia {
            url: self.objects.public_url(&key),
            key,
            width: info.width,
            height: info.height,
            digest,
            uploaded,
        })
    }

    async fn upload_if_missing(&self, key: &str, path: &Path) -> Result<bool> {
        if self
            .objects
            .object_exists(key)
            .await
            .map_err(MediaError::Remote)?
        {
            debug!(key, "Media already stored, skipping upload");
            return Ok(false);
        }

        let body = self.fs.read_file(path).await.map_err(|e| MediaError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let size = body.len();

        self.objects
            .put_object(
                PutObject::new(key, body, MEDIA_CONTENT_TYPE)
                    .visibility(ObjectVisibility::PublicRead),
            )
            .await
            .map_err(MediaError::Remote)?;

        info!(key, size, "Uploaded media");
        Ok(true)
    }
}

#[async_trait]
impl MediaResolver for MediaStore {
    /// Local files are stored; anything else passes through unchanged.
    async fn resolve(&self, media: &Media) -> std::result::Result<Media, ResolveError> {
        let Media::Unresolved { path } = media else {
            return Ok(media.clone());
        };

        let path = Path::new(path);
        let is_file = self
            .fs
            .is_file(path)
            .await
            .map_err(|e| ResolveError::Unavailable(e.to_string()))?;
        if !is_file {
            debug!(
                file = %strip_path(&path.to_string_lossy()),
                "Media is not a local file, passing through"
            );
            return Ok(media.clone());
        }

        Ok(self.store(path).await?.to_media())
    }
}
